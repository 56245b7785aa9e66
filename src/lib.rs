//! WardPulse - Stateful physiological telemetry simulator for care-team rosters
//!
//! WardPulse produces a plausible, bounded stream of per-subject vitals through
//! a deterministic per-tick pipeline: trend transition → vitals generation →
//! sleep lookup → wellness scoring → snapshot assembly.
//!
//! ## Modules
//!
//! - **Engine**: Drive the roster tick by tick, live or over a historical window
//! - **Components**: Trend state machine, vitals generator, sleep model, scoring
//! - **Edges**: Storage and transport traits with in-memory implementations

pub mod config;
pub mod engine;
pub mod error;
pub mod rng;
pub mod scoring;
pub mod seed;
pub mod sleep;
pub mod state;
pub mod store;
pub mod transport;
pub mod trend;
pub mod types;
pub mod vitals;

pub use config::EngineConfig;
pub use engine::{BackfillReport, Engine, TickReport};
pub use error::{ConfigError, EngineError, SeedError, StoreError, TransportError};
pub use rng::{NoiseSource, PrngNoise};

// Component exports
pub use scoring::{classify_stress, wellness_index};
pub use sleep::{NightlySleep, SleepModel};

// Edge exports
pub use seed::{parse_roster, populate_if_empty, sample_roster, SubjectSeed};
pub use store::{MemoryStore, TelemetryStore};
pub use transport::{MemorySink, NdjsonSink, UpdateSink};
pub use types::{DataPoint, StressLevel, Subject, TickMode, TrendPhase};

/// Engine version embedded in diagnostics output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
