//! Error types for WardPulse

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from engine configuration parsing and validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("{field}: inverted range [{lo}, {hi}]")]
    InvertedRange {
        field: &'static str,
        lo: f64,
        hi: f64,
    },

    #[error("stress_event_chance {0} is outside [0, 1]")]
    InvalidChance(f64),
}

/// Errors surfaced by the simulation drivers
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid backfill window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("invalid backfill step: {0} seconds")]
    InvalidStep(i64),

    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors reported by a persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("batch commit rejected: {0}")]
    CommitRejected(String),
}

/// Errors reported by a push-update transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to serialize update: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to deliver update: {0}")]
    Delivery(#[from] std::io::Error),
}

/// Errors from roster seed parsing
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid roster document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
