//! Stress-cycle trend state machine
//!
//! Each subject cycles `Stable -> Stressing -> Recovering -> Stable`; no
//! other edge exists. A stress event fires from `Stable` with the configured
//! per-tick probability, disables further events for the duration of the
//! cycle, and hands the vitals generator a one-time heart-rate impulse.

use tracing::info;
use uuid::Uuid;

use crate::rng::NoiseSource;
use crate::state::SubjectState;
use crate::types::{TickMode, TrendPhase};

/// Heart-rate margin above baseline at which recovery is considered complete
pub const RECOVERY_MARGIN: i32 = 5;

pub struct TrendStateMachine;

impl TrendStateMachine {
    /// Advance a subject's phase by one tick.
    ///
    /// `current_hr` is the heart rate from the previous tick's snapshot; the
    /// transition runs before new vitals are generated. Returns the one-time
    /// impulse when a new stress event fires, `None` otherwise.
    pub fn step(
        state: &mut SubjectState,
        subject_id: Uuid,
        current_hr: i32,
        mode: TickMode,
        restore_chance: f64,
        noise: &mut dyn NoiseSource,
    ) -> Option<i32> {
        match state.phase {
            TrendPhase::Stable => {
                if noise.next_uniform(0.0, 1.0) < state.stress_event_chance {
                    state.phase = TrendPhase::Stressing;
                    state.stress_event_chance = 0.0;
                    let (lo, hi) = mode.impulse_range();
                    let impulse = noise.next_int(lo, hi);
                    info!(subject = %subject_id, impulse, "stress event triggered");
                    return Some(impulse);
                }
                None
            }
            TrendPhase::Stressing => {
                // single-tick peak
                state.phase = TrendPhase::Recovering;
                info!(subject = %subject_id, "recovery phase started");
                None
            }
            TrendPhase::Recovering => {
                if current_hr <= state.baseline_hr + RECOVERY_MARGIN {
                    state.phase = TrendPhase::Stable;
                    state.stress_event_chance = restore_chance;
                    info!(subject = %subject_id, "recovery phase ended");
                }
                None
            }
        }
    }
}
