//! Vitals generation
//!
//! Computes the next heart rate, HRV, steadiness and step count for one
//! subject from the previous values and the current trend phase. Every output
//! is deterministically bounded by clamping, so this component has no error
//! conditions.

use crate::rng::NoiseSource;
use crate::state::SubjectState;
use crate::types::{TickMode, TrendPhase};

/// Heart-rate bounds (bpm)
pub const HR_MIN: i32 = 50;
pub const HR_MAX: i32 = 160;

/// HRV bounds (ms)
pub const HRV_MIN: i32 = 15;
pub const HRV_MAX: i32 = 100;

/// Width of the stable band above baseline before the corrective pull engages
pub const STABLE_BAND_ABOVE: i32 = 10;

/// Width of the stable band below baseline before the corrective pull engages
pub const STABLE_BAND_BELOW: i32 = 5;

/// New vitals for one subject for one tick
#[derive(Debug, Clone, Copy)]
pub struct Vitals {
    pub heart_rate: i32,
    pub hrv: i32,
    pub steadiness: f64,
    /// Present on live ticks only
    pub steps: Option<u32>,
}

pub struct VitalsGenerator;

impl VitalsGenerator {
    /// Generate the next vitals. The trend phase is consulted, never mutated;
    /// `impulse` carries the one-time spike when a stress event fired this
    /// tick.
    pub fn generate(
        noise: &mut dyn NoiseSource,
        state: &SubjectState,
        prev_hr: i32,
        prev_hrv: i32,
        impulse: Option<i32>,
        mode: TickMode,
    ) -> Vitals {
        let heart_rate = next_heart_rate(noise, state, prev_hr, impulse);
        let hrv = next_hrv(noise, state, prev_hrv, heart_rate);
        let steadiness = next_steadiness(noise, state);
        let steps = if mode.records_steps() {
            Some(noise.next_int(0, 10) as u32)
        } else {
            None
        };

        Vitals {
            heart_rate,
            hrv,
            steadiness,
            steps,
        }
    }
}

fn next_heart_rate(
    noise: &mut dyn NoiseSource,
    state: &SubjectState,
    prev: i32,
    impulse: Option<i32>,
) -> i32 {
    let bias = match state.phase {
        TrendPhase::Stressing => 1,
        TrendPhase::Recovering => -1,
        TrendPhase::Stable => 0,
    };
    let mut next = prev + noise.next_int(-2, 2) + bias * 2 + impulse.unwrap_or(0);

    if state.phase == TrendPhase::Stable {
        let high = state.baseline_hr + STABLE_BAND_ABOVE;
        let low = state.baseline_hr - STABLE_BAND_BELOW;
        if next > high {
            next -= noise.next_int(1, 2);
        } else if next < low {
            next += noise.next_int(1, 2);
        }
        // the pull can leave a one-unit overshoot at either edge
        next = next.clamp(low, high);
    }

    next.clamp(HR_MIN, HR_MAX)
}

fn next_hrv(noise: &mut dyn NoiseSource, state: &SubjectState, prev: i32, heart_rate: i32) -> i32 {
    let mut change = noise.next_int(-3, 3);

    match state.phase {
        TrendPhase::Stressing => change -= noise.next_int(4, 8),
        TrendPhase::Recovering => change += noise.next_int(2, 5),
        TrendPhase::Stable => {}
    }

    // inverse correlation with the absolute heart-rate level
    if heart_rate > 100 {
        change -= noise.next_int(1, 5);
    } else if heart_rate < 70 {
        change += noise.next_int(0, 2);
    }

    (prev + change).clamp(HRV_MIN, HRV_MAX)
}

fn next_steadiness(noise: &mut dyn NoiseSource, state: &SubjectState) -> f64 {
    let mut next = state.base_steadiness + noise.next_uniform(-0.05, 0.05);

    match state.phase {
        TrendPhase::Stressing => next -= noise.next_uniform(0.0, 0.1),
        TrendPhase::Recovering => next += noise.next_uniform(0.0, 0.05),
        TrendPhase::Stable => {}
    }

    round2(next.clamp(0.0, 1.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
