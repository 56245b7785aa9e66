//! Per-subject simulation state
//!
//! One record per tracked subject, created lazily the first time a driver
//! encounters the subject and kept for the process lifetime (a backfill run
//! resets the whole map first). The record is private to the engine; external
//! collaborators only ever see snapshots and DataPoints.

use crate::config::EngineConfig;
use crate::rng::NoiseSource;
use crate::sleep::{NightlySleep, SleepModel};
use crate::types::TrendPhase;

/// Mutable per-subject record threading the stochastic components together
/// across ticks
#[derive(Debug, Clone)]
pub struct SubjectState {
    /// Heart rate the subject reverts toward while `Stable`
    pub baseline_hr: i32,
    /// HRV centre used by the recovery check
    pub baseline_hrv: i32,
    /// Long-run steadiness level
    pub base_steadiness: f64,
    /// Current stress-cycle phase
    pub phase: TrendPhase,
    /// Per-tick probability of a new stress event; zero for the duration of a
    /// stress/recovery cycle
    pub stress_event_chance: f64,
    /// Last night's sleep values
    pub nightly: NightlySleep,
}

impl SubjectState {
    /// Draw a fresh state for a subject seen for the first time
    pub fn init(noise: &mut dyn NoiseSource, config: &EngineConfig) -> Self {
        let (hr_lo, hr_hi) = config.baseline_hr_range;
        let (hrv_lo, hrv_hi) = config.baseline_hrv_range;
        let (steady_lo, steady_hi) = config.base_steadiness_range;

        Self {
            baseline_hr: noise.next_int(hr_lo, hr_hi),
            baseline_hrv: noise.next_int(hrv_lo, hrv_hi),
            base_steadiness: noise.next_uniform(steady_lo, steady_hi),
            phase: TrendPhase::Stable,
            stress_event_chance: config.stress_event_chance,
            nightly: SleepModel::draw_nightly(noise),
        }
    }

    /// Redraw nightly sleep values at a day boundary
    pub fn resample_nightly(&mut self, noise: &mut dyn NoiseSource) {
        self.nightly = SleepModel::draw_nightly(noise);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PrngNoise;

    #[test]
    fn test_init_draws_within_configured_ranges() {
        let config = EngineConfig::default();
        let mut noise = PrngNoise::seeded(3);

        for _ in 0..100 {
            let state = SubjectState::init(&mut noise, &config);
            assert!((60..=80).contains(&state.baseline_hr));
            assert!((40..=70).contains(&state.baseline_hrv));
            assert!((0.75..0.95).contains(&state.base_steadiness));
            assert_eq!(state.phase, TrendPhase::Stable);
            assert!((state.stress_event_chance - 0.05).abs() < 1e-9);
        }
    }

    #[test]
    fn test_resample_nightly_replaces_values() {
        let config = EngineConfig::default();
        let mut noise = PrngNoise::seeded(3);
        let mut state = SubjectState::init(&mut noise, &config);

        let before = state.nightly;
        state.resample_nightly(&mut noise);
        // fresh draws from a moving stream; equality would mean the draw was skipped
        assert!(
            (state.nightly.index - before.index).abs() > f64::EPSILON
                || (state.nightly.hours - before.hours).abs() > f64::EPSILON
        );
    }
}
