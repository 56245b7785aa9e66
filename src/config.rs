//! Engine configuration
//!
//! Tunables for the stochastic components. Defaults reproduce the stock
//! simulation profile; a JSON document can override any subset of fields.
//! Overrides are validated before an engine is built around them.

use serde::Deserialize;

use crate::error::ConfigError;

/// Default per-tick probability of starting a stress event while `Stable`
pub const DEFAULT_STRESS_EVENT_CHANCE: f64 = 0.05;

/// Default inclusive range baseline heart rate is drawn from
pub const DEFAULT_BASELINE_HR_RANGE: (i32, i32) = (60, 80);

/// Default inclusive range baseline HRV is drawn from
pub const DEFAULT_BASELINE_HRV_RANGE: (i32, i32) = (40, 70);

/// Default range base steadiness is drawn from
pub const DEFAULT_BASE_STEADINESS_RANGE: (f64, f64) = (0.75, 0.95);

/// Default step interval for historical backfill, in seconds
pub const DEFAULT_BACKFILL_STEP_SECS: i64 = 5;

/// Default live tick interval, in seconds
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;

/// Tunable engine parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-tick probability of starting a stress event while `Stable`.
    /// Zeroed for the duration of a stress/recovery cycle and restored to
    /// this value when the cycle ends.
    pub stress_event_chance: f64,
    /// Inclusive range each subject's baseline heart rate is drawn from
    pub baseline_hr_range: (i32, i32),
    /// Inclusive range each subject's baseline HRV is drawn from
    pub baseline_hrv_range: (i32, i32),
    /// Range each subject's base steadiness is drawn from
    pub base_steadiness_range: (f64, f64),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stress_event_chance: DEFAULT_STRESS_EVENT_CHANCE,
            baseline_hr_range: DEFAULT_BASELINE_HR_RANGE,
            baseline_hrv_range: DEFAULT_BASELINE_HRV_RANGE,
            base_steadiness_range: DEFAULT_BASE_STEADINESS_RANGE,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON; missing fields keep their defaults.
    /// The merged document is validated before it is returned.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every sampling range is ordered and the stress chance is a
    /// probability. A pinned range (`lo == hi`) is valid and draws a constant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.stress_event_chance) {
            return Err(ConfigError::InvalidChance(self.stress_event_chance));
        }
        let (lo, hi) = self.baseline_hr_range;
        ordered_range("baseline_hr_range", lo as f64, hi as f64)?;
        let (lo, hi) = self.baseline_hrv_range;
        ordered_range("baseline_hrv_range", lo as f64, hi as f64)?;
        let (lo, hi) = self.base_steadiness_range;
        ordered_range("base_steadiness_range", lo, hi)
    }
}

fn ordered_range(field: &'static str, lo: f64, hi: f64) -> Result<(), ConfigError> {
    if lo > hi {
        return Err(ConfigError::InvertedRange { field, lo, hi });
    }
    Ok(())
}
