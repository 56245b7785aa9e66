//! Sleep model
//!
//! Tracks one simulated day at a time and derives a per-timestamp sleep index
//! from the timestamp's own clock hour, so historical backfill produces
//! correct curves for any past hour. Nightly values are redrawn exactly once
//! per observed calendar-day change, no matter how many subjects are
//! processed in the loop that observes it.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tracing::debug;

use crate::rng::NoiseSource;

/// Lower bound of the nightly sleep draws
pub const NIGHTLY_MIN: f64 = 5.0;

/// Upper bound of the nightly sleep draws
pub const NIGHTLY_MAX: f64 = 9.5;

/// Sleep index bounds
pub const SLEEP_INDEX_MIN: f64 = 0.0;
pub const SLEEP_INDEX_MAX: f64 = 10.0;

/// Last night's sleep values for one subject, redrawn at each day boundary
#[derive(Debug, Clone, Copy)]
pub struct NightlySleep {
    /// Sleep quality on the 0-10 index scale
    pub index: f64,
    /// Hours slept
    pub hours: f64,
}

/// Day-of-simulation tracker plus the time-of-day sleep curve
#[derive(Debug, Default)]
pub struct SleepModel {
    last_simulated_day: Option<NaiveDate>,
}

impl SleepModel {
    pub fn new() -> Self {
        Self {
            last_simulated_day: None,
        }
    }

    /// Record the observed day. Returns `true` exactly once per day change
    /// (including the first day ever observed); `false` on every further call
    /// within the same day. Callers redraw nightly values when this reports a
    /// rollover.
    pub fn advance_day_if_needed(&mut self, day: NaiveDate) -> bool {
        if self.last_simulated_day == Some(day) {
            return false;
        }
        debug!(%day, "simulated day advanced");
        self.last_simulated_day = Some(day);
        true
    }

    /// Draw fresh nightly sleep values for one subject
    pub fn draw_nightly(noise: &mut dyn NoiseSource) -> NightlySleep {
        NightlySleep {
            index: noise.next_uniform(NIGHTLY_MIN, NIGHTLY_MAX),
            hours: noise.next_uniform(NIGHTLY_MIN, NIGHTLY_MAX),
        }
    }

    /// Sleep index for a timestamp, given the subject's last-night level.
    ///
    /// Daytime hours are exactly 0.0; the evening hour ramps up toward the
    /// nightly level, the small hours hold it, and the waking hour ramps back
    /// down, each with a phase-sized jitter.
    pub fn index_at(noise: &mut dyn NoiseSource, at: DateTime<Utc>, nightly_index: f64) -> f64 {
        let minute = at.minute() as f64;
        match at.hour() {
            7..=22 => 0.0,
            23 => clamp_index(nightly_index * (minute / 60.0) + noise.next_uniform(-0.5, 0.5)),
            6 => clamp_index(nightly_index * (1.0 - minute / 60.0) + noise.next_uniform(-0.3, 0.3)),
            // 00:00-05:59, deep sleep
            _ => clamp_index(nightly_index + noise.next_uniform(-0.7, 0.7)),
        }
    }
}

fn clamp_index(value: f64) -> f64 {
    value.clamp(SLEEP_INDEX_MIN, SLEEP_INDEX_MAX)
}
