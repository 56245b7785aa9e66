//! Core types for the WardPulse engine
//!
//! This module defines the records that flow through each tick: the mutable
//! subject snapshot (also the push-update payload shape), the immutable
//! telemetry DataPoint, and the categorical enums shared by the components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorical stress level derived each tick from heart rate and HRV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressLevel {
    Normal,
    High,
    Critical,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Normal => "Normal",
            StressLevel::High => "High",
            StressLevel::Critical => "Critical",
        }
    }
}

/// Position in the stress cycle. Internal to the engine; never part of a
/// serialized payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPhase {
    Stable,
    Stressing,
    Recovering,
}

/// Whether a tick originates from the live scheduler or a historical backfill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    Live,
    Backfill,
}

impl TickMode {
    /// Inclusive range the one-time stress impulse is drawn from
    pub fn impulse_range(&self) -> (i32, i32) {
        match self {
            TickMode::Live => (20, 40),
            TickMode::Backfill => (10, 20),
        }
    }

    /// Step counts are sampled on live ticks only
    pub fn records_steps(&self) -> bool {
        matches!(self, TickMode::Live)
    }
}

/// Live status snapshot for one tracked subject.
///
/// Owned and mutated exclusively by the simulation engine; collaborators see
/// it read-only. Its serialized form is exactly the per-subject push-update
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable subject identity
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Duty role (e.g. "Doctor", "Nurse")
    pub role: String,
    /// Stress level from the latest tick
    pub stress_level: StressLevel,
    /// Latest heart rate (bpm)
    pub current_heart_rate: i32,
    /// Latest heart-rate variability (ms)
    pub current_hrv: i32,
    /// Hours slept during the current night
    pub sleep_hours_last_night: f64,
    /// Latest motor steadiness (0-1)
    pub current_steadiness: f64,
    /// Latest sleep index (0-10)
    pub current_sleep_index: f64,
    /// Latest mental wellness index (0-100)
    pub mental_wellness_index: f64,
    /// Timestamp of the latest tick (UTC)
    pub last_update: DateTime<Utc>,
}

impl Subject {
    /// Fresh snapshot for a newly seeded subject, before any tick has run
    pub fn new(name: String, role: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            role,
            stress_level: StressLevel::Normal,
            current_heart_rate: 70,
            current_hrv: 50,
            sleep_hours_last_night: 7.0,
            current_steadiness: 0.85,
            current_sleep_index: 7.0,
            mental_wellness_index: 75.0,
            last_update: now,
        }
    }
}

/// One immutable telemetry record, appended per subject per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Subject this record belongs to
    pub subject_id: Uuid,
    /// When the record was generated (UTC)
    pub timestamp: DateTime<Utc>,
    /// Heart rate (bpm)
    pub heart_rate: i32,
    /// Heart-rate variability (ms)
    pub hrv: i32,
    /// Motor steadiness (0-1, two decimals)
    pub steadiness: f64,
    /// Sleep index (0-10)
    pub sleep_index: f64,
    /// Mental wellness index (0-100, one decimal)
    pub mwi: f64,
    /// Step count for this tick; present on live ticks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_subject() -> Subject {
        Subject::new(
            "Dr. Alice Green".to_string(),
            "Doctor".to_string(),
            Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_subject_defaults() {
        let subject = make_subject();
        assert_eq!(subject.stress_level, StressLevel::Normal);
        assert_eq!(subject.current_heart_rate, 70);
        assert_eq!(subject.current_hrv, 50);
        assert!((subject.sleep_hours_last_night - 7.0).abs() < 0.001);
        assert!((subject.current_steadiness - 0.85).abs() < 0.001);
        assert!((subject.current_sleep_index - 7.0).abs() < 0.001);
        assert!((subject.mental_wellness_index - 75.0).abs() < 0.001);
    }

    #[test]
    fn test_subject_serializes_to_update_payload_shape() {
        let subject = make_subject();
        let value = serde_json::to_value(&subject).unwrap();

        assert_eq!(value["name"], "Dr. Alice Green");
        assert_eq!(value["role"], "Doctor");
        assert_eq!(value["stress_level"], "Normal");
        assert_eq!(value["current_heart_rate"], 70);
        assert_eq!(value["current_hrv"], 50);
        assert_eq!(value["sleep_hours_last_night"], 7.0);
        assert_eq!(value["current_steadiness"], 0.85);
        assert_eq!(value["current_sleep_index"], 7.0);
        assert_eq!(value["mental_wellness_index"], 75.0);
        // ISO-8601 timestamp
        assert_eq!(value["last_update"], "2024-03-05T12:00:00Z");
    }

    #[test]
    fn test_data_point_omits_absent_steps() {
        let subject = make_subject();
        let point = DataPoint {
            subject_id: subject.id,
            timestamp: subject.last_update,
            heart_rate: 72,
            hrv: 55,
            steadiness: 0.84,
            sleep_index: 0.0,
            mwi: 74.5,
            steps: None,
        };

        let value = serde_json::to_value(&point).unwrap();
        assert!(value.get("steps").is_none());

        let with_steps = DataPoint {
            steps: Some(4),
            ..point
        };
        let value = serde_json::to_value(&with_steps).unwrap();
        assert_eq!(value["steps"], 4);
    }

    #[test]
    fn test_impulse_ranges_per_mode() {
        assert_eq!(TickMode::Live.impulse_range(), (20, 40));
        assert_eq!(TickMode::Backfill.impulse_range(), (10, 20));
        assert!(TickMode::Live.records_steps());
        assert!(!TickMode::Backfill.records_steps());
    }
}
