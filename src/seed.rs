//! Roster seeding
//!
//! The engine only generates data for subjects the store already knows about.
//! This module populates an empty store from `{name, role}` seed pairs: a
//! JSON document, or the built-in sample roster. Malformed entries are
//! skipped with a warning rather than failing the whole document.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{SeedError, StoreError};
use crate::store::TelemetryStore;
use crate::types::Subject;
use serde::{Deserialize, Serialize};

/// Roster seed entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSeed {
    pub name: String,
    pub role: String,
}

/// Built-in starter roster used when no seed document is supplied
pub fn sample_roster() -> Vec<SubjectSeed> {
    [
        ("Dr. Alice Green", "Doctor"),
        ("Bob White", "Nurse"),
        ("Carol Black", "Nurse"),
        ("Dave Gray", "Technician"),
    ]
    .into_iter()
    .map(|(name, role)| SubjectSeed {
        name: name.to_string(),
        role: role.to_string(),
    })
    .collect()
}

/// Parse a roster document: a JSON array of `{name, role}` objects.
///
/// Entries that are not objects, are missing fields, or carry empty values
/// are skipped with a warning. An unparseable document is an error.
pub fn parse_roster(json: &str) -> Result<Vec<SubjectSeed>, SeedError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let mut seeds = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<SubjectSeed>(entry) {
            Ok(seed) if !seed.name.trim().is_empty() && !seed.role.trim().is_empty() => {
                seeds.push(seed);
            }
            Ok(_) => warn!(index, "skipping roster entry with empty name or role"),
            Err(err) => warn!(index, %err, "skipping malformed roster entry"),
        }
    }
    Ok(seeds)
}

/// Create snapshots for the seeds when the store holds no subjects yet.
///
/// Returns how many subjects were created; 0 when the roster was already
/// populated (the seeds are then left untouched).
pub fn populate_if_empty(
    store: &mut dyn TelemetryStore,
    seeds: &[SubjectSeed],
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let existing = store.list_subjects()?;
    if !existing.is_empty() {
        info!(count = existing.len(), "roster already populated");
        return Ok(0);
    }

    let subjects: Vec<Subject> = seeds
        .iter()
        .map(|seed| Subject::new(seed.name.clone(), seed.role.clone(), now))
        .collect();
    store.commit_batch(&[], &subjects)?;
    info!(count = subjects.len(), "seeded initial roster");
    Ok(subjects.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_sample_roster_shape() {
        let roster = sample_roster();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[0].name, "Dr. Alice Green");
        assert_eq!(roster[0].role, "Doctor");
    }

    #[test]
    fn test_parse_roster_skips_unusable_entries() {
        let json = r#"[
            {"name": "Dr. Alice Green", "role": "Doctor"},
            {"name": "", "role": "Nurse"},
            {"role": "Technician"},
            "not an object",
            {"name": "Dave Gray", "role": "Technician"}
        ]"#;

        let seeds = parse_roster(json).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].name, "Dr. Alice Green");
        assert_eq!(seeds[1].name, "Dave Gray");
    }

    #[test]
    fn test_parse_roster_rejects_invalid_document() {
        assert!(parse_roster("not json at all").is_err());
        assert!(parse_roster(r#"{"name": "no array"}"#).is_err());
    }

    #[test]
    fn test_populate_only_when_empty() {
        let mut store = MemoryStore::new();
        let now = Utc::now();

        let created = populate_if_empty(&mut store, &sample_roster(), now).unwrap();
        assert_eq!(created, 4);
        assert_eq!(store.subject_count(), 4);

        // second call is a no-op
        let created = populate_if_empty(&mut store, &sample_roster(), now).unwrap();
        assert_eq!(created, 0);
        assert_eq!(store.subject_count(), 4);
    }

    #[test]
    fn test_seeded_subjects_start_from_defaults() {
        let mut store = MemoryStore::new();
        populate_if_empty(&mut store, &sample_roster(), Utc::now()).unwrap();

        let roster = store.list_subjects().unwrap();
        for subject in roster {
            assert_eq!(subject.current_heart_rate, 70);
            assert_eq!(subject.current_hrv, 50);
            assert!((subject.mental_wellness_index - 75.0).abs() < 0.001);
        }
    }
}
