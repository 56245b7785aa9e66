//! Persistence collaborator
//!
//! The engine never talks to a storage backend directly; it hands each tick's
//! DataPoint batch and updated snapshots to a [`TelemetryStore`] as one unit
//! of work. [`MemoryStore`] is the in-process implementation used by tests,
//! demos and the CLI harness.

use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{DataPoint, Subject};

/// Storage contract consumed by both drivers
pub trait TelemetryStore {
    /// Full subject roster. Implementations must return a stable order
    /// across calls; the drivers process subjects in this order.
    fn list_subjects(&self) -> Result<Vec<Subject>, StoreError>;

    /// Append the DataPoint batch and upsert the snapshots as a single
    /// transactional unit. An error means the whole unit was rolled back.
    fn commit_batch(&mut self, points: &[DataPoint], snapshots: &[Subject])
        -> Result<(), StoreError>;
}

/// Insertion-ordered in-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    subjects: Vec<Subject>,
    points: Vec<DataPoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All appended DataPoints, in commit order
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// DataPoints belonging to one subject, in commit order
    pub fn points_for(&self, subject_id: Uuid) -> Vec<DataPoint> {
        self.points
            .iter()
            .filter(|p| p.subject_id == subject_id)
            .cloned()
            .collect()
    }

    /// Current snapshot for one subject, if present
    pub fn subject(&self, subject_id: Uuid) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == subject_id)
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }
}

impl TelemetryStore for MemoryStore {
    fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        Ok(self.subjects.clone())
    }

    fn commit_batch(
        &mut self,
        points: &[DataPoint],
        snapshots: &[Subject],
    ) -> Result<(), StoreError> {
        self.points.extend_from_slice(points);
        for snapshot in snapshots {
            match self.subjects.iter_mut().find(|s| s.id == snapshot.id) {
                Some(existing) => *existing = snapshot.clone(),
                None => self.subjects.push(snapshot.clone()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_subject(name: &str) -> Subject {
        Subject::new(name.to_string(), "Nurse".to_string(), Utc::now())
    }

    #[test]
    fn test_upsert_replaces_without_duplicating() {
        let mut store = MemoryStore::new();
        let mut subject = make_subject("Bob White");

        store.commit_batch(&[], &[subject.clone()]).unwrap();
        subject.current_heart_rate = 95;
        store.commit_batch(&[], &[subject.clone()]).unwrap();

        assert_eq!(store.subject_count(), 1);
        assert_eq!(store.subject(subject.id).unwrap().current_heart_rate, 95);
    }

    #[test]
    fn test_roster_order_is_insertion_order() {
        let mut store = MemoryStore::new();
        let names = ["Dr. Alice Green", "Bob White", "Carol Black"];
        let subjects: Vec<Subject> = names.iter().map(|n| make_subject(n)).collect();
        store.commit_batch(&[], &subjects).unwrap();

        let listed = store.list_subjects().unwrap();
        let listed_names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(listed_names, names);

        // a later upsert must not reshuffle the roster
        let mut carol = subjects[2].clone();
        carol.current_hrv = 61;
        store.commit_batch(&[], &[carol]).unwrap();
        let listed = store.list_subjects().unwrap();
        assert_eq!(listed[2].name, "Carol Black");
        assert_eq!(listed[2].current_hrv, 61);
    }

    #[test]
    fn test_points_accumulate_per_subject() {
        let mut store = MemoryStore::new();
        let alice = make_subject("Dr. Alice Green");
        let bob = make_subject("Bob White");
        store
            .commit_batch(&[], &[alice.clone(), bob.clone()])
            .unwrap();

        let point = |subject: &Subject, hr: i32| DataPoint {
            subject_id: subject.id,
            timestamp: Utc::now(),
            heart_rate: hr,
            hrv: 50,
            steadiness: 0.85,
            sleep_index: 0.0,
            mwi: 75.0,
            steps: Some(2),
        };

        store
            .commit_batch(&[point(&alice, 72), point(&bob, 68), point(&alice, 74)], &[])
            .unwrap();

        assert_eq!(store.points().len(), 3);
        assert_eq!(store.points_for(alice.id).len(), 2);
        assert_eq!(store.points_for(bob.id).len(), 1);
    }
}
