//! Push-update transport
//!
//! After a tick's batch commits, the live driver pushes each updated snapshot
//! through an [`UpdateSink`]. Delivery is at-least-once with no ordering
//! guarantee across subjects; a failed delivery is logged by the driver and
//! does not block the remaining subjects.

use std::io::Write;

use crate::error::TransportError;
use crate::types::Subject;

/// Transport contract for per-subject push updates
pub trait UpdateSink {
    /// Deliver one subject's updated snapshot
    fn push_update(&mut self, subject: &Subject) -> Result<(), TransportError>;
}

/// Writes one JSON update per line to any writer
pub struct NdjsonSink<W: Write> {
    out: W,
}

impl<W: Write> NdjsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> UpdateSink for NdjsonSink<W> {
    fn push_update(&mut self, subject: &Subject) -> Result<(), TransportError> {
        serde_json::to_writer(&mut self.out, subject)?;
        self.out.write_all(b"\n")?;
        // a delivered update is a flushed update
        self.out.flush()?;
        Ok(())
    }
}

/// Collects updates in memory; used by tests and embedders that poll
#[derive(Debug, Default)]
pub struct MemorySink {
    updates: Vec<Subject>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered updates, oldest first
    pub fn updates(&self) -> &[Subject] {
        &self.updates
    }
}

impl UpdateSink for MemorySink {
    fn push_update(&mut self, subject: &Subject) -> Result<(), TransportError> {
        self.updates.push(subject.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_subject() -> Subject {
        Subject::new("Dave Gray".to_string(), "Technician".to_string(), Utc::now())
    }

    #[test]
    fn test_ndjson_sink_writes_one_line_per_update() {
        let mut sink = NdjsonSink::new(Vec::new());
        let subject = make_subject();

        sink.push_update(&subject).unwrap();
        sink.push_update(&subject).unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["name"], "Dave Gray");
        assert_eq!(value["role"], "Technician");
        assert_eq!(value["stress_level"], "Normal");
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        let first = make_subject();
        let second = make_subject();

        sink.push_update(&first).unwrap();
        sink.push_update(&second).unwrap();

        assert_eq!(sink.updates().len(), 2);
        assert_eq!(sink.updates()[0].id, first.id);
        assert_eq!(sink.updates()[1].id, second.id);
    }
}
