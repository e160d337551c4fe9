//! Structured event log.
//!
//! Every structural mutation (registration, linking, port allocation,
//! re-attachment) is recorded as a typed event with the node GUID, the tick
//! time, and a JSON payload. External logger collaborators read the log;
//! the core only appends.

use serde::{Deserialize, Serialize};

use crate::types::{Guid, SimTime};

/// Kind of a logged structural event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Registered,
    Deregistered,
    Linked,
    Unlinked,
    PortAllocated,
    PortReleased,
    Reattached,
    Notice,
}

/// One logged event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub guid: Guid,
    pub time: SimTime,
    pub kind: EventKind,
    pub payload: serde_json::Value,
}

/// Append-only event log for one simulation instance.
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(
        &mut self,
        guid: Guid,
        time: SimTime,
        kind: EventKind,
        payload: serde_json::Value,
    ) {
        self.records.push(EventRecord {
            guid,
            time,
            kind,
            payload,
        });
    }

    /// All records, in append order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records of one kind, in append order.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &EventRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serializes the whole log for external consumers.
    pub fn export(&self) -> serde_json::Value {
        serde_json::to_value(&self.records).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_filter() {
        let mut log = EventLog::new();
        log.record(1, 0.0, EventKind::Registered, serde_json::json!({}));
        log.record(2, 0.0, EventKind::Registered, serde_json::json!({}));
        log.record(1, 3.0, EventKind::Reattached, serde_json::json!({"to": 2}));

        assert_eq!(log.len(), 3);
        assert_eq!(log.of_kind(EventKind::Registered).count(), 2);
        let reattach = log.of_kind(EventKind::Reattached).next().unwrap();
        assert_eq!(reattach.guid, 1);
        assert_eq!(reattach.time, 3.0);
    }

    #[test]
    fn test_export_round_trips() {
        let mut log = EventLog::new();
        log.record(5, 1.5, EventKind::PortAllocated, serde_json::json!({"slot": 0}));
        let value = log.export();
        let parsed: Vec<EventRecord> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, EventKind::PortAllocated);
    }
}
