//! Workout Log Records
//!
//! Discrete logged events, each pointing at a hierarchy node by id. The log
//! holds a denormalized snapshot of the node name taken at logging time; it
//! never updates retroactively when the node is renamed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Display name used when a log references a node id that is no longer (or
/// never was) in the hierarchy.
pub const UNKNOWN_NODE_NAME: &str = "Unknown";

/// Default unit label for manually logged volume.
pub const DEFAULT_UNIT: &str = "reps/sets";

/// A single logged workout event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub id: String,

    /// Non-owning reference into the hierarchy. Dangling references are
    /// tolerated and resolve to [`UNKNOWN_NODE_NAME`] for display.
    pub node_id: String,

    /// Snapshot of the node name at logging time.
    pub node_name: String,

    #[serde(rename = "date")]
    pub logged_at: DateTime<Utc>,

    /// Volume contributed by this event. May be fractional (miles) or
    /// integral (reps); ordinary floating-point semantics.
    pub value: f64,

    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkoutLog {
    /// Build a log entry with a fresh uuid and the default unit label.
    pub fn new(
        node_id: impl Into<String>,
        node_name: impl Into<String>,
        value: f64,
        notes: Option<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            node_id: node_id.into(),
            node_name: node_name.into(),
            logged_at,
            value,
            unit: DEFAULT_UNIT.to_string(),
            notes,
        }
    }
}

/// In-memory log store, ordered most-recent-first.
///
/// The journal owns the `WorkoutLog` collection exclusively. It never touches
/// the hierarchy itself; callers pair every record/remove with exactly one
/// value delta on the tree (the two stores are not atomic with each other).
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<WorkoutLog>,
}

impl Journal {
    pub fn new(entries: Vec<WorkoutLog>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WorkoutLog] {
        &self.entries
    }

    pub fn get(&self, log_id: &str) -> Option<&WorkoutLog> {
        self.entries.iter().find(|log| log.id == log_id)
    }

    /// Most-recent-first slice of up to `n` entries.
    pub fn recent(&self, n: usize) -> &[WorkoutLog] {
        &self.entries[..self.entries.len().min(n)]
    }

    /// Prepend a log so the newest entry is always first.
    pub fn record(&mut self, log: WorkoutLog) {
        self.entries.insert(0, log);
    }

    /// Remove a log by id, returning it so the caller can reverse its value
    /// contribution. Missing ids are a no-op.
    pub fn remove(&mut self, log_id: &str) -> Option<WorkoutLog> {
        let idx = self.entries.iter().position(|log| log.id == log_id)?;
        Some(self.entries.remove(idx))
    }

    /// Drop every log whose node reference falls inside `node_ids`, returning
    /// the removed entries. Used when a subtree is deleted.
    pub fn retain_outside(&mut self, node_ids: &HashSet<String>) -> Vec<WorkoutLog> {
        let (dropped, kept): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|log| node_ids.contains(&log.node_id));
        self.entries = kept;
        dropped
    }

    pub fn clear(&mut self) -> Vec<WorkoutLog> {
        std::mem::take(&mut self.entries)
    }

    /// Number of entries logged on the same local calendar day as `now`.
    pub fn logged_today(&self, now: DateTime<Utc>) -> usize {
        let today = now.date_naive();
        self.entries
            .iter()
            .filter(|log| log.logged_at.date_naive() == today)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log_at(id: &str, node_id: &str, hour: u32) -> WorkoutLog {
        WorkoutLog {
            id: id.to_string(),
            node_id: node_id.to_string(),
            node_name: "HSPU".to_string(),
            logged_at: Utc.with_ymd_and_hms(2025, 12, 23, hour, 0, 0).unwrap(),
            value: 10.0,
            unit: DEFAULT_UNIT.to_string(),
            notes: None,
        }
    }

    #[test]
    fn record_keeps_newest_first() {
        let mut journal = Journal::default();
        journal.record(log_at("a", "n1", 9));
        journal.record(log_at("b", "n1", 10));
        assert_eq!(journal.entries()[0].id, "b");
        assert_eq!(journal.recent(1)[0].id, "b");
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut journal = Journal::new(vec![log_at("a", "n1", 9)]);
        assert!(journal.remove("nope").is_none());
        assert_eq!(journal.len(), 1);
        assert!(journal.get("a").is_some());
    }

    #[test]
    fn clear_takes_every_entry() {
        let mut journal = Journal::new(vec![log_at("a", "n1", 9), log_at("b", "n1", 10)]);
        let taken = journal.clear();
        assert_eq!(taken.len(), 2);
        assert!(journal.is_empty());
    }

    #[test]
    fn retain_outside_drops_subtree_references() {
        let mut journal = Journal::new(vec![
            log_at("a", "what-hspu", 9),
            log_at("b", "what-pullups", 10),
            log_at("c", "what-hspu", 11),
        ]);
        let mut subtree = HashSet::new();
        subtree.insert("what-hspu".to_string());

        let dropped = journal.retain_outside(&subtree);
        assert_eq!(dropped.len(), 2);
        assert_eq!(journal.len(), 1);
        assert_eq!(journal.entries()[0].id, "b");
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let log = log_at("a", "n1", 9);
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.get("nodeId").is_some());
        assert!(json.get("nodeName").is_some());
        assert!(json.get("date").is_some());
        assert!(json.get("notes").is_none());
    }
}
