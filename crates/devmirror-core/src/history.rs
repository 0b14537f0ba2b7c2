//! Session history
//!
//! An append-only, chronologically ordered log of scored analysis records for
//! one subject. Entry 0 is the permanent baseline. Entries are never edited or
//! removed; corrections are new entries.

use chrono::{DateTime, Utc};
use devmirror_shared::{AnalysisRecord, Result, StructuralScore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One scored snapshot in a subject's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub record: AnalysisRecord,
    pub score: StructuralScore,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Entry stamped with the current time
    pub fn new(record: AnalysisRecord, score: StructuralScore) -> Self {
        Self::at(record, score, Utc::now())
    }

    pub fn at(record: AnalysisRecord, score: StructuralScore, recorded_at: DateTime<Utc>) -> Self {
        Self {
            record,
            score,
            recorded_at,
        }
    }
}

/// Ordered, append-only history for one subject
///
/// Callers supply entries oldest first; the history never reorders them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap entries already sorted oldest to newest
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry, returning its index
    pub fn append(&mut self, entry: HistoryEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Copy of this history with one more entry
    pub fn with_entry(&self, entry: HistoryEntry) -> Self {
        let mut extended = self.clone();
        extended.append(entry);
        extended
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry, the long-term reference point
    pub fn baseline(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Entry just before the latest one
    pub fn previous(&self) -> Option<&HistoryEntry> {
        self.entries.len().checked_sub(2).map(|i| &self.entries[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    /// Score values in order
    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.score.value())
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Durable per-subject history storage
///
/// Implementations serialize writes per subject and must preserve append order.
#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore {
    /// Full history for a subject, empty when the subject is unknown
    fn load(&self, subject: &str) -> Result<History>;

    /// Append one entry to a subject's history
    fn append(&mut self, subject: &str, entry: HistoryEntry) -> Result<()>;
}

/// Volatile store keeping every history in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    histories: HashMap<String, History>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn load(&self, subject: &str) -> Result<History> {
        Ok(self.histories.get(subject).cloned().unwrap_or_default())
    }

    fn append(&mut self, subject: &str, entry: HistoryEntry) -> Result<()> {
        self.histories
            .entry(subject.to_string())
            .or_default()
            .append(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: f64) -> HistoryEntry {
        HistoryEntry::new(AnalysisRecord::default(), StructuralScore::new(score))
    }

    #[test]
    fn test_empty_history() {
        let history = History::new();
        assert!(history.is_empty());
        assert!(history.baseline().is_none());
        assert!(history.latest().is_none());
        assert!(history.previous().is_none());
    }

    #[test]
    fn test_baseline_latest_previous() {
        let mut history = History::new();
        assert_eq!(history.append(entry(50.0)), 0);
        assert!(history.previous().is_none());
        assert_eq!(history.latest().unwrap().score.value(), 50.0);

        history.append(entry(60.0));
        history.append(entry(70.0));

        assert_eq!(history.len(), 3);
        assert_eq!(history.baseline().unwrap().score.value(), 50.0);
        assert_eq!(history.previous().unwrap().score.value(), 60.0);
        assert_eq!(history.latest().unwrap().score.value(), 70.0);
        assert_eq!(history.scores().collect::<Vec<_>>(), vec![50.0, 60.0, 70.0]);
    }

    #[test]
    fn test_with_entry_leaves_original_untouched() {
        let history = History::from_entries(vec![entry(10.0)]);
        let extended = history.with_entry(entry(20.0));
        assert_eq!(history.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.baseline(), history.baseline());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let history = History::from_entries(vec![entry(42.0)]);
        let json = serde_json::to_value(&history).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["score"], 42.0);

        let back: History = serde_json::from_value(json).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn test_in_memory_store_keeps_subjects_apart() {
        let mut store = InMemoryHistoryStore::new();
        store.append("alice", entry(10.0)).unwrap();
        store.append("alice", entry(20.0)).unwrap();
        store.append("bob", entry(90.0)).unwrap();

        assert_eq!(store.load("alice").unwrap().len(), 2);
        assert_eq!(store.load("bob").unwrap().len(), 1);
        assert!(store.load("carol").unwrap().is_empty());
    }
}
