use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Separates the date prefix from the rest of an entry's first line.
pub const DATE_DELIMITER: char = '—';

/// Format used for the date prefix, e.g. "March 12, 2025".
pub const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct LogEntry {
    pub lines: Vec<String>,
}

impl LogEntry {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Date part of the first line, if it carries one.
    pub fn date_part(&self) -> Option<&str> {
        self.lines
            .first()
            .and_then(|line| line.split_once(DATE_DELIMITER))
            .map(|(date, _)| date.trim())
    }

    /// What `loglist` shows next to the id.
    pub fn date_label(&self) -> String {
        match (self.date_part(), self.lines.first()) {
            (Some(date), _) => date.to_string(),
            (None, Some(first)) => first.trim().to_string(),
            (None, None) => String::from("No Date (Malformed Entry)"),
        }
    }

    /// Prefixes the first line with `date` unless it already has a date part.
    pub fn ensure_dated(&mut self, date: &str) {
        if let Some(first) = self.lines.first_mut()
            && !first.contains(DATE_DELIMITER)
        {
            *first = format!("{date} {DATE_DELIMITER} {first}");
        }
    }
}

/// Journal entries keyed by their integer id. JSON keys are the ids'
/// decimal strings.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(transparent)]
pub struct Journal {
    entries: BTreeMap<u64, LogEntry>,
}

impl Journal {
    /// One past the highest id in use, or 1 for an empty journal. `None` when
    /// `u64::MAX` is in use.
    pub fn next_id(&self) -> Option<u64> {
        self.entries
            .keys()
            .next_back()
            .map_or(Some(1), |max| max.checked_add(1))
    }

    pub fn get(&self, id: u64) -> Option<&LogEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn insert(&mut self, id: u64, entry: LogEntry) {
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: u64) -> Option<LogEntry> {
        self.entries.remove(&id)
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &LogEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Journal {
    type Item = (u64, LogEntry);
    type IntoIter = std::collections::btree_map::IntoIter<u64, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(lines: &[&str]) -> LogEntry {
        LogEntry::new(lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_next_id_follows_max() {
        let mut journal = Journal::default();
        assert_eq!(journal.next_id(), Some(1));

        journal.insert(1, entry(&["a"]));
        journal.insert(5, entry(&["b"]));
        assert_eq!(journal.next_id(), Some(6));

        journal.remove(5);
        assert_eq!(journal.next_id(), Some(2));

        journal.insert(u64::MAX, entry(&["c"]));
        assert_eq!(journal.next_id(), None);
    }

    #[test]
    fn test_date_label() {
        assert_eq!(
            entry(&["March 12, 2025 — Mia smiled.", "Second"]).date_label(),
            "March 12, 2025"
        );
        assert_eq!(entry(&["  no date here "]).date_label(), "no date here");
        assert_eq!(entry(&[]).date_label(), "No Date (Malformed Entry)");
    }

    #[test]
    fn test_ensure_dated_only_once() {
        let mut dated = entry(&["Went hiking"]);
        dated.ensure_dated("May 01, 2025");
        assert_eq!(dated.lines[0], "May 01, 2025 — Went hiking");

        dated.ensure_dated("June 02, 2025");
        assert_eq!(dated.lines[0], "May 01, 2025 — Went hiking");
    }
}
