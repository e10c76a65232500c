use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::CellCount;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Won,
    Lost,
}

impl GameOutcome {
    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

/// One finished game, immutable once created
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub level: String,
    pub result: GameOutcome,
    /// Seconds between the first accepted click and the terminal state
    pub duration: u32,
    pub clicks: u32,
    pub date: DateTime<Utc>,
    /// "RxC" board label, e.g. "8x8"
    pub size: String,
    pub mines: CellCount,
}

/// Bounded log of finished games, newest first.
///
/// Serializes as a plain list so the persisted form stays a single JSON
/// array that is rewritten whole on every mutation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<SessionRecord>,
}

impl History {
    pub const MAX_ENTRIES: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Prepend a record and drop anything beyond the cap
    pub fn push(&mut self, record: SessionRecord) {
        self.records.insert(0, record);
        self.records.truncate(Self::MAX_ENTRIES);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            id: id.to_owned(),
            level: "Easy".to_owned(),
            result: GameOutcome::Won,
            duration: 12,
            clicks: 7,
            date: Utc::now(),
            size: "8x8".to_owned(),
            mines: 10,
        }
    }

    #[test]
    fn newest_record_is_first() {
        let mut history = History::new();
        history.push(record("a"));
        history.push(record("b"));
        assert_eq!(history.records()[0].id, "b");
        assert_eq!(history.records()[1].id, "a");
    }

    #[test]
    fn log_never_exceeds_the_cap() {
        let mut history = History::new();
        for id in ["a", "b", "c", "d", "e"] {
            history.push(record(id));
        }
        assert_eq!(history.len(), History::MAX_ENTRIES);
        let ids: Vec<_> = history.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["e", "d", "c"]);
    }

    #[test]
    fn serializes_as_a_plain_list() {
        let mut history = History::new();
        history.push(record("a"));
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.starts_with('['));
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }
}
