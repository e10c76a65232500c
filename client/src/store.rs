use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use varredor_core::History;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not access history file: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable storage for the session history: a single JSON file holding the
/// whole capped list, rewritten on every mutation. Good enough for a
/// 3-entry log; an append-and-trim structure would replace this if the cap
/// ever grew.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing or unreadable history degrades to an empty log
    pub fn load(&self) -> History {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::error!(
                    "could not parse history file {}: {err}",
                    self.path.display()
                );
                History::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => History::new(),
            Err(err) => {
                log::error!("could not read history file {}: {err}", self.path.display());
                History::new()
            }
        }
    }

    pub fn save(&self, history: &History) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(history)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use varredor_core::{GameOutcome, SessionRecord};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("varredor-{}-{name}.json", std::process::id()))
    }

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            id: id.to_owned(),
            level: "Hard".to_owned(),
            result: GameOutcome::Lost,
            duration: 31,
            clicks: 19,
            date: Utc::now(),
            size: "16x16".to_owned(),
            mines: 40,
        }
    }

    #[test]
    fn round_trips_the_whole_log() {
        let store = HistoryStore::new(temp_path("round-trip"));
        let mut history = History::new();
        history.push(record("a"));
        history.push(record("b"));

        store.save(&history).unwrap();
        assert_eq!(store.load(), history);

        store.clear().unwrap();
        assert!(store.load().is_empty());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn missing_and_corrupt_files_become_empty_histories() {
        let store = HistoryStore::new(temp_path("missing"));
        store.clear().unwrap();
        assert!(store.load().is_empty());

        let path = temp_path("corrupt");
        fs::write(&path, "not json").unwrap();
        let store = HistoryStore::new(&path);
        assert!(store.load().is_empty());
        store.clear().unwrap();
    }
}
