//! JSON persistence and import/export of the review history.
//! The history is stored as a single pretty-printed document.

use crate::database::HistoryStore;
use crate::error::Result;
use crate::models::ReviewHistory;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Exports a history to a JSON file at the specified path.
/// The file is written next to the target first and then renamed over it.
pub fn export_history_to_path(history: &ReviewHistory, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json_string = serde_json::to_string_pretty(history)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json_string)?;
    fs::rename(&tmp_path, path)?;

    debug!(cards = history.card_count(), "history written to {}", path.display());
    Ok(())
}

/// Imports a history from a JSON file, re-deriving the totals from the cards
/// if they disagree.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_history(path: &Path) -> Result<ReviewHistory> {
    let contents = fs::read_to_string(path)?;
    let mut history: ReviewHistory = serde_json::from_str(&contents)?;
    history.resync();

    info!(
        "Imported {} review cards from '{}'",
        history.card_count(),
        path.display()
    );
    Ok(history)
}

/// [`HistoryStore`] backed by one JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Option<ReviewHistory>> {
        match import_history(&self.path) {
            Ok(history) => Ok(Some(history)),
            Err(crate::error::StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, history: &ReviewHistory) -> Result<()> {
        export_history_to_path(history, &self.path)
    }

    fn reset(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!("Review history at {} reset", self.path.display());
        Ok(())
    }
}
