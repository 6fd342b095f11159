//! Persistence boundary for the review history.
//!
//! A store always reads and writes the whole [`ReviewHistory`] at once, so
//! per-card and aggregate counters are never written separately.

pub mod db;
pub mod memory;

pub use db::SqliteStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::ReviewHistory;
use tracing::warn;

pub trait HistoryStore {
    /// Reads the stored history. `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<ReviewHistory>>;

    /// Replaces the stored history with `history`.
    fn save(&mut self, history: &ReviewHistory) -> Result<()>;

    /// Deletes the whole stored history.
    fn reset(&mut self) -> Result<()>;

    /// Loads the history, substituting an empty one when it is missing or
    /// cannot be read. Totals are resynchronized with the cards.
    fn load_or_default(&self) -> ReviewHistory {
        match self.load() {
            Ok(Some(mut history)) => {
                history.resync();
                history
            }
            Ok(None) => ReviewHistory::new(),
            Err(e) => {
                warn!("Failed to load review history, starting empty: {}", e);
                ReviewHistory::new()
            }
        }
    }
}

impl<S: HistoryStore + ?Sized> HistoryStore for Box<S> {
    fn load(&self) -> Result<Option<ReviewHistory>> {
        (**self).load()
    }

    fn save(&mut self, history: &ReviewHistory) -> Result<()> {
        (**self).save(history)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn load_or_default(&self) -> ReviewHistory {
        (**self).load_or_default()
    }
}
