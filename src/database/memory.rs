//! In-process store, for tests and for hosts that persist elsewhere.
use super::HistoryStore;
use crate::error::Result;
use crate::models::ReviewHistory;

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    history: Option<ReviewHistory>,
    pub save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: ReviewHistory) -> Self {
        Self {
            history: Some(history),
            save_count: 0,
        }
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Option<ReviewHistory>> {
        Ok(self.history.clone())
    }

    fn save(&mut self, history: &ReviewHistory) -> Result<()> {
        self.history = Some(history.clone());
        self.save_count += 1;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.history = None;
        Ok(())
    }
}
