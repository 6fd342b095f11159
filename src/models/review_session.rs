//! Review session: walks the due queue, grades items and writes the history
//! back to its store.
//!
//! The history is read once when the session starts. Each grade goes through
//! [`ReviewHistory::record_review`], so the scheduler and the aggregate
//! counters always move together, and the store only ever receives the
//! whole history.

use super::{Quality, ReviewCard, ReviewHistory, ReviewTotals, due_queue};
use crate::config::SavePolicy;
use crate::database::HistoryStore;
use crate::error::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub struct ReviewSession<S: HistoryStore> {
    store: S,
    history: ReviewHistory,
    queue: Vec<String>,
    current_index: usize,
    save_policy: SavePolicy,
    /// History changed since the last successful save
    dirty: bool,
    session_totals: ReviewTotals,
}

impl<S: HistoryStore> ReviewSession<S> {
    /// Loads the history (empty if missing or unreadable) and queues every
    /// catalog item that is due at `now`.
    pub fn start<I: AsRef<str>>(
        store: S,
        catalog_ids: &[I],
        now: DateTime<Utc>,
        save_policy: SavePolicy,
    ) -> Self {
        let history = store.load_or_default();
        let queue = due_queue(catalog_ids, &history, now);
        info!(
            due = queue.len(),
            catalog = catalog_ids.len(),
            "review session started"
        );

        Self {
            store,
            history,
            queue,
            current_index: 0,
            save_policy,
            dirty: false,
            session_totals: ReviewTotals::default(),
        }
    }

    pub fn history(&self) -> &ReviewHistory {
        &self.history
    }

    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    pub fn current_item(&self) -> Option<&str> {
        self.queue.get(self.current_index).map(String::as_str)
    }

    pub fn total_count(&self) -> usize {
        self.queue.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.queue.len().saturating_sub(self.current_index)
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.queue.len()
    }

    /// Grades the current item and moves to the next one.
    ///
    /// Returns the item's new card, or `None` when the queue is exhausted.
    /// If saving fails the review still counts in memory and the error is
    /// returned; the next save writes it out.
    pub fn grade_current(
        &mut self,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewCard>> {
        let Some(item_id) = self.queue.get(self.current_index) else {
            return Ok(None);
        };

        let card = self.history.record_review(item_id, quality, now).clone();
        self.current_index += 1;
        self.dirty = true;

        self.session_totals.total_questions_reviewed += 1;
        if quality.is_success() {
            self.session_totals.total_correct += 1;
        } else {
            self.session_totals.total_incorrect += 1;
        }
        debug!(item_id = %card.item_id, next_review_at = %card.next_review_at, "graded");

        if self.save_policy == SavePolicy::EveryReview {
            self.persist()?;
        }
        Ok(Some(card))
    }

    /// Grades with a plain right/wrong answer: `Good` or `Again`.
    pub fn grade_current_correct(
        &mut self,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewCard>> {
        self.grade_current(Quality::from_correct(correct), now)
    }

    /// Moves past the current item without grading it.
    pub fn skip_current(&mut self) {
        if !self.is_completed() {
            self.current_index += 1;
        }
    }

    pub fn session_reviewed(&self) -> u64 {
        self.session_totals.total_questions_reviewed
    }

    pub fn session_correct(&self) -> u64 {
        self.session_totals.total_correct
    }

    /// Accuracy of this session only, in percent
    pub fn session_accuracy(&self) -> u32 {
        self.session_totals.accuracy()
    }

    /// Wipes the whole history, in memory and in the store, and requeues
    /// the catalog.
    pub fn reset_history<I: AsRef<str>>(
        &mut self,
        catalog_ids: &[I],
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.store.reset()?;
        self.history.reset();
        self.dirty = false;
        self.queue = due_queue(catalog_ids, &self.history, now);
        self.current_index = 0;
        info!("review history reset, {} items queued", self.queue.len());
        Ok(())
    }

    /// Saves anything not yet written and hands back the history.
    pub fn finish(mut self) -> Result<ReviewHistory> {
        if self.dirty {
            self.persist()?;
        }
        info!(
            reviewed = self.session_reviewed(),
            accuracy = self.session_accuracy(),
            "review session finished"
        );
        Ok(self.history)
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.history)?;
        self.dirty = false;
        Ok(())
    }
}
