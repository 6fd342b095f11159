//! The whole review history of one learner: every card plus aggregate totals.
//!
//! All reviews go through [`ReviewHistory::record_review`], which runs the
//! SM-2 update and bumps the per-card and aggregate counters together. The
//! totals are always re-derivable from the cards, see [`ReviewHistory::resync`].

use super::{Quality, ReviewCard, sm2};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Aggregate review counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewTotals {
    #[serde(deserialize_with = "lenient_total")]
    pub total_questions_reviewed: u64,
    #[serde(deserialize_with = "lenient_total")]
    pub total_correct: u64,
    #[serde(deserialize_with = "lenient_total")]
    pub total_incorrect: u64,
}

// Totals are re-derived from the cards on load, so a garbage value only needs
// to parse, not to be right.
fn lenient_total<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() || raw <= 0.0 {
        return Ok(0);
    }
    Ok(raw.round().min(u64::MAX as f64) as u64)
}

impl ReviewTotals {
    /// Sums the counters of every card.
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a ReviewCard>) -> Self {
        cards.into_iter().fold(Self::default(), |mut totals, card| {
            totals.total_questions_reviewed += u64::from(card.total_reviews);
            totals.total_correct += u64::from(card.correct_count);
            totals.total_incorrect += u64::from(card.incorrect_count);
            totals
        })
    }

    /// Percentage of correct answers, rounded. 0 when nothing was reviewed.
    pub fn accuracy(&self) -> u32 {
        if self.total_questions_reviewed == 0 {
            return 0;
        }
        (self.total_correct as f64 / self.total_questions_reviewed as f64 * 100.0).round() as u32
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewHistory {
    #[serde(default)]
    cards: BTreeMap<String, ReviewCard>,
    #[serde(flatten)]
    totals: ReviewTotals,
}

impl ReviewHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from stored cards and stored totals, repairing any
    /// divergence between them.
    pub fn from_parts(
        cards: impl IntoIterator<Item = ReviewCard>,
        totals: ReviewTotals,
    ) -> Self {
        let mut history = Self {
            cards: cards
                .into_iter()
                .map(|card| (card.item_id.clone(), card))
                .collect(),
            totals,
        };
        history.resync();
        history
    }

    pub fn card(&self, item_id: &str) -> Option<&ReviewCard> {
        self.cards.get(item_id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &ReviewCard> {
        self.cards.values()
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn totals(&self) -> ReviewTotals {
        self.totals
    }

    pub fn total_questions_reviewed(&self) -> u64 {
        self.totals.total_questions_reviewed
    }

    pub fn total_correct(&self) -> u64 {
        self.totals.total_correct
    }

    pub fn total_incorrect(&self) -> u64 {
        self.totals.total_incorrect
    }

    pub fn accuracy(&self) -> u32 {
        self.totals.accuracy()
    }

    /// Grades one review of `item_id`, creating its card on first review.
    /// Card state and aggregate totals change together.
    pub fn record_review(
        &mut self,
        item_id: &str,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> &ReviewCard {
        let card = self
            .cards
            .entry(item_id.to_string())
            .or_insert_with(|| ReviewCard::new(item_id, now));
        *card = sm2::advance(card, quality, now);

        self.totals.total_questions_reviewed += 1;
        if quality.is_success() {
            self.totals.total_correct += 1;
        } else {
            self.totals.total_incorrect += 1;
        }
        card
    }

    /// True when every card is filed under its own id, its counters add up,
    /// and the totals match the cards.
    pub fn is_consistent(&self) -> bool {
        self.cards.iter().all(|(key, card)| {
            *key == card.item_id
                && card.correct_count.saturating_add(card.incorrect_count) == card.total_reviews
        }) && ReviewTotals::from_cards(self.cards.values()) == self.totals
    }

    /// Repairs a loaded history: a card's `item_id` is reset to the key it is
    /// filed under, per-card counters are made to add up, and totals are
    /// recomputed from the cards. Returns true if anything diverged.
    pub fn resync(&mut self) -> bool {
        let mut rekeyed_cards = 0;
        let mut repaired_cards = 0;
        for (key, card) in self.cards.iter_mut() {
            if card.item_id != *key {
                warn!(key = %key, item_id = %card.item_id, "card item id disagrees with its key");
                card.item_id = key.clone();
                rekeyed_cards += 1;
            }
            if card.repair_counters() {
                repaired_cards += 1;
            }
        }

        let derived = ReviewTotals::from_cards(self.cards.values());
        if rekeyed_cards == 0 && repaired_cards == 0 && derived == self.totals {
            return false;
        }

        warn!(
            rekeyed_cards,
            repaired_cards,
            stored = ?self.totals,
            derived = ?derived,
            "review counters diverged, recomputed from cards"
        );
        self.totals = derived;
        true
    }

    /// Forgets every card and zeroes the totals.
    pub fn reset(&mut self) {
        self.cards.clear();
        self.totals = ReviewTotals::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let history = ReviewHistory::new();
        assert_eq!(history.card_count(), 0);
        assert_eq!(history.total_questions_reviewed(), 0);
        assert_eq!(history.accuracy(), 0);
        assert!(history.is_consistent());
    }

    #[test]
    fn test_record_review_materializes_card() {
        let mut history = ReviewHistory::new();
        assert!(history.card("q-1").is_none());

        let card = history.record_review("q-1", Quality::Good, now());
        assert_eq!(card.interval, 1);
        assert_eq!(card.total_reviews, 1);

        assert_eq!(history.total_questions_reviewed(), 1);
        assert_eq!(history.total_correct(), 1);
        assert_eq!(history.total_incorrect(), 0);
    }

    #[test]
    fn test_counters_stay_consistent() {
        let mut history = ReviewHistory::new();
        let grades = [
            ("a", Quality::Good),
            ("b", Quality::Again),
            ("a", Quality::Easy),
            ("c", Quality::Hard),
            ("b", Quality::Good),
            ("a", Quality::Again),
        ];
        for (id, quality) in grades {
            history.record_review(id, quality, now());
            assert!(history.is_consistent());
        }

        let sum: u64 = history.cards().map(|c| u64::from(c.total_reviews)).sum();
        assert_eq!(sum, history.total_questions_reviewed());
        assert_eq!(history.total_correct(), 3);
        assert_eq!(history.total_incorrect(), 3);
        assert_eq!(history.accuracy(), 50);
    }

    #[test]
    fn test_accuracy_rounds() {
        let totals = ReviewTotals {
            total_questions_reviewed: 3,
            total_correct: 2,
            total_incorrect: 1,
        };
        // 66.67
        assert_eq!(totals.accuracy(), 67);
    }

    #[test]
    fn test_resync_repairs_divergence() {
        let mut card = ReviewCard::new("q-1", now());
        card.total_reviews = 4;
        card.correct_count = 3;
        card.incorrect_count = 1;

        let stale = ReviewTotals {
            total_questions_reviewed: 10,
            total_correct: 1,
            total_incorrect: 9,
        };
        let history = ReviewHistory::from_parts([card], stale);

        assert!(history.is_consistent());
        assert_eq!(history.total_questions_reviewed(), 4);
        assert_eq!(history.total_correct(), 3);
        assert_eq!(history.total_incorrect(), 1);
    }

    #[test]
    fn test_resync_restores_item_id_from_key() {
        let json = r#"{
            "cards": { "q-1": { "itemId": "other", "nextReviewAt": 0 } }
        }"#;
        let mut history: ReviewHistory = serde_json::from_str(json).unwrap();
        assert!(!history.is_consistent());

        assert!(history.resync());
        assert!(history.is_consistent());
        assert_eq!(history.card("q-1").unwrap().item_id, "q-1");
    }

    #[test]
    fn test_resync_noop_when_consistent() {
        let mut history = ReviewHistory::new();
        history.record_review("q-1", Quality::Good, now());
        assert!(!history.resync());
    }

    #[test]
    fn test_reset_wipes_everything() {
        let mut history = ReviewHistory::new();
        history.record_review("q-1", Quality::Good, now());
        history.record_review("q-2", Quality::Again, now());

        history.reset();
        assert_eq!(history, ReviewHistory::new());
    }

    #[test]
    fn test_json_shape() {
        let mut history = ReviewHistory::new();
        history.record_review("q-1", Quality::Good, now());

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["totalQuestionsReviewed"], 1);
        assert_eq!(json["totalCorrect"], 1);
        assert_eq!(json["totalIncorrect"], 0);
        assert_eq!(json["cards"]["q-1"]["repetitions"], 1);
    }
}
