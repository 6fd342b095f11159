//! Progress breakdown of a catalog: how many items are new, still being
//! learned, or mature.
use super::{ReviewCard, ReviewHistory, due_queue};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Cards at or above this interval count as mature
pub const MATURE_INTERVAL_DAYS: u32 = 21;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CardMaturity {
    New,
    Learning,
    Mature,
}

impl CardMaturity {
    pub fn of(card: Option<&ReviewCard>) -> Self {
        match card {
            None => CardMaturity::New,
            Some(card) if card.interval >= MATURE_INTERVAL_DAYS => CardMaturity::Mature,
            Some(_) => CardMaturity::Learning,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub mature: usize,
    pub due: usize,
    /// Lifetime accuracy in percent
    pub accuracy: u32,
}

/// Classifies every catalog item by its card. Cards for ids that are not in
/// the catalog are ignored.
pub fn review_stats<S: AsRef<str>>(
    catalog_ids: &[S],
    history: &ReviewHistory,
    now: DateTime<Utc>,
) -> ReviewStats {
    let mut stats = ReviewStats {
        total: catalog_ids.len(),
        due: due_queue(catalog_ids, history, now).len(),
        accuracy: history.accuracy(),
        ..Default::default()
    };

    for id in catalog_ids {
        match CardMaturity::of(history.card(id.as_ref())) {
            CardMaturity::New => stats.new += 1,
            CardMaturity::Learning => stats.learning += 1,
            CardMaturity::Mature => stats.mature += 1,
        }
    }

    stats
}
