//! Builds the ordered list of catalog items due for review.

use super::ReviewHistory;
use chrono::{DateTime, Utc};

/// How urgently an item needs review. Variant order matters: every `New`
/// item outranks every `Overdue` one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Milliseconds past the due time
    Overdue(i64),
    /// Never reviewed
    New,
}

/// Priority of a single catalog item, or `None` if it is not due yet.
pub fn priority(item_id: &str, history: &ReviewHistory, now: DateTime<Utc>) -> Option<Priority> {
    match history.card(item_id) {
        None => Some(Priority::New),
        Some(card) if card.is_due(now) => Some(Priority::Overdue(
            (now - card.next_review_at).num_milliseconds(),
        )),
        Some(_) => None,
    }
}

/// Returns the due catalog items, most urgent first.
///
/// New items come first in catalog order, then due cards from most to least
/// overdue. Equal priorities keep catalog order. Reads only: cards for new
/// items are created when they are first graded, not here.
pub fn due_queue<S: AsRef<str>>(
    catalog_ids: &[S],
    history: &ReviewHistory,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut due: Vec<(Priority, &str)> = catalog_ids
        .iter()
        .map(|id| id.as_ref())
        .filter_map(|id| priority(id, history, now).map(|p| (p, id)))
        .collect();

    // sort_by is stable, so ties keep catalog order
    due.sort_by(|a, b| b.0.cmp(&a.0));
    due.into_iter().map(|(_, id)| id.to_string()).collect()
}
