//! Per-item spaced repetition state.
//!
//! Cards are serialized in the review history document with camelCase keys
//! and millisecond timestamps. Numeric fields are clamped on load instead of
//! rejected, so a hand-edited or partially corrupt document still schedules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Starting easiness factor for a card that has never been reviewed
pub const DEFAULT_EASINESS_FACTOR: f64 = 2.5;
/// Easiness factor never drops below this
pub const MIN_EASINESS_FACTOR: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub item_id: String,
    #[serde(
        default = "default_easiness_factor",
        deserialize_with = "floored_easiness_factor"
    )]
    pub easiness_factor: f64,
    /// Days until the card is due again, 0 for a card never reviewed
    #[serde(default, deserialize_with = "non_negative")]
    pub interval: u32,
    /// Consecutive successful reviews since the last lapse
    #[serde(default, deserialize_with = "non_negative")]
    pub repetitions: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review_at: DateTime<Utc>,
    #[serde(default, with = "zero_sentinel_millis")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_negative")]
    pub total_reviews: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub correct_count: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub incorrect_count: u32,
}

impl ReviewCard {
    /// A fresh card, due immediately.
    pub fn new(item_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            easiness_factor: DEFAULT_EASINESS_FACTOR,
            interval: 0,
            repetitions: 0,
            next_review_at: now,
            last_reviewed_at: None,
            total_reviews: 0,
            correct_count: 0,
            incorrect_count: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }

    /// Makes `total_reviews` agree with the correct/incorrect split.
    /// Returns true if anything had to change.
    pub fn repair_counters(&mut self) -> bool {
        let expected = self.correct_count.saturating_add(self.incorrect_count);
        if self.total_reviews == expected {
            return false;
        }
        self.total_reviews = expected;
        true
    }
}

fn default_easiness_factor() -> f64 {
    DEFAULT_EASINESS_FACTOR
}

fn floored_easiness_factor<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Ok(DEFAULT_EASINESS_FACTOR);
    }
    Ok(raw.max(MIN_EASINESS_FACTOR))
}

fn non_negative<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    // Accept floats too; anything negative or NaN becomes 0
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() || raw <= 0.0 {
        return Ok(0);
    }
    Ok(raw.round().min(u32::MAX as f64) as u32)
}

/// Millisecond timestamps where `0` means "never".
mod zero_sentinel_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.map_or(0, |dt| dt.timestamp_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
        if millis <= 0 {
            return Ok(None);
        }
        Ok(DateTime::from_timestamp_millis(millis))
    }
}
