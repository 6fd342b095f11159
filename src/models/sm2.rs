//! SM-2 (SuperMemo 2) spaced repetition algorithm on a 4-level quality scale.
//!
//! - Each card has an easiness factor (EF) that moves after every review
//! - `Again`/`Hard`: lapse, streak resets and the card comes back tomorrow
//! - `Good`/`Easy`: interval grows 1 day → 6 days → previous interval × EF
//! - `Easy` additionally multiplies the new interval by 1.3
//! - EF never falls below 1.3

use super::review_card::MIN_EASINESS_FACTOR;
use super::{Quality, ReviewCard};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Interval multiplier applied on top of a successful `Easy` review
pub const EASY_BONUS: f64 = 1.3;

/// EF change for a rating: `0.1 - (3 - q) * (0.08 + (3 - q) * 0.02)`.
pub fn easiness_delta(quality: Quality) -> f64 {
    let distance = f64::from(Quality::Easy.score() - quality.score());
    0.1 - distance * (0.08 + distance * 0.02)
}

/// Computes the state of `card` after one review graded `quality` at `now`.
pub fn advance(card: &ReviewCard, quality: Quality, now: DateTime<Utc>) -> ReviewCard {
    let new_ef = (card.easiness_factor + easiness_delta(quality)).max(MIN_EASINESS_FACTOR);

    let (new_interval, new_repetitions) = match quality {
        // Lapse: hard reset of the streak
        Quality::Again | Quality::Hard => (1, 0),
        Quality::Good | Quality::Easy => {
            let new_reps = card.repetitions.saturating_add(1);
            let base = match new_reps {
                1 => 1,
                2 => 6,
                // A well-formed card has interval >= 1 here; guard against stale zeros
                _ => scale_interval(card.interval, new_ef).max(1),
            };
            let interval = if quality == Quality::Easy {
                scale_interval(base, EASY_BONUS)
            } else {
                base
            };
            (interval, new_reps)
        }
    };

    let next_review_at = now
        .checked_add_signed(Duration::days(i64::from(new_interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let success = quality.is_success();
    debug!(
        item_id = %card.item_id,
        quality = quality.score(),
        easiness_factor = new_ef,
        interval = new_interval,
        repetitions = new_repetitions,
        "scheduled review"
    );

    ReviewCard {
        item_id: card.item_id.clone(),
        easiness_factor: new_ef,
        interval: new_interval,
        repetitions: new_repetitions,
        next_review_at,
        last_reviewed_at: Some(now),
        total_reviews: card.total_reviews.saturating_add(1),
        correct_count: card.correct_count.saturating_add(u32::from(success)),
        incorrect_count: card.incorrect_count.saturating_add(u32::from(!success)),
    }
}

/// `round(days * factor)`, half away from zero, saturating at `u32::MAX`.
fn scale_interval(days: u32, factor: f64) -> u32 {
    (f64::from(days) * factor).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn fresh() -> ReviewCard {
        ReviewCard::new("q-1", now())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_deltas_per_quality() {
        assert_close(easiness_delta(Quality::Again), -0.32);
        assert_close(easiness_delta(Quality::Hard), -0.14);
        assert_close(easiness_delta(Quality::Good), 0.0);
        assert_close(easiness_delta(Quality::Easy), 0.1);
    }

    #[test]
    fn test_two_good_reviews() {
        let first = advance(&fresh(), Quality::Good, now());
        assert_eq!(first.interval, 1);
        assert_eq!(first.repetitions, 1);
        assert_close(first.easiness_factor, 2.5);

        let second = advance(&first, Quality::Good, now());
        assert_eq!(second.interval, 6);
        assert_eq!(second.repetitions, 2);
        assert_close(second.easiness_factor, 2.5);
    }

    #[test]
    fn test_third_good_review_uses_ef() {
        let mut card = fresh();
        for _ in 0..3 {
            card = advance(&card, Quality::Good, now());
        }
        // round(6 * 2.5)
        assert_eq!(card.interval, 15);
        assert_eq!(card.repetitions, 3);
    }

    #[test]
    fn test_first_easy_review() {
        let next = advance(&fresh(), Quality::Easy, now());
        assert_close(next.easiness_factor, 2.6);
        // round(1 * 1.3)
        assert_eq!(next.interval, 1);
        assert_eq!(next.repetitions, 1);
    }

    #[test]
    fn test_second_easy_review_gets_bonus() {
        let first = advance(&fresh(), Quality::Easy, now());
        let second = advance(&first, Quality::Easy, now());
        // round(6 * 1.3)
        assert_eq!(second.interval, 8);
    }

    #[test]
    fn test_easy_after_streak_rounds_twice() {
        let mut card = fresh();
        card.repetitions = 2;
        card.interval = 6;
        card.easiness_factor = 2.5;

        let next = advance(&card, Quality::Easy, now());
        assert_close(next.easiness_factor, 2.6);
        // round(round(6 * 2.6) * 1.3) = round(16 * 1.3)
        assert_eq!(next.interval, 21);
        assert_eq!(next.repetitions, 3);
    }

    #[test]
    fn test_again_after_streak() {
        let mut card = fresh();
        card.repetitions = 3;
        card.interval = 15;
        card.easiness_factor = 2.5;

        let next = advance(&card, Quality::Again, now());
        assert_close(next.easiness_factor, 2.18);
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.interval, 1);
    }

    #[test]
    fn test_lapse_always_resets() {
        for quality in [Quality::Again, Quality::Hard] {
            for (reps, interval) in [(0, 0), (1, 1), (7, 120)] {
                let mut card = fresh();
                card.repetitions = reps;
                card.interval = interval;

                let next = advance(&card, quality, now());
                assert_eq!(next.repetitions, 0);
                assert_eq!(next.interval, 1);
            }
        }
    }

    #[test]
    fn test_ef_floor() {
        let mut card = fresh();
        for _ in 0..20 {
            card = advance(&card, Quality::Again, now());
            assert!(card.easiness_factor >= MIN_EASINESS_FACTOR);
        }
        assert_close(card.easiness_factor, MIN_EASINESS_FACTOR);
    }

    #[test]
    fn test_ef_floor_hard() {
        let mut card = fresh();
        card.easiness_factor = 1.35;

        // 1.35 - 0.14 would undershoot
        card = advance(&card, Quality::Hard, now());
        assert_eq!(card.easiness_factor, MIN_EASINESS_FACTOR);

        for _ in 0..5 {
            card = advance(&card, Quality::Hard, now());
            assert_eq!(card.easiness_factor, MIN_EASINESS_FACTOR);
        }
    }

    #[test]
    fn test_timestamps_and_counters() {
        let card = advance(&fresh(), Quality::Good, now());
        assert_eq!(card.last_reviewed_at, Some(now()));
        assert_eq!(
            card.next_review_at.timestamp_millis(),
            now().timestamp_millis() + DAY_MS
        );
        assert_eq!(card.total_reviews, 1);
        assert_eq!(card.correct_count, 1);
        assert_eq!(card.incorrect_count, 0);

        let card = advance(&card, Quality::Hard, now());
        assert_eq!(card.total_reviews, 2);
        assert_eq!(card.correct_count, 1);
        assert_eq!(card.incorrect_count, 1);
        assert_eq!(
            card.correct_count + card.incorrect_count,
            card.total_reviews
        );
    }

    #[test]
    fn test_stale_zero_interval_never_schedules_now() {
        // Malformed: streak without an interval
        let mut card = fresh();
        card.repetitions = 4;
        card.interval = 0;

        let next = advance(&card, Quality::Good, now());
        assert!(next.interval >= 1);
        assert!(next.next_review_at > now());
    }

    #[test]
    fn test_huge_interval_saturates() {
        let mut card = fresh();
        card.repetitions = 10;
        card.interval = u32::MAX;

        let next = advance(&card, Quality::Easy, now());
        assert_eq!(next.interval, u32::MAX);
        assert_eq!(next.next_review_at, DateTime::<Utc>::MAX_UTC);
    }
}
