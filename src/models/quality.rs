//! Quality rating a learner gives a single review.
use serde::{Deserialize, Serialize};

/// 4-level recall rating. `Again` and `Hard` are lapses, `Good` and `Easy`
/// are successes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// No recall at all
    Again = 0,
    /// Incorrect, but recognized once revealed
    Hard = 1,
    /// Correct with some effort
    Good = 2,
    /// Correct and trivial
    Easy = 3,
}

impl Quality {
    /// Maps a raw numeric rating onto the scale, clamping anything outside 0-3.
    pub fn from_score(score: i64) -> Self {
        match score.clamp(0, 3) {
            0 => Quality::Again,
            1 => Quality::Hard,
            2 => Quality::Good,
            _ => Quality::Easy,
        }
    }

    /// Minimal mapping for answer checkers that only know right or wrong.
    pub fn from_correct(correct: bool) -> Self {
        if correct { Quality::Good } else { Quality::Again }
    }

    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        match self {
            Quality::Again | Quality::Hard => false,
            Quality::Good | Quality::Easy => true,
        }
    }
}

impl From<bool> for Quality {
    fn from(correct: bool) -> Self {
        Quality::from_correct(correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_score_clamps() {
        assert_eq!(Quality::from_score(-7), Quality::Again);
        assert_eq!(Quality::from_score(1), Quality::Hard);
        assert_eq!(Quality::from_score(2), Quality::Good);
        assert_eq!(Quality::from_score(42), Quality::Easy);
    }

    #[test]
    fn test_boolean_mapping() {
        assert_eq!(Quality::from(true), Quality::Good);
        assert_eq!(Quality::from(false), Quality::Again);
    }

    #[test]
    fn test_success_split() {
        assert!(!Quality::Again.is_success());
        assert!(!Quality::Hard.is_success());
        assert!(Quality::Good.is_success());
        assert!(Quality::Easy.is_success());
        assert_eq!(Quality::Easy.score(), 3);
    }
}
