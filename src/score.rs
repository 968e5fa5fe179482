use derive_more::{Add, Display, Neg, Sub};

/// A negamax score, always from the perspective of the side to move at the
/// node it was computed for.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Display, Add, Sub, Neg,
)]
pub struct Score(pub i32);

impl Score {
    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// Score assigned to a drawn position before the current side's contempt is applied.
pub const DRAW_SCORE: Score = Score(0);

/// Smallest legal `max_depth`; iterative deepening starts here.
pub const MIN_DEPTH: u32 = 2;

/// Largest legal `max_depth`.
pub const MAX_DEPTH: u32 = 254;

/// Default per-move search budget used when the caller never calls `set_move_time`.
pub const DEFAULT_MOVE_TIME_MS: u64 = 3_600;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_round_trips() {
        let s = Score(17);
        assert_eq!(-(-s), s);
        assert_eq!(-s, Score(-17));
    }

    #[test]
    fn ordering_matches_inner_value() {
        assert!(Score(-5) < Score(5));
        assert!(Score(100) > DRAW_SCORE);
    }
}
