use std::fmt::Debug;

use crate::score::Score;

/// A single legal move. `Default` stands in for the distinguished "no move"
/// sentinel (`NULL_MOVE`): a searcher never generates it, but reports it when
/// no move is applicable (a terminal root, an exhausted move cursor).
pub trait Move: Copy + Clone + Eq + PartialEq + Default + Debug + 'static {}

impl<T> Move for T where T: Copy + Clone + Eq + PartialEq + Default + Debug + 'static {}

/// Which side is to move. Doubles as the sign multiplier that converts an
/// absolute outcome/evaluation into a side-to-move score (§4.4).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Side {
    South,
    North,
}

impl Side {
    pub const fn sign(self) -> i32 {
        match self {
            Side::South => 1,
            Side::North => -1,
        }
    }

    pub const fn flip(self) -> Side {
        match self {
            Side::South => Side::North,
            Side::North => Side::South,
        }
    }
}

/// Opaque save point for a board's stateful move enumerator, returned by
/// `get_cursor` and restored by `set_cursor` so that `legal_moves()` can be
/// called without disturbing `next_move()`'s progress.
pub trait Cursor: Copy + Clone + Debug {}

impl<T> Cursor for T where T: Copy + Clone + Debug {}

/// The rules of a particular two-player, zero-sum, perfect-information game.
///
/// Everything about move legality, terminal detection, and static evaluation
/// lives behind this trait; the search core never inspects a concrete board
/// representation.
pub trait Game: Sized + Debug {
    type Move: Move;
    type Cursor: Cursor;

    /// True once the game has reached a terminal state (won, lost, or drawn).
    fn has_ended(&self) -> bool;

    /// Absolute result of a terminal position. `DRAW_SCORE` iff drawn.
    fn outcome(&self) -> Score;

    /// Absolute static evaluation, bounded by the engine's configured infinity.
    fn score(&self) -> Score;

    /// The side to move at the current position.
    fn turn(&self) -> Side;

    /// Number of plies played since the game began.
    fn length(&self) -> usize;

    /// A fingerprint of the current state, stable across equal states.
    /// Collisions are permitted but should be rare.
    fn hash(&self) -> u64;

    /// Play `mov`, pushing one frame onto the implicit state stack.
    fn make(&mut self, mov: Self::Move);

    /// Undo the most recent `make`. Must be paired 1:1 with `make`.
    fn unmake(&mut self);

    /// Advance the board's internal move enumerator and return the next
    /// pseudo-legal move, or the default ("no move left") once exhausted.
    /// Stateful: repeated calls at the same node progress the same cursor.
    fn next_move(&mut self) -> Self::Move;

    /// Snapshot the enumerator's position so it can be restored later.
    fn get_cursor(&self) -> Self::Cursor;

    /// Restore a previously saved enumerator position.
    fn set_cursor(&mut self, cursor: Self::Cursor);

    /// Reset the enumerator to the start of the move list.
    fn reset_cursor(&mut self);

    /// All legal moves at the current position, materialized. Used only at
    /// the root; does not disturb `next_move`'s cursor.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Ensure the implicit state stack can hold at least `n` additional plies.
    fn ensure_capacity(&mut self, n: usize);
}
