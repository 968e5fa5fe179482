//! Iterative-deepening negamax search: alpha-beta pruning, a transposition
//! table, and an endgame-tablebase hook, driven by time/depth bounds.
//!
//! Game rules, the transposition table's physical layout, and an endgame
//! database's physical layout are treated as external capabilities supplied
//! by a caller ([`Game`], [`Cache`], [`Leaves`]); this crate owns only the
//! search core that drives them.

pub mod cache;
pub mod error;
pub mod game;
pub mod leaves;
pub mod negamax;
pub mod report;
pub mod score;
pub mod timer;
pub mod tt;

pub use cache::{Cache, NodeFlag, NullCache};
pub use error::{EngineError, Res};
pub use game::{Cursor, Game, Move, Side};
pub use leaves::{ExactLookupLeaves, LeafFlag, Leaves, NullLeaves};
pub use negamax::Engine;
pub use report::{ConsumerSet, Report, ReportConsumer};
pub use score::{Score, DEFAULT_MOVE_TIME_MS, DRAW_SCORE, MAX_DEPTH, MIN_DEPTH};
pub use tt::TranspositionTable;
