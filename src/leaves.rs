use std::collections::HashMap;

use crate::game::Game;
use crate::score::Score;

/// How precisely a tablebase hit is known. `Fuzzy` is part of the external
/// contract but unused by this crate's own search logic; it is reserved for
/// callers that supply a `Leaves` capable of returning it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LeafFlag {
    Exact,
    Fuzzy,
}

/// An endgame tablebase: precomputed results for a subset of positions,
/// consulted before falling back to static evaluation.
pub trait Leaves<G: Game> {
    fn find(&mut self, game: &G) -> bool;
    fn get_score(&self) -> Score;
    fn get_flag(&self) -> LeafFlag;
}

/// Null-object `Leaves`: always misses. The engine's default.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullLeaves;

impl<G: Game> Leaves<G> for NullLeaves {
    fn find(&mut self, _game: &G) -> bool {
        false
    }

    fn get_score(&self) -> Score {
        Score(0)
    }

    fn get_flag(&self) -> LeafFlag {
        LeafFlag::Exact
    }
}

/// A trivial in-memory tablebase keyed by state hash, exact-only. Useful for
/// tests that want a deterministic `Leaves` hit without building a real one.
#[derive(Debug, Default)]
pub struct ExactLookupLeaves {
    table: HashMap<u64, Score>,
    found: Score,
}

impl ExactLookupLeaves {
    pub fn insert(&mut self, hash: u64, score: Score) {
        self.table.insert(hash, score);
    }
}

impl<G: Game> Leaves<G> for ExactLookupLeaves {
    fn find(&mut self, game: &G) -> bool {
        match self.table.get(&game.hash()) {
            Some(&score) => {
                self.found = score;
                true
            }
            None => false,
        }
    }

    fn get_score(&self) -> Score {
        self.found
    }

    fn get_flag(&self) -> LeafFlag {
        LeafFlag::Exact
    }
}
