use std::mem::size_of;

use static_assertions::const_assert_eq;

use crate::cache::{Cache, NodeFlag};
use crate::game::Game;
use crate::score::Score;

const_assert_eq!(size_of::<NodeFlag>(), 1);
const_assert_eq!(size_of::<Score>(), 4);

#[derive(Debug, Copy, Clone)]
#[repr(C)]
struct Entry<G: Game> {
    hash: u64,
    score: Score,
    mov: G::Move,
    depth: u8,
    flag: NodeFlag,
}

impl<G: Game> Default for Entry<G> {
    fn default() -> Self {
        Self {
            hash: 0,
            score: Score(0),
            mov: G::Move::default(),
            depth: 0,
            flag: NodeFlag::Empty,
        }
    }
}

pub const DEFAULT_HASH_SIZE_MB: usize = 4;

/// Fixed-capacity, open-addressed transposition table, replacement-on-collision,
/// power-of-two sized and keyed by `Game::hash`. Not the only possible physical
/// layout for a cache, but a complete, usable one so the engine works without a
/// caller having to supply its own.
#[derive(Debug)]
pub struct TranspositionTable<G: Game> {
    entries: Vec<Entry<G>>,
    mask: u64,
    found: Entry<G>,
}

impl<G: Game> Default for TranspositionTable<G> {
    fn default() -> Self {
        Self::with_bytes(DEFAULT_HASH_SIZE_MB * 1_000_000)
    }
}

impl<G: Game> TranspositionTable<G> {
    pub fn with_bytes(size_in_bytes: usize) -> Self {
        let mut res = Self {
            entries: vec![],
            mask: 0,
            found: Entry::default(),
        };
        res.resize(size_in_bytes);
        res
    }

    fn index_of(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }
}

impl<G: Game> Cache<G> for TranspositionTable<G> {
    fn size(&self) -> usize {
        self.entries.len()
    }

    fn find(&mut self, game: &G) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let entry = self.entries[self.index_of(game.hash())];
        let hit = entry.hash == game.hash() && entry.flag != NodeFlag::Empty;
        if hit {
            self.found = entry;
        }
        hit
    }

    fn get_score(&self) -> Score {
        self.found.score
    }

    fn get_move(&self) -> G::Move {
        self.found.mov
    }

    fn get_depth(&self) -> u32 {
        self.found.depth as u32
    }

    fn get_flag(&self) -> NodeFlag {
        self.found.flag
    }

    fn store(&mut self, game: &G, score: Score, mov: G::Move, depth: u32, flag: NodeFlag) {
        if self.entries.is_empty() {
            return;
        }
        let idx = self.index_of(game.hash());
        self.entries[idx] = Entry {
            hash: game.hash(),
            score,
            mov,
            depth: depth.min(u8::MAX as u32) as u8,
            flag,
        };
    }

    fn discharge(&mut self) {}

    fn resize(&mut self, new_size_in_bytes: usize) {
        let entry_size = size_of::<Entry<G>>().max(1);
        let requested = (new_size_in_bytes / entry_size).max(1);
        let num_bits = requested.ilog2();
        let new_size = 1usize << num_bits;
        self.entries.resize_with(new_size, Default::default);
        self.mask = new_size as u64 - 1;
    }

    fn clear(&mut self) {
        self.entries.fill_with(Default::default);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct StubGame {
        h: u64,
    }

    impl Game for StubGame {
        type Move = u8;
        type Cursor = usize;

        fn has_ended(&self) -> bool {
            false
        }
        fn outcome(&self) -> Score {
            Score(0)
        }
        fn score(&self) -> Score {
            Score(0)
        }
        fn turn(&self) -> crate::game::Side {
            crate::game::Side::South
        }
        fn length(&self) -> usize {
            0
        }
        fn hash(&self) -> u64 {
            self.h
        }
        fn make(&mut self, _mov: Self::Move) {}
        fn unmake(&mut self) {}
        fn next_move(&mut self) -> Self::Move {
            0
        }
        fn get_cursor(&self) -> Self::Cursor {
            0
        }
        fn set_cursor(&mut self, _cursor: Self::Cursor) {}
        fn reset_cursor(&mut self) {}
        fn legal_moves(&self) -> Vec<Self::Move> {
            vec![]
        }
        fn ensure_capacity(&mut self, _n: usize) {}
    }

    #[test]
    fn miss_before_any_store() {
        let mut tt: TranspositionTable<StubGame> = TranspositionTable::with_bytes(1 << 16);
        let g = StubGame { h: 42 };
        assert!(!tt.find(&g));
    }

    #[test]
    fn store_then_find_round_trips() {
        let mut tt: TranspositionTable<StubGame> = TranspositionTable::with_bytes(1 << 16);
        let g = StubGame { h: 7 };
        tt.store(&g, Score(123), 9, 4, NodeFlag::Exact);
        assert!(tt.find(&g));
        assert_eq!(tt.get_score(), Score(123));
        assert_eq!(tt.get_move(), 9);
        assert_eq!(tt.get_depth(), 4);
        assert_eq!(tt.get_flag(), NodeFlag::Exact);
    }

    #[test]
    fn clear_resets_all_entries() {
        let mut tt: TranspositionTable<StubGame> = TranspositionTable::with_bytes(1 << 16);
        let g = StubGame { h: 7 };
        tt.store(&g, Score(123), 9, 4, NodeFlag::Exact);
        tt.clear();
        assert!(!tt.find(&g));
    }
}
