use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use std::time::Duration;

use crate::cache::{Cache, NodeFlag, NullCache};
use crate::error::{EngineError, Res};
use crate::game::Game;
use crate::leaves::{Leaves, NullLeaves};
use crate::report::{ConsumerSet, Report, ReportConsumer};
use crate::score::{Score, DEFAULT_MOVE_TIME_MS, DRAW_SCORE, MAX_DEPTH, MIN_DEPTH};
use crate::timer::AbortTimer;

/// How many of the root's move list are scanned for a cached hash move before
/// giving up on reordering it to the front (§4.2 step 5).
const ROOT_HASH_MOVE_SCAN_CAP: usize = 6;

fn clamp_even_depth(depth: u32) -> u32 {
    let d = depth.clamp(MIN_DEPTH, MAX_DEPTH);
    d + d % 2
}

/// Defensive check for the game-stack-balance invariant (§8 invariant 1): a
/// `make` not matched 1:1 by an `unmake` would otherwise silently leave the
/// caller's game in a corrupted state. Fatal, since there is no sound way to
/// keep searching once `make`/`unmake` have drifted out of lockstep.
fn assert_stack_balance<G: Game>(game: &G, expected_length: usize) {
    if game.length() != expected_length {
        let err = EngineError::InvariantViolation(
            "game move stack unbalanced: make/unmake calls did not pair up",
        );
        eprintln!("fatal: {err}");
        panic!("{err}");
    }
}

struct Inner<G: Game, C: Cache<G>, L: Leaves<G>> {
    max_depth: u32,
    move_time_ms: u64,
    contempt: Score,
    max_score: Score,
    best_score: Score,
    score_depth: u32,
    cache: C,
    leaves: L,
    consumers: ConsumerSet<G>,
}

/// Iterative-deepening negamax search with alpha-beta pruning, a
/// transposition table, and an endgame-tablebase hook.
///
/// Configuration mutators and `compute_best_move` all take the same coarse
/// lock, so a configuration change can never observe or corrupt a
/// half-finished search iteration. `aborted` is kept outside that lock,
/// atomic, so an external abort request is never blocked behind a running
/// search.
pub struct Engine<G: Game, C: Cache<G> = NullCache, L: Leaves<G> = NullLeaves> {
    inner: Mutex<Inner<G, C, L>>,
    aborted: Arc<AtomicBool>,
}

impl<G: Game> Default for Engine<G, NullCache, NullLeaves> {
    fn default() -> Self {
        Engine::with_cache_and_leaves(NullCache, NullLeaves)
    }
}

impl<G: Game, C: Cache<G>> Engine<G, C, NullLeaves> {
    pub fn with_cache(cache: C) -> Self {
        Engine::with_cache_and_leaves(cache, NullLeaves)
    }
}

impl<G: Game, C: Cache<G>, L: Leaves<G>> Engine<G, C, L> {
    pub fn with_cache_and_leaves(cache: C, leaves: L) -> Self {
        Engine {
            inner: Mutex::new(Inner {
                max_depth: MAX_DEPTH,
                move_time_ms: DEFAULT_MOVE_TIME_MS,
                contempt: DRAW_SCORE,
                max_score: Score(i32::MAX / 2),
                best_score: DRAW_SCORE,
                score_depth: 0,
                cache,
                leaves,
                consumers: ConsumerSet::default(),
            }),
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    // --- configuration surface (§4.1) ---

    pub fn set_depth(&self, depth: u32) {
        self.inner.lock().unwrap().max_depth = clamp_even_depth(depth);
    }

    pub fn depth(&self) -> u32 {
        self.inner.lock().unwrap().max_depth
    }

    pub fn set_move_time(&self, ms: i64) -> Res<()> {
        if ms <= 0 {
            return Err(EngineError::InvalidMoveTime(ms));
        }
        self.inner.lock().unwrap().move_time_ms = ms as u64;
        Ok(())
    }

    pub fn move_time(&self) -> u64 {
        self.inner.lock().unwrap().move_time_ms
    }

    pub fn set_contempt(&self, contempt: Score) {
        self.inner.lock().unwrap().contempt = contempt;
    }

    pub fn contempt(&self) -> Score {
        self.inner.lock().unwrap().contempt
    }

    pub fn set_infinity(&self, max_score: i32) -> Res<()> {
        if max_score <= 0 {
            return Err(EngineError::InvalidInfinity(max_score));
        }
        self.inner.lock().unwrap().max_score = Score(max_score);
        Ok(())
    }

    pub fn infinity(&self) -> Score {
        self.inner.lock().unwrap().max_score
    }

    pub fn score_depth(&self) -> u32 {
        self.inner.lock().unwrap().score_depth
    }

    pub fn attach_consumer(&self, consumer: Arc<dyn ReportConsumer<G>>) {
        self.inner.lock().unwrap().consumers.attach(consumer);
    }

    pub fn detach_consumer(&self, consumer: &Arc<dyn ReportConsumer<G>>) {
        self.inner.lock().unwrap().consumers.detach(consumer);
    }

    pub fn new_match(&self) {
        self.inner.lock().unwrap().cache.clear();
    }

    /// Swap in a different cache instance of the same concrete type, e.g. one
    /// resized or rebuilt outside the engine's own `resize`/`clear`.
    pub fn set_cache(&self, cache: C) {
        self.inner.lock().unwrap().cache = cache;
    }

    /// Swap in a different leaves (tablebase) instance of the same concrete type.
    pub fn set_leaves(&self, leaves: L) {
        self.inner.lock().unwrap().leaves = leaves;
    }

    /// Request that the in-flight search stop. Safe to call from any thread;
    /// never blocks on the search's lock.
    pub fn abort_computation(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    // --- root driver (§4.2) ---

    pub fn compute_best_move(&self, game: &mut G) -> G::Move {
        let mut inner = self.inner.lock().unwrap();
        let turn_sign = game.turn().sign();
        let start_length = game.length();

        if game.has_ended() {
            inner.best_score = Score(-(game.outcome().raw() * turn_sign));
            inner.score_depth = 0;
            self.aborted.store(false, Ordering::Relaxed);
            assert_stack_balance(game, start_length);
            return G::Move::default();
        }

        let max_depth = inner.max_depth;
        let max_score = inner.max_score;
        let min_score = -max_score;
        let contempt = inner.contempt;

        let timer = AbortTimer::arm(
            Duration::from_millis(inner.move_time_ms),
            self.aborted.clone(),
        );
        game.ensure_capacity(max_depth as usize + game.length());
        inner.cache.discharge();

        let mut root_moves = game.legal_moves();
        reorder_root_by_hash_move(&mut root_moves, game, &mut inner.cache);

        let mut depth = MIN_DEPTH;
        let mut beta = max_score;
        let mut last_score = max_score;
        let mut last_move = G::Move::default();
        let mut best_move = root_moves.first().copied().unwrap_or_default();
        let mut best_score = DRAW_SCORE;
        inner.score_depth = 0;

        loop {
            let mut iteration_best_move = best_move;
            let mut iteration_best_score = best_score;
            let mut iteration_beta = beta;

            for &mov in &root_moves {
                game.make(mov);
                let score = search(
                    game,
                    &mut inner.cache,
                    &mut inner.leaves,
                    &self.aborted,
                    contempt,
                    min_score,
                    min_score,
                    iteration_beta,
                    depth,
                );
                game.unmake();

                if self.aborted.load(Ordering::Relaxed) && depth > MIN_DEPTH {
                    iteration_best_move = last_move;
                    iteration_best_score = last_score;
                    break;
                }

                if score < iteration_beta {
                    iteration_best_move = mov;
                    iteration_best_score = score;
                    iteration_beta = score;
                } else if score == iteration_beta {
                    iteration_best_score = score;
                }
            }

            best_move = iteration_best_move;
            best_score = iteration_best_score;

            let aborted_mid_iteration = self.aborted.load(Ordering::Relaxed) && depth > MIN_DEPTH;
            if !aborted_mid_iteration {
                inner.score_depth = depth;
            }

            if best_score.raw().abs() == max_score.raw() {
                break;
            }
            if self.aborted.load(Ordering::Relaxed) || depth >= max_depth {
                break;
            }

            if depth > MIN_DEPTH && (best_move != last_move || best_score != last_score) {
                let report = Report {
                    game,
                    cache: &inner.cache,
                    best_move,
                };
                inner.consumers.notify(&report);
            }

            beta = max_score;
            last_move = best_move;
            last_score = best_score;
            depth += 2;
        }

        {
            let report = Report {
                game,
                cache: &inner.cache,
                best_move,
            };
            inner.consumers.notify(&report);
        }

        timer.cancel();
        self.aborted.store(false, Ordering::Relaxed);
        inner.best_score = best_score;
        assert_stack_balance(game, start_length);
        best_move
    }

    pub fn compute_best_score(&self, game: &mut G) -> Score {
        self.compute_best_move(game);
        -self.inner.lock().unwrap().best_score
    }

    pub fn get_ponder_move(&self, game: &G) -> G::Move {
        let mut inner = self.inner.lock().unwrap();
        if inner.cache.find(game) && inner.cache.get_flag() == NodeFlag::Exact {
            inner.cache.get_move()
        } else {
            G::Move::default()
        }
    }
}

fn reorder_root_by_hash_move<G: Game, C: Cache<G>>(
    moves: &mut [G::Move],
    game: &G,
    cache: &mut C,
) {
    if !cache.find(game) {
        return;
    }
    let hash_move = cache.get_move();
    if hash_move == G::Move::default() {
        return;
    }
    let scan_len = moves.len().min(ROOT_HASH_MOVE_SCAN_CAP);
    if let Some(pos) = moves[..scan_len].iter().position(|&m| m == hash_move) {
        if pos > 0 {
            moves[..=pos].rotate_right(1);
        }
    }
}

/// Fail-soft negamax, returning a score from the perspective of the side to
/// move at this node, bounded within `[alpha, beta]` except at forced
/// abort/terminal/leaf returns (§4.3).
#[allow(clippy::too_many_arguments)]
fn search<G: Game, C: Cache<G>, L: Leaves<G>>(
    game: &mut G,
    cache: &mut C,
    leaves: &mut L,
    aborted: &AtomicBool,
    contempt: Score,
    min_score: Score,
    mut alpha: Score,
    beta: Score,
    depth: u32,
) -> Score {
    if aborted.load(Ordering::Relaxed) && depth > MIN_DEPTH {
        return min_score;
    }

    let turn_sign = game.turn().sign();

    if game.has_ended() {
        let outcome = game.outcome();
        return if outcome == DRAW_SCORE {
            Score(contempt.raw() * turn_sign)
        } else {
            Score(outcome.raw() * turn_sign)
        };
    }

    if leaves.find(game) {
        return if leaves.get_score() == DRAW_SCORE {
            Score(contempt.raw() * turn_sign)
        } else {
            Score(leaves.get_score().raw() * turn_sign)
        };
    }

    if depth == 0 {
        return Score(game.score().raw() * turn_sign);
    }

    let probe_cache = depth > 2;
    let mut hash_move = G::Move::default();
    if probe_cache && cache.find(game) {
        let entry_depth = cache.get_depth();
        if entry_depth >= depth {
            let entry_score = cache.get_score();
            match cache.get_flag() {
                NodeFlag::Upper if entry_score >= beta => return beta,
                NodeFlag::Lower if entry_score <= alpha => return alpha,
                NodeFlag::Exact => return entry_score,
                _ => {}
            }
        }
        hash_move = cache.get_move();
    }

    let mut flag = NodeFlag::Lower;
    let mut best_move = hash_move;

    if hash_move != G::Move::default() {
        game.make(hash_move);
        let score = -search(
            game, cache, leaves, aborted, contempt, min_score, -beta, -alpha, depth - 1,
        );
        game.unmake();

        if score >= beta {
            if depth > 2 && !aborted.load(Ordering::Relaxed) {
                cache.store(game, score, hash_move, depth, NodeFlag::Upper);
            }
            return beta;
        }
        if score > alpha {
            alpha = score;
            flag = NodeFlag::Exact;
        }
    }

    loop {
        let mov = game.next_move();
        if mov == G::Move::default() {
            break;
        }
        if mov == hash_move {
            continue;
        }

        game.make(mov);
        let score = -search(
            game, cache, leaves, aborted, contempt, min_score, -beta, -alpha, depth - 1,
        );
        game.unmake();

        if score >= beta {
            alpha = beta;
            best_move = mov;
            flag = NodeFlag::Upper;
            break;
        }
        if score > alpha {
            alpha = score;
            best_move = mov;
            flag = NodeFlag::Exact;
        }
    }

    if depth > 2 && !aborted.load(Ordering::Relaxed) {
        cache.store(game, alpha, best_move, depth, flag);
    }
    alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_clamps_and_rounds_up_to_even() {
        assert_eq!(clamp_even_depth(1), 2);
        assert_eq!(clamp_even_depth(3), 4);
        assert_eq!(clamp_even_depth(255), MAX_DEPTH);
        assert_eq!(clamp_even_depth(0), MIN_DEPTH);
    }

    #[derive(Debug, Default)]
    struct StubGame;

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
            0
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
    fn root_hash_move_is_rotated_to_front_within_scan_cap() {
        let game = StubGame;
        let mut moves = vec![10u8, 11, 12, 13, 9, 14];
        let mut tt = crate::tt::TranspositionTable::<StubGame>::with_bytes(1 << 16);
        tt.store(&game, Score(0), 9, 4, NodeFlag::Exact);
        reorder_root_by_hash_move(&mut moves, &game, &mut tt);
        assert_eq!(moves, vec![9u8, 10, 11, 12, 13, 14]);
    }

    #[test]
    fn hash_move_past_scan_cap_is_left_in_place() {
        let game = StubGame;
        let mut tt = crate::tt::TranspositionTable::<StubGame>::with_bytes(1 << 16);
        let mut moves = vec![10u8, 11, 12, 13, 14, 15, 9];
        tt.store(&game, Score(0), 9, 4, NodeFlag::Exact);
        reorder_root_by_hash_move(&mut moves, &game, &mut tt);
        assert_eq!(moves, vec![10u8, 11, 12, 13, 14, 15, 9]);
    }

    #[test]
    fn balanced_stack_does_not_panic() {
        assert_stack_balance(&StubGame, 0);
    }

    #[test]
    #[should_panic(expected = "game move stack unbalanced")]
    fn unbalanced_stack_panics() {
        assert_stack_balance(&StubGame, 1);
    }
}
