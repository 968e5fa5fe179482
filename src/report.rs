use std::fmt::Debug;
use std::sync::Arc;

use crate::cache::Cache;
use crate::game::Game;

/// Immutable snapshot handed to every attached consumer at the end of each
/// completed iteration. Borrowed, not owned: delivery is synchronous and the
/// consumer must not hold onto it past the call.
pub struct Report<'a, G: Game> {
    pub game: &'a G,
    pub cache: &'a dyn Cache<G>,
    pub best_move: G::Move,
}

/// Sink for search progress reports, such as a UI panel or a log line.
///
/// `Send + Sync` so a consumer can be attached once and still let
/// `abort_computation` reach the engine from another thread while a search
/// that would notify this consumer is in flight.
pub trait ReportConsumer<G: Game>: Debug + Send + Sync {
    fn on_report(&self, report: &Report<G>);
}

/// Fan-out set of report consumers, unique by pointer identity so the same
/// consumer can be attached only once regardless of how many times a caller
/// asks for it.
#[derive(Debug, Default)]
pub struct ConsumerSet<G: Game> {
    consumers: Vec<Arc<dyn ReportConsumer<G>>>,
}

impl<G: Game> ConsumerSet<G> {
    pub fn attach(&mut self, consumer: Arc<dyn ReportConsumer<G>>) {
        if !self.consumers.iter().any(|c| Arc::ptr_eq(c, &consumer)) {
            self.consumers.push(consumer);
        }
    }

    pub fn detach(&mut self, consumer: &Arc<dyn ReportConsumer<G>>) {
        self.consumers.retain(|c| !Arc::ptr_eq(c, consumer));
    }

    pub fn notify(&self, report: &Report<G>) {
        for consumer in &self.consumers {
            let consumer = consumer.clone();
            let report_game = report.game;
            let report_cache = report.cache;
            let best_move = report.best_move;
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                consumer.on_report(&Report {
                    game: report_game,
                    cache: report_cache,
                    best_move,
                });
            }));
            if outcome.is_err() {
                eprintln!("warning: a report consumer panicked; ignoring and continuing search");
            }
        }
    }
}
