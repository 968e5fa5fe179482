use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

/// A single cancellable one-shot timer: arming it spawns a thread that sets
/// `aborted` after `duration` unless cancelled first. At most one of these
/// is in flight during a search.
pub struct AbortTimer {
    cancel: Option<crossbeam_channel::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AbortTimer {
    pub fn arm(duration: Duration, aborted: Arc<AtomicBool>) -> Self {
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
        let handle = thread::spawn(move || match cancel_rx.recv_timeout(duration) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            Err(RecvTimeoutError::Timeout) => aborted.store(true, Ordering::Relaxed),
        });
        Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    /// Wake the timer thread without setting the abort flag, then join it.
    pub fn cancel(mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AbortTimer {
    fn drop(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn cancelled_timer_never_sets_flag() {
        let aborted = Arc::new(AtomicBool::new(false));
        let timer = AbortTimer::arm(Duration::from_secs(10), aborted.clone());
        timer.cancel();
        assert!(!aborted.load(Ordering::Relaxed));
    }

    #[test]
    fn expired_timer_sets_flag() {
        let aborted = Arc::new(AtomicBool::new(false));
        let timer = AbortTimer::arm(Duration::from_millis(10), aborted.clone());
        sleep(Duration::from_millis(100));
        assert!(aborted.load(Ordering::Relaxed));
        timer.cancel();
    }
}
