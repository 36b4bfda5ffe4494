//! Wall-clock budget enforcement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One timer thread guarding one search invocation.
///
/// The thread parks on a channel with the budget as its timeout. If the
/// budget runs out first, it raises the shared cancellation flag; if the
/// search finishes first, [`TimeControl::stop`] (or drop) wakes the thread
/// through the channel and joins it, so the timer can never fire after the
/// search has already produced a result.
pub struct TimeControl {
    wake: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TimeControl {
    /// Starts the timer. On expiry the flag is set exactly once.
    pub fn start(budget: Duration, flag: Arc<AtomicBool>) -> Self {
        let (wake, sleeper) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = sleeper.recv_timeout(budget) {
                flag.store(true, Ordering::Relaxed);
            }
        });
        TimeControl {
            wake,
            handle: Some(handle),
        }
    }

    /// Cancels the timer and waits for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Send fails only if the timer already expired and exited.
        let _ = self.wake.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimeControl {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn flag_raised_after_budget() {
        let flag = Arc::new(AtomicBool::new(false));
        let timer = TimeControl::start(Duration::from_millis(10), Arc::clone(&flag));
        thread::sleep(Duration::from_millis(100));
        assert!(flag.load(Ordering::Relaxed));
        timer.stop();
    }

    #[test]
    fn stop_before_expiry_leaves_flag_clear() {
        let flag = Arc::new(AtomicBool::new(false));
        let timer = TimeControl::start(Duration::from_secs(60), Arc::clone(&flag));

        let started = Instant::now();
        timer.stop();

        // Stopping does not wait out the budget, and the flag stays clear.
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!flag.load(Ordering::Relaxed));
    }

    #[test]
    fn drop_joins_the_timer_thread() {
        let flag = Arc::new(AtomicBool::new(false));
        {
            let _timer = TimeControl::start(Duration::from_secs(60), Arc::clone(&flag));
        }
        assert!(!flag.load(Ordering::Relaxed));
    }
}
