//! Trailing-edge debouncing on a dedicated worker thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::AutolinkError;

#[derive(Debug, Default)]
struct State {
    deadline: Option<Instant>,
    shutdown: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    wake: Condvar,
    quiet_period: Duration,
}

/// Runs an action once a quiet period has passed since the most recent [`call`].
///
/// Every call pushes the deadline back; the action never runs concurrently with itself.
///
/// [`call`]: Debouncer::call
#[derive(Debug)]
pub struct Debouncer {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new<F>(quiet_period: Duration, action: F) -> Result<Self, AutolinkError>
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            wake: Condvar::new(),
            quiet_period,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("autolink-debounce".into())
            .spawn(move || run(&worker_shared, action))?;

        Ok(Self {
            shared,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn quiet_period(&self) -> Duration {
        self.shared.quiet_period
    }

    /// Schedules the action, replacing any pending deadline.
    pub fn call(&self) {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return;
        }
        state.deadline = Some(Instant::now() + self.shared.quiet_period);
        self.shared.wake.notify_one();
    }

    /// Drops the pending invocation, if any.
    pub fn cancel(&self) {
        let mut state = self.shared.state.lock();
        state.deadline = None;
        self.shared.wake.notify_one();
    }

    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().deadline.is_some()
    }

    /// Stops the worker without running a pending invocation.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            state.deadline = None;
            self.shared.wake.notify_one();
        }

        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        // The action itself may trigger shutdown; joining from the worker would deadlock.
        if handle.thread().id() != thread::current().id() && handle.join().is_err() {
            tracing::warn!("debounced action panicked");
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<F: FnMut()>(shared: &Shared, mut action: F) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        match state.deadline {
            None => shared.wake.wait(&mut state),
            Some(deadline) if Instant::now() >= deadline => {
                state.deadline = None;
                MutexGuard::unlocked(&mut state, &mut action);
            }
            Some(deadline) => {
                shared.wake.wait_until(&mut state, deadline);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(quiet: Duration) -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let fired = Arc::clone(&count);
        let debouncer = Debouncer::new(quiet, move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        (debouncer, count)
    }

    #[test]
    fn bursts_collapse_into_one_invocation() {
        let (debouncer, count) = counting(Duration::from_millis(50));
        for _ in 0..5 {
            debouncer.call();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(debouncer.is_pending());

        thread::sleep(Duration::from_millis(400));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());

        debouncer.call();
        thread::sleep(Duration::from_millis(400));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_drops_the_pending_call() {
        let (debouncer, count) = counting(Duration::from_millis(100));
        debouncer.call();
        debouncer.cancel();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shutdown_stops_the_worker() {
        let (debouncer, count) = counting(Duration::from_millis(100));
        debouncer.call();
        debouncer.shutdown();
        debouncer.call();
        assert!(!debouncer.is_pending());
        thread::sleep(Duration::from_millis(300));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
