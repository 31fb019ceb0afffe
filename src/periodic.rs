//! Background worker invoking a callback on a fixed interval.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded};

/// Runs `callback` every `interval` on its own thread until dropped.
///
/// A zero interval produces an inert worker. Stopping is signalled through a
/// channel the worker sleeps on, so drop returns as soon as the in-flight
/// callback (if any) finishes.
pub(crate) struct PeriodicWorker {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicWorker {
    pub(crate) fn new(callback: impl Fn() + Send + 'static, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        if interval.is_zero() {
            return PeriodicWorker {
                stop_tx,
                handle: None,
            };
        }

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => callback(),
                    _ => return,
                }
            }
        });
        PeriodicWorker {
            stop_tx,
            handle: Some(handle),
        }
    }
}

impl Drop for PeriodicWorker {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fires_periodically_and_stops_on_drop() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let worker = PeriodicWorker::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            Duration::from_millis(20),
        );

        thread::sleep(Duration::from_millis(110));
        drop(worker);
        let after_drop = hits.load(Ordering::SeqCst);
        assert!(after_drop >= 3, "expected several ticks, got {after_drop}");

        thread::sleep(Duration::from_millis(60));
        assert_eq!(hits.load(Ordering::SeqCst), after_drop);
    }

    #[test]
    fn zero_interval_is_inert() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let worker = PeriodicWorker::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            Duration::ZERO,
        );
        thread::sleep(Duration::from_millis(30));
        drop(worker);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
