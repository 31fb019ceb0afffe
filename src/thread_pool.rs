//! Worker pool servicing the asynchronous loggers.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::queue::BlockingQueue;
use crate::record::{OwnedRecord, Record};

pub(crate) const DEFAULT_QUEUE_SIZE: usize = 8192;
const MAX_WORKERS: usize = 1000;
const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(10);

/// How an async producer reacts to a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Block until the message can be enqueued; no records are lost.
    Block,
    /// Never block; discard the oldest pending message instead.
    OverrunOldest,
}

/// A message carries a strong handle to its logger so a worker can run the
/// backend dispatch even after every external reference is gone.
enum AsyncMessage {
    Log {
        logger: Arc<Logger>,
        record: OwnedRecord,
    },
    Flush {
        logger: Arc<Logger>,
    },
    Terminate,
}

/// Fixed set of worker threads draining a bounded queue of owned records.
pub struct ThreadPool {
    queue: Arc<BlockingQueue<AsyncMessage>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    pub fn new(queue_size: usize, worker_count: usize) -> Result<Arc<ThreadPool>> {
        if queue_size == 0 {
            return Err(Error::InvalidArgument(
                "thread pool: queue size must be at least 1".into(),
            ));
        }
        if worker_count == 0 || worker_count > MAX_WORKERS {
            return Err(Error::InvalidArgument(format!(
                "thread pool: invalid worker count (valid range is 1-{MAX_WORKERS})"
            )));
        }

        let queue = Arc::new(BlockingQueue::new(queue_size));
        let workers = (0..worker_count)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || worker_loop(&queue))
            })
            .collect();

        Ok(Arc::new(ThreadPool {
            queue,
            workers: Mutex::new(workers),
        }))
    }

    pub(crate) fn post_log(&self, logger: Arc<Logger>, record: &Record<'_>, policy: OverflowPolicy) {
        let msg = AsyncMessage::Log {
            logger,
            record: record.to_owned(),
        };
        self.post(msg, policy);
    }

    pub(crate) fn post_flush(&self, logger: Arc<Logger>, policy: OverflowPolicy) {
        self.post(AsyncMessage::Flush { logger }, policy);
    }

    fn post(&self, msg: AsyncMessage, policy: OverflowPolicy) {
        match policy {
            OverflowPolicy::Block => self.queue.enqueue(msg),
            OverflowPolicy::OverrunOldest => self.queue.enqueue_nowait(msg),
        }
    }

    /// Messages discarded so far by `OverrunOldest` producers.
    pub fn overrun_counter(&self) -> usize {
        self.queue.overrun_counter()
    }

    /// Snapshot of the number of pending messages.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

impl Drop for ThreadPool {
    /// Posts one terminate per worker and joins them. Messages still queued
    /// behind a worker's terminate are handled by the remaining workers;
    /// anything left after the last terminate is dropped with the queue.
    /// Join failures (a worker that panicked) are swallowed so teardown
    /// always completes.
    fn drop(&mut self) {
        let mut workers = self.workers.lock();
        for _ in 0..workers.len() {
            self.queue.enqueue(AsyncMessage::Terminate);
        }
        for worker in workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(queue: &BlockingQueue<AsyncMessage>) {
    loop {
        // The timeout keeps the worker responsive to termination even if
        // producers go quiet.
        match queue.dequeue_for(DEQUEUE_TIMEOUT) {
            None => continue,
            Some(AsyncMessage::Log { logger, record }) => {
                logger.backend_sink(&record.as_record());
            }
            Some(AsyncMessage::Flush { logger }) => logger.backend_flush(),
            Some(AsyncMessage::Terminate) => break,
        }
    }
}
