// Shared test support: in-memory sinks and file helpers.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use sinklog::sinks::Sink;
use sinklog::{Formatter, Level, Record, Result};

/// Records payloads and counts flushes; formatting is ignored.
pub struct CounterSink {
    level: Mutex<Level>,
    payloads: Mutex<Vec<String>>,
    flushes: AtomicUsize,
}

impl CounterSink {
    pub fn new() -> Self {
        CounterSink {
            level: Mutex::new(Level::Trace),
            payloads: Mutex::new(Vec::new()),
            flushes: AtomicUsize::new(0),
        }
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().clone()
    }

    pub fn log_count(&self) -> usize {
        self.payloads.lock().len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.payloads.lock().clear();
        self.flushes.store(0, Ordering::SeqCst);
    }
}

impl Sink for CounterSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        self.payloads.lock().push(record.payload().to_string());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_formatter(&self, _formatter: Box<dyn Formatter>) {}

    fn level(&self) -> Level {
        *self.level.lock()
    }

    fn set_level(&self, level: Level) {
        *self.level.lock() = level;
    }
}

struct GateState {
    open: bool,
    entered: bool,
}

/// Blocks inside `log` until released; lets tests pin a pool worker.
pub struct GatedSink {
    state: Mutex<GateState>,
    cond: Condvar,
    payloads: Mutex<Vec<String>>,
}

impl GatedSink {
    pub fn new() -> Self {
        GatedSink {
            state: Mutex::new(GateState {
                open: false,
                entered: false,
            }),
            cond: Condvar::new(),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn open(&self) {
        self.state.lock().open = true;
        self.cond.notify_all();
    }

    /// Waits until a worker is parked inside `log`.
    pub fn wait_until_entered(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !state.entered {
            if self.cond.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.entered
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().clone()
    }
}

impl Sink for GatedSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.entered = true;
            self.cond.notify_all();
            while !state.open {
                self.cond.wait(&mut state);
            }
        }
        self.payloads.lock().push(record.payload().to_string());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn set_formatter(&self, _formatter: Box<dyn Formatter>) {}

    fn level(&self) -> Level {
        Level::Trace
    }

    fn set_level(&self, _level: Level) {}
}

pub fn file_contents(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).expect("failed to read log file")
}

pub fn count_lines(path: impl AsRef<Path>) -> usize {
    file_contents(path).lines().count()
}

pub fn count_files(dir: impl AsRef<Path>) -> usize {
    std::fs::read_dir(dir).expect("failed to read log dir").count()
}

pub fn file_size(path: impl AsRef<Path>) -> u64 {
    std::fs::metadata(path).expect("failed to stat log file").len()
}
