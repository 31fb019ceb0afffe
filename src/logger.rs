//! Named fan-out from call sites to a set of sinks.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::buffer::Buffer;
use crate::error::{self, Error, ErrorHandler};
use crate::formatter::Formatter;
use crate::level::{AtomicLevel, Level};
use crate::record::{Record, SourceLocation};
use crate::sinks::Sink;
use crate::thread_pool::{OverflowPolicy, ThreadPool};

enum LoggerKind {
    Sync,
    Async {
        pool: Weak<ThreadPool>,
        policy: OverflowPolicy,
    },
}

/// A named logger dispatching records to its sinks.
///
/// The level check on the hot path is a single relaxed atomic load. Failures
/// while sinking never reach the caller; they are routed to the error
/// handler. Always constructed behind `Arc`: the asynchronous kind hands
/// strong handles to itself to the worker pool's queue.
pub struct Logger {
    name: String,
    sinks: Vec<Arc<dyn Sink>>,
    level: AtomicLevel,
    flush_level: AtomicLevel,
    err_handler: RwLock<Option<ErrorHandler>>,
    kind: LoggerKind,
    self_weak: Weak<Logger>,
}

impl Logger {
    /// Synchronous logger: records reach the sinks on the calling thread.
    pub fn new(
        name: impl Into<String>,
        sinks: impl IntoIterator<Item = Arc<dyn Sink>>,
    ) -> Arc<Logger> {
        Self::build(name.into(), sinks.into_iter().collect(), LoggerKind::Sync)
    }

    /// Asynchronous logger: records are copied onto `pool`'s queue and
    /// delivered by its workers. The logger keeps only a lookup handle to
    /// the pool.
    pub fn new_async(
        name: impl Into<String>,
        sinks: impl IntoIterator<Item = Arc<dyn Sink>>,
        pool: &Arc<ThreadPool>,
        policy: OverflowPolicy,
    ) -> Arc<Logger> {
        Self::build(
            name.into(),
            sinks.into_iter().collect(),
            LoggerKind::Async {
                pool: Arc::downgrade(pool),
                policy,
            },
        )
    }

    fn build(name: String, sinks: Vec<Arc<dyn Sink>>, kind: LoggerKind) -> Arc<Logger> {
        Arc::new_cyclic(|self_weak| Logger {
            name,
            sinks,
            level: AtomicLevel::new(Level::Info),
            flush_level: AtomicLevel::new(Level::Fatal),
            err_handler: RwLock::new(None),
            kind,
            self_weak: self_weak.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    pub fn level(&self) -> Level {
        self.level.load()
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    pub fn flush_level(&self) -> Level {
        self.flush_level.load()
    }

    /// Records at or above `level` trigger a flush pass over the sinks.
    pub fn set_flush_level(&self, level: Level) {
        self.flush_level.store(level);
    }

    pub fn should_log(&self, level: Level) -> bool {
        level >= self.level.load()
    }

    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        *self.err_handler.write() = handler;
    }

    /// Installs `formatter` on every sink; each sink gets its own clone.
    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        for sink in &self.sinks {
            sink.set_formatter(formatter.clone_box());
        }
    }

    /// Compiles `pattern` and installs it on every sink.
    pub fn set_pattern(&self, pattern: &str) {
        for sink in &self.sinks {
            sink.set_pattern(pattern);
        }
    }

    pub fn log(&self, level: Level, msg: &str) {
        self.log_at(None, level, msg);
    }

    pub fn log_at(&self, source: Option<SourceLocation>, level: Level, msg: &str) {
        if !self.should_log(level) {
            return;
        }
        let record = Record::new(&self.name, level, msg).with_source(source);
        self.dispatch(&record);
    }

    /// Front-end for the logging macros: renders the arguments into an
    /// inline-capacity buffer before building the record.
    pub fn log_args(&self, source: Option<SourceLocation>, level: Level, args: fmt::Arguments<'_>) {
        if !self.should_log(level) {
            return;
        }
        match args.as_str() {
            Some(msg) => self.log_at(source, level, msg),
            None => {
                let mut buf = Buffer::new();
                // Infallible: Buffer's fmt::Write never errors.
                let _ = fmt::write(&mut buf, args);
                let record = Record::new(&self.name, level, buf.as_str()).with_source(source);
                self.dispatch(&record);
            }
        }
    }

    pub fn trace(&self, msg: &str) {
        self.log(Level::Trace, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }

    pub fn warning(&self, msg: &str) {
        self.log(Level::Warning, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }

    pub fn fatal(&self, msg: &str) {
        self.log(Level::Fatal, msg);
    }

    pub fn flush(&self) {
        match &self.kind {
            LoggerKind::Sync => self.backend_flush(),
            LoggerKind::Async { pool, policy } => match pool.upgrade() {
                Some(pool) => {
                    if let Some(this) = self.self_weak.upgrade() {
                        pool.post_flush(this, *policy);
                    }
                }
                None => self.handle_error(&Error::WorkerPoolGone.to_string()),
            },
        }
    }

    /// New logger sharing this one's sinks, thresholds, handler, and
    /// dispatch kind under a different name.
    pub fn clone_with_name(&self, name: impl Into<String>) -> Arc<Logger> {
        let kind = match &self.kind {
            LoggerKind::Sync => LoggerKind::Sync,
            LoggerKind::Async { pool, policy } => LoggerKind::Async {
                pool: pool.clone(),
                policy: *policy,
            },
        };
        let cloned = Self::build(name.into(), self.sinks.clone(), kind);
        cloned.set_level(self.level());
        cloned.set_flush_level(self.flush_level());
        cloned.set_error_handler(self.err_handler.read().as_ref().cloned());
        cloned
    }

    fn dispatch(&self, record: &Record<'_>) {
        match &self.kind {
            LoggerKind::Sync => self.backend_sink(record),
            LoggerKind::Async { pool, policy } => match pool.upgrade() {
                Some(pool) => {
                    if let Some(this) = self.self_weak.upgrade() {
                        pool.post_log(this, record, *policy);
                    }
                }
                None => self.handle_error_at(&Error::WorkerPoolGone, record.source()),
            },
        }
    }

    /// Fan-out over the sinks. Runs on the calling thread for synchronous
    /// loggers and on a pool worker for asynchronous ones.
    pub(crate) fn backend_sink(&self, record: &Record<'_>) {
        for sink in &self.sinks {
            if sink.should_log(record.level()) {
                if let Err(err) = sink.log(record) {
                    self.handle_error_at(&err, record.source());
                }
            }
        }
        if self.should_flush(record) {
            self.backend_flush();
        }
    }

    pub(crate) fn backend_flush(&self) {
        for sink in &self.sinks {
            if let Err(err) = sink.flush() {
                self.handle_error(&err.to_string());
            }
        }
    }

    fn should_flush(&self, record: &Record<'_>) -> bool {
        let level = record.level();
        level >= self.flush_level.load() && level != Level::Off
    }

    fn handle_error_at(&self, err: &Error, source: Option<SourceLocation>) {
        match source {
            Some(loc) => {
                self.handle_error(&format!("{} [{}({})]", err, loc.file(), loc.line()));
            }
            None => self.handle_error(&err.to_string()),
        }
    }

    fn handle_error(&self, msg: &str) {
        let handler = self.err_handler.read();
        match handler.as_ref() {
            Some(handler) => handler(msg),
            None => error::default_error_handler(&self.name, msg),
        }
    }
}
