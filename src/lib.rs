//! Structured, multi-sink, thread-safe logging.
//!
//! Records flow from a call site through a [`Logger`] to one or more
//! [`Sink`]s: console with ANSI coloring, plain files, size-rotated files,
//! and date-rotated files. A [`PatternFormatter`] controls how each sink
//! renders records. Asynchronous loggers decouple producers from sinks via a
//! bounded queue served by a [`ThreadPool`]. A process-wide [`Registry`]
//! owns named loggers and global defaults, reachable through free functions
//! and the logging macros.
//!
//! # Quick start
//!
//! ```no_run
//! use sinklog::{info, warning};
//!
//! fn main() -> sinklog::Result<()> {
//!     let logger = sinklog::basic_logger("app", "logs/app.log")?;
//!     info!(logger: logger, "listening on port {}", 8080);
//!
//!     // Through the default (stdout color) logger:
//!     warning!("disk usage at {}%", 93);
//!     sinklog::shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Async logging
//!
//! ```no_run
//! use sinklog::sinks::{BasicFileSink, Sink};
//! use sinklog::{OverflowPolicy, info};
//! use std::sync::Arc;
//!
//! fn main() -> sinklog::Result<()> {
//!     sinklog::init_worker_pool(8192, 1)?;
//!     let sink: Arc<dyn Sink> = Arc::new(BasicFileSink::new("logs/app.log", false)?);
//!     let logger = sinklog::create_async("app", [sink], OverflowPolicy::Block)?;
//!     info!(logger: logger, "handled in the background");
//!     sinklog::shutdown();
//!     Ok(())
//! }
//! ```

mod buffer;
pub mod config;
mod error;
mod formatter;
mod fs;
mod level;
mod logger;
mod macros;
mod os;
mod periodic;
mod queue;
mod record;
mod registry;
pub mod sinks;
mod thread_pool;

pub use buffer::Buffer;
pub use error::{Error, ErrorHandler, Result};
pub use formatter::{FormatInfo, Formatter, PatternFormatter};
pub use level::{Level, STATIC_LEVEL};
pub use logger::Logger;
pub use record::{OwnedRecord, Record, SourceLocation};
pub use registry::Registry;
pub use thread_pool::{OverflowPolicy, ThreadPool};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sinks::{
    BasicFileSink, ConsoleColorSink, DailyFileSink, DailyNameScheme, DateSuffix, RotatingFileSink,
    Sink,
};

/// Commonly used types.
pub mod prelude {
    pub use crate::sinks::Sink;
    pub use crate::{Level, Logger, OverflowPolicy, Record, Result, SourceLocation};
}

/// The default logger, if one is set. Lock-free.
pub fn default_logger() -> Option<Arc<Logger>> {
    Registry::global().default_logger()
}

/// Replaces the default logger used by the plain logging macros.
pub fn set_default_logger(logger: Arc<Logger>) {
    Registry::global().set_default_logger(Some(logger));
}

/// Looks up a registered logger by name.
pub fn get(name: &str) -> Option<Arc<Logger>> {
    Registry::global().get(name)
}

/// Registers an already-configured logger.
pub fn register_logger(logger: Arc<Logger>) -> Result<()> {
    Registry::global().register_logger(logger)
}

/// Applies the global settings to `logger` and registers it.
pub fn initialize_logger(logger: &Arc<Logger>) -> Result<()> {
    Registry::global().initialize_logger(logger)
}

/// Sets the level of every registered logger and the global default.
pub fn set_level(level: Level) {
    Registry::global().set_level(level);
}

/// Installs per-name level overrides and optionally a new global level.
pub fn set_levels(overrides: HashMap<String, Level>, global: Option<Level>) {
    Registry::global().set_levels(overrides, global);
}

/// Sets the global pattern; every sink of every logger gets a fresh compile.
pub fn set_pattern(pattern: &str) {
    Registry::global().set_pattern(pattern);
}

/// Sets the global formatter prototype.
pub fn set_formatter(formatter: Box<dyn Formatter>) {
    Registry::global().set_formatter(formatter);
}

/// Sets the flush threshold of every registered logger and the global
/// default.
pub fn set_flush_level(level: Level) {
    Registry::global().set_flush_level(level);
}

/// Flushes every registered logger.
pub fn flush_all() {
    Registry::global().flush_all();
}

/// Starts a background thread flushing all loggers every `interval`.
pub fn flush_every(interval: Duration) {
    Registry::global().flush_every(interval);
}

/// Installs an error handler on every registered logger and future ones.
pub fn set_error_handler(handler: ErrorHandler) {
    Registry::global().set_error_handler(Some(handler));
}

/// Controls whether factory-created loggers register themselves.
pub fn set_automatic_registration(automatic: bool) {
    Registry::global().set_automatic_registration(automatic);
}

/// Runs `f` on every registered logger.
pub fn apply_all(f: impl Fn(&Arc<Logger>)) {
    Registry::global().apply_all(f);
}

/// Removes the named logger from the registry.
pub fn drop_logger(name: &str) {
    Registry::global().drop_logger(name);
}

/// Removes every logger, including the default.
pub fn drop_all() {
    Registry::global().drop_all();
}

/// Stops the periodic flusher, drops all loggers, and releases the worker
/// pool. Idempotent.
pub fn shutdown() {
    Registry::global().shutdown();
}

/// Creates and registers a synchronous logger over `sink`.
pub fn create(name: impl Into<String>, sink: Arc<dyn Sink>) -> Result<Arc<Logger>> {
    let logger = Logger::new(name, [sink]);
    initialize_logger(&logger)?;
    Ok(logger)
}

/// Logger appending to a single file.
pub fn basic_logger(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Arc<Logger>> {
    create(name, Arc::new(BasicFileSink::new(path, false)?))
}

/// Logger over a size-rotating file.
pub fn rotating_logger(
    name: impl Into<String>,
    path: impl Into<PathBuf>,
    max_size: u64,
    max_files: usize,
    rotate_on_open: bool,
) -> Result<Arc<Logger>> {
    create(
        name,
        Arc::new(RotatingFileSink::new(path, max_size, max_files, rotate_on_open)?),
    )
}

/// Logger over a date-rotating file using the default `_YYYY-MM-DD` naming.
pub fn daily_logger(
    name: impl Into<String>,
    path: impl Into<PathBuf>,
    rotation_hour: u32,
    rotation_minute: u32,
    max_days: usize,
) -> Result<Arc<Logger>> {
    create(
        name,
        Arc::new(DailyFileSink::<DateSuffix>::new(
            path,
            rotation_hour,
            rotation_minute,
            false,
            max_days,
        )?),
    )
}

/// Logger coloring records on stdout.
pub fn stdout_color_logger(name: impl Into<String>) -> Result<Arc<Logger>> {
    create(name, Arc::new(ConsoleColorSink::stdout()))
}

/// Logger coloring records on stderr.
pub fn stderr_color_logger(name: impl Into<String>) -> Result<Arc<Logger>> {
    create(name, Arc::new(ConsoleColorSink::stderr()))
}

/// Replaces the global worker pool with one of the given queue capacity and
/// worker count.
pub fn init_worker_pool(queue_size: usize, workers: usize) -> Result<()> {
    let pool = ThreadPool::new(queue_size, workers)?;
    Registry::global().set_pool(Some(pool));
    Ok(())
}

/// Creates and registers an asynchronous logger backed by the global worker
/// pool, creating the pool with defaults if it does not exist yet.
pub fn create_async(
    name: impl Into<String>,
    sinks: impl IntoIterator<Item = Arc<dyn Sink>>,
    policy: OverflowPolicy,
) -> Result<Arc<Logger>> {
    // The pool handle is resolved first and its lock released before the
    // registry map is touched.
    let pool = Registry::global().pool_or_default()?;
    let logger = Logger::new_async(name, sinks, &pool, policy);
    initialize_logger(&logger)?;
    Ok(logger)
}

/// Like [`daily_logger`], with a custom filename scheme.
pub fn daily_logger_with_scheme<N: DailyNameScheme>(
    name: impl Into<String>,
    path: impl Into<PathBuf>,
    rotation_hour: u32,
    rotation_minute: u32,
    max_days: usize,
) -> Result<Arc<Logger>> {
    create(
        name,
        Arc::new(DailyFileSink::<N>::new(
            path,
            rotation_hour,
            rotation_minute,
            false,
            max_days,
        )?),
    )
}
