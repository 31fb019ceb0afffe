//! Error types and the logger error-handler hook.
//!
//! Construction failures surface to the caller; failures on the logging hot
//! path are routed through the owning logger's error handler instead.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// Handler invoked with a rendered error message when logging fails.
pub type ErrorHandler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed opening file {} for writing: {source}", .path.display())]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("failed writing to file {}: {source}", .path.display())]
    WriteFile { path: PathBuf, source: io::Error },

    #[error("failed flushing file {}: {source}", .path.display())]
    FlushFile { path: PathBuf, source: io::Error },

    #[error("failed querying size of file {}: {source}", .path.display())]
    FileSize { path: PathBuf, source: io::Error },

    #[error("rotating file sink: failed renaming {} to {}: {source}", .from.display(), .to.display())]
    RenameFile {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("failed removing file {}: {source}", .path.display())]
    RemoveFile { path: PathBuf, source: io::Error },

    #[error("failed reopening file - was not opened before")]
    NotOpened,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("logger with name '{0}' already exists")]
    LoggerExists(String),

    #[error("async log: thread pool doesn't exist anymore")]
    WorkerPoolGone,

    #[error("failed parsing config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

struct ReportState {
    counter: u64,
    last_report: Option<Instant>,
}

static REPORT_STATE: Lazy<Mutex<ReportState>> = Lazy::new(|| {
    Mutex::new(ReportState {
        counter: 0,
        last_report: None,
    })
});

/// Fallback error reporter used when a logger has no custom handler.
///
/// Emits at most one stderr line per second; the counter still advances for
/// suppressed reports.
pub(crate) fn default_error_handler(logger_name: &str, msg: &str) {
    let mut state = REPORT_STATE.lock();
    state.counter += 1;
    let now = Instant::now();
    if let Some(last) = state.last_report {
        if now.duration_since(last) < Duration::from_secs(1) {
            return;
        }
    }
    state.last_report = Some(now);
    let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    eprintln!(
        "[*** LOG ERROR #{:04} ***] [{}] [{}] {{{}}}",
        state.counter, date, logger_name, msg
    );
}
