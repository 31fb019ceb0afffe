//! Plain append-to-file sink.

use std::path::PathBuf;

use parking_lot::Mutex;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::formatter::{Formatter, PatternFormatter};
use crate::fs::LogFile;
use crate::level::{AtomicLevel, Level};
use crate::record::Record;
use crate::sinks::Sink;

struct BasicFileInner {
    formatter: Box<dyn Formatter>,
    file: LogFile,
}

/// Appends formatted records to a single file.
pub struct BasicFileSink {
    level: AtomicLevel,
    inner: Mutex<BasicFileInner>,
}

impl BasicFileSink {
    pub fn new(path: impl Into<PathBuf>, truncate: bool) -> Result<Self> {
        let mut file = LogFile::new();
        file.open(path, truncate)?;
        Ok(BasicFileSink {
            level: AtomicLevel::new(Level::Trace),
            inner: Mutex::new(BasicFileInner {
                formatter: Box::new(PatternFormatter::default()),
                file,
            }),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.inner.lock().file.path().to_path_buf()
    }
}

impl Sink for BasicFileSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let mut inner = self.inner.lock();
        let mut buf = Buffer::new();
        inner.formatter.format(record, &mut buf);
        inner.file.write(&buf)
    }

    fn flush(&self) -> Result<()> {
        self.inner.lock().file.flush()
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.inner.lock().formatter = formatter;
    }

    fn level(&self) -> Level {
        self.level.load()
    }

    fn set_level(&self, level: Level) {
        self.level.store(level);
    }
}
