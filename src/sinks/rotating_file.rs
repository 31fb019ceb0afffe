//! Size-based rotating file sink.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::formatter::{Formatter, PatternFormatter};
use crate::fs::{self, LogFile};
use crate::level::{AtomicLevel, Level};
use crate::record::Record;
use crate::sinks::Sink;

const MAX_FILES_LIMIT: usize = 200_000;
const RENAME_RETRY_DELAY: Duration = Duration::from_millis(100);

struct RotatingInner {
    formatter: Box<dyn Formatter>,
    base: String,
    max_size: u64,
    max_files: usize,
    current_size: u64,
    file: LogFile,
}

/// Rotates `log.txt` → `log.1.txt` → `log.2.txt` → ... when the active file
/// would exceed `max_size`; the file at index `max_files` is dropped.
pub struct RotatingFileSink {
    level: AtomicLevel,
    inner: Mutex<RotatingInner>,
}

impl RotatingFileSink {
    pub fn new(
        path: impl Into<PathBuf>,
        max_size: u64,
        max_files: usize,
        rotate_on_open: bool,
    ) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::InvalidArgument(
                "rotating sink: max_size arg cannot be zero".into(),
            ));
        }
        if max_files > MAX_FILES_LIMIT {
            return Err(Error::InvalidArgument(format!(
                "rotating sink: max_files arg cannot exceed {MAX_FILES_LIMIT}"
            )));
        }

        let base = path.into().to_string_lossy().into_owned();
        let mut inner = RotatingInner {
            formatter: Box::new(PatternFormatter::default()),
            base: base.clone(),
            max_size,
            max_files,
            current_size: 0,
            file: LogFile::new(),
        };
        inner.file.open(&base, false)?;
        inner.current_size = inner.file.size()?;
        if rotate_on_open && inner.current_size > 0 {
            rotate(&mut inner)?;
            inner.current_size = 0;
        }

        Ok(RotatingFileSink {
            level: AtomicLevel::new(Level::Trace),
            inner: Mutex::new(inner),
        })
    }

    /// Filename for rotation index `index`: the base name as-is for index 0,
    /// `{stem}.{index}{ext}` otherwise.
    pub fn calc_filename(base: &str, index: usize) -> String {
        if index == 0 {
            return base.to_string();
        }
        let (stem, ext) = fs::split_by_extension(base);
        format!("{stem}.{index}{ext}")
    }

    pub fn path(&self) -> PathBuf {
        self.inner.lock().file.path().to_path_buf()
    }
}

impl Sink for RotatingFileSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let mut inner = self.inner.lock();
        let mut buf = Buffer::new();
        inner.formatter.format(record, &mut buf);

        let mut new_size = inner.current_size + buf.len() as u64;
        if new_size > inner.max_size {
            inner.file.flush()?;
            if inner.file.size()? > 0 {
                rotate(&mut inner)?;
                new_size = buf.len() as u64;
            }
        }
        inner.file.write(&buf)?;
        inner.current_size = new_size;
        Ok(())
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

/// Shifts every existing file up one index, then truncate-reopens the base
/// file. A failing rename is retried once after a short sleep; if it still
/// fails, the base file is truncated so logging can continue and the current
/// log operation fails.
fn rotate(inner: &mut RotatingInner) -> Result<()> {
    inner.file.close();

    for index in (1..=inner.max_files).rev() {
        let src = PathBuf::from(RotatingFileSink::calc_filename(&inner.base, index - 1));
        if !src.exists() {
            continue;
        }
        let target = PathBuf::from(RotatingFileSink::calc_filename(&inner.base, index));

        if let Err(first) = rename_file(&src, &target) {
            thread::sleep(RENAME_RETRY_DELAY);
            if rename_file(&src, &target).is_err() {
                inner.file.reopen(true)?;
                inner.current_size = 0;
                return Err(first);
            }
        }
    }
    inner.file.reopen(true)
}

/// Removes the target if present, then renames src onto it.
fn rename_file(src: &std::path::Path, target: &std::path::Path) -> Result<()> {
    let _ = std::fs::remove_file(target);
    std::fs::rename(src, target).map_err(|source| Error::RenameFile {
        from: src.to_path_buf(),
        to: target.to_path_buf(),
        source,
    })
}
