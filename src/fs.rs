//! Buffered append-mode file handle used by the file sinks.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::buffer::Buffer;
use crate::error::{Error, Result};

const OPEN_TRIES: u32 = 5;
const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Append-mode log file with buffered writes.
///
/// Missing parent directories are created on open. The rotation helpers on
/// the sinks close and reopen the handle through this type.
pub(crate) struct LogFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl LogFile {
    pub(crate) fn new() -> Self {
        LogFile {
            path: PathBuf::new(),
            writer: None,
        }
    }

    pub(crate) fn open(&mut self, path: impl Into<PathBuf>, truncate: bool) -> Result<()> {
        self.close();
        self.path = path.into();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::OpenFile {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        let mut last_err = None;
        for attempt in 0..OPEN_TRIES {
            if attempt > 0 {
                thread::sleep(OPEN_RETRY_INTERVAL);
            }
            if truncate {
                // Truncate in a separate pass so an interrupted write never
                // leaves a partially-truncated appending handle.
                if let Err(source) = File::create(&self.path) {
                    last_err = Some(source);
                    continue;
                }
            }
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => {
                    self.writer = Some(BufWriter::new(file));
                    return Ok(());
                }
                Err(source) => last_err = Some(source),
            }
        }

        Err(Error::OpenFile {
            path: self.path.clone(),
            source: last_err
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "open failed")),
        })
    }

    pub(crate) fn reopen(&mut self, truncate: bool) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::NotOpened);
        }
        let path = self.path.clone();
        self.open(path, truncate)
    }

    pub(crate) fn write(&mut self, buf: &Buffer) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::NotOpened)?;
        writer
            .write_all(buf.as_bytes())
            .map_err(|source| Error::WriteFile {
                path: self.path.clone(),
                source,
            })
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::NotOpened)?;
        writer.flush().map_err(|source| Error::FlushFile {
            path: self.path.clone(),
            source,
        })
    }

    /// Size of the file on disk. Callers flush first when buffered bytes
    /// must be counted.
    pub(crate) fn size(&self) -> Result<u64> {
        let writer = self.writer.as_ref().ok_or(Error::NotOpened)?;
        let metadata = writer
            .get_ref()
            .metadata()
            .map_err(|source| Error::FileSize {
                path: self.path.clone(),
                source,
            })?;
        Ok(metadata.len())
    }

    pub(crate) fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        self.close();
    }
}

/// Splits a filename into stem and extension.
///
/// The extension starts at the last `.`, provided that dot is neither the
/// first character of the basename nor the final character, and does not
/// appear before the last `/`:
///
/// - `"mylog.txt"` → `("mylog", ".txt")`
/// - `".mylog"` → `(".mylog", "")`
/// - `"a/b.d/f"` → `("a/b.d/f", "")`
/// - `"..txt"` → `(".", ".txt")`
pub(crate) fn split_by_extension(filename: &str) -> (&str, &str) {
    let Some(dot) = filename.rfind('.') else {
        return (filename, "");
    };
    if dot == filename.len() - 1 {
        return (filename, "");
    }
    match filename.rfind('/') {
        // The dot belongs to a directory component, or it starts the
        // basename (hidden file).
        Some(sep) if sep >= dot.saturating_sub(1) => (filename, ""),
        None if dot == 0 => (filename, ""),
        _ => filename.split_at(dot),
    }
}
