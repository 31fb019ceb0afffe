//! Console sink with ANSI level coloring.

use std::io::{self, Write};

use parking_lot::Mutex;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::formatter::{Formatter, PatternFormatter};
use crate::level::{AtomicLevel, Level};
use crate::record::Record;
use crate::sinks::Sink;

const RESET: &str = "\x1b[m";
const WHITE: &str = "\x1b[37m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const YELLOW_BOLD: &str = "\x1b[33m\x1b[1m";
const RED_BOLD: &str = "\x1b[31m\x1b[1m";
const BOLD_ON_RED: &str = "\x1b[1m\x1b[41m";

/// Output stream a console sink writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    fn write_pieces(&self, pieces: &[&[u8]]) -> io::Result<()> {
        // The stream handle lock keeps the pieces of one record contiguous
        // even when several sinks share the stream.
        match self {
            ConsoleTarget::Stdout => {
                let mut handle = io::stdout().lock();
                for piece in pieces {
                    handle.write_all(piece)?;
                }
                handle.flush()
            }
            ConsoleTarget::Stderr => {
                let mut handle = io::stderr().lock();
                for piece in pieces {
                    handle.write_all(piece)?;
                }
                handle.flush()
            }
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self {
            ConsoleTarget::Stdout => io::stdout().lock().flush(),
            ConsoleTarget::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct ConsoleInner {
    formatter: Box<dyn Formatter>,
    colors: [String; 7],
}

/// Writes records to stdout or stderr, bracketing the formatter-reported
/// color range with the level's ANSI code. Flushes after every record.
pub struct ConsoleColorSink {
    target: ConsoleTarget,
    level: AtomicLevel,
    inner: Mutex<ConsoleInner>,
}

impl ConsoleColorSink {
    pub fn new(target: ConsoleTarget) -> Self {
        let colors = [
            WHITE.to_string(),       // trace
            CYAN.to_string(),        // debug
            GREEN.to_string(),       // info
            YELLOW_BOLD.to_string(), // warning
            RED_BOLD.to_string(),    // error
            BOLD_ON_RED.to_string(), // fatal
            RESET.to_string(),       // off
        ];
        ConsoleColorSink {
            target,
            level: AtomicLevel::new(Level::Trace),
            inner: Mutex::new(ConsoleInner {
                formatter: Box::new(PatternFormatter::default()),
                colors,
            }),
        }
    }

    pub fn stdout() -> Self {
        ConsoleColorSink::new(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        ConsoleColorSink::new(ConsoleTarget::Stderr)
    }

    /// Replaces the ANSI escape used for `level`.
    pub fn set_color(&self, level: Level, escape: impl Into<String>) {
        self.inner.lock().colors[level as usize] = escape.into();
    }
}

impl Sink for ConsoleColorSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let mut inner = self.inner.lock();
        let mut buf = Buffer::new();
        let info = inner.formatter.format(record, &mut buf);
        let bytes = buf.as_bytes();

        match info.color_range() {
            Some(range) => {
                let color = inner.colors[record.level() as usize].as_bytes();
                self.target.write_pieces(&[
                    &bytes[..range.start],
                    color,
                    &bytes[range.clone()],
                    RESET.as_bytes(),
                    &bytes[range.end..],
                ])?;
            }
            None => self.target.write_pieces(&[bytes])?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let _inner = self.inner.lock();
        self.target.flush()?;
        Ok(())
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
