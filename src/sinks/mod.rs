//! Record destinations.
//!
//! Every sink owns a formatter behind its mutex and carries its own level
//! threshold, checked lock-free ahead of the logger's fan-out.

mod basic_file;
mod console;
mod daily_file;
mod rotating_file;

pub use basic_file::BasicFileSink;
pub use console::{ConsoleColorSink, ConsoleTarget};
pub use daily_file::{DailyFileSink, DailyNameScheme, DateSuffix, StrftimePath};
pub use rotating_file::RotatingFileSink;

use crate::error::Result;
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;

/// A terminal destination for records.
pub trait Sink: Send + Sync {
    /// Formats and writes one record. Serialized on the sink's mutex.
    fn log(&self, record: &Record<'_>) -> Result<()>;

    /// Flushes buffered output.
    fn flush(&self) -> Result<()>;

    /// Replaces the sink's formatter.
    fn set_formatter(&self, formatter: Box<dyn Formatter>);

    /// Compiles `pattern` into a fresh formatter and installs it.
    fn set_pattern(&self, pattern: &str) {
        self.set_formatter(Box::new(crate::formatter::PatternFormatter::new(pattern)));
    }

    fn level(&self) -> Level;

    fn set_level(&self, level: Level);

    /// Lock-free comparison against this sink's own threshold.
    fn should_log(&self, level: Level) -> bool {
        level >= self.level()
    }
}
