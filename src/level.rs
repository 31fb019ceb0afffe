//! Log severity levels.
//!
//! Levels are totally ordered by their numeric value; `Off` is only ever a
//! threshold and never appears on a record.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::Error;

/// Log severity, in ascending order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
    /// Threshold value that disables all output.
    Off = 6,
}

/// Severities below this constant compile to no-ops in the logging macros.
///
/// Raised by the `static-level-*` cargo features; defaults to `Trace` so
/// every call site produces code.
pub const STATIC_LEVEL: Level = if cfg!(feature = "static-level-off") {
    Level::Off
} else if cfg!(feature = "static-level-fatal") {
    Level::Fatal
} else if cfg!(feature = "static-level-error") {
    Level::Error
} else if cfg!(feature = "static-level-warning") {
    Level::Warning
} else if cfg!(feature = "static-level-info") {
    Level::Info
} else if cfg!(feature = "static-level-debug") {
    Level::Debug
} else {
    Level::Trace
};

impl Level {
    /// Lowercase level name as rendered by the `%l` pattern flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Off => "off",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Level {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warning,
            4 => Level::Error,
            5 => Level::Fatal,
            _ => Level::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" | "err" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "off" => Ok(Level::Off),
            _ => Err(Error::InvalidArgument(format!("unknown log level: {s}"))),
        }
    }
}

/// Level threshold shared across threads; all accesses are relaxed.
#[derive(Debug)]
pub(crate) struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub(crate) fn new(level: Level) -> Self {
        AtomicLevel(AtomicU8::new(level as u8))
    }

    pub(crate) fn load(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn store(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Fatal);
        assert!(Level::Fatal < Level::Off);
    }

    #[test]
    fn names_round_trip() {
        for level in [
            Level::Trace,
            Level::Debug,
            Level::Info,
            Level::Warning,
            Level::Error,
            Level::Fatal,
            Level::Off,
        ] {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn aliases_and_case() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("err".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn atomic_level() {
        let level = AtomicLevel::new(Level::Info);
        assert_eq!(level.load(), Level::Info);
        level.store(Level::Error);
        assert_eq!(level.load(), Level::Error);
    }
}
