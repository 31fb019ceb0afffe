//! Log records: the borrowed form built on the caller's stack and the owned
//! form that crosses the async queue.

use std::time::SystemTime;

use crate::buffer::Buffer;
use crate::level::Level;
use crate::os;

/// Source position captured at the call site by the logging macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    file: &'static str,
    line: u32,
    module: &'static str,
}

impl SourceLocation {
    pub fn new(file: &'static str, line: u32, module: &'static str) -> Self {
        SourceLocation { file, line, module }
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn module_path(&self) -> &'static str {
        self.module
    }

    /// File name without its directory components.
    pub fn file_basename(&self) -> &'static str {
        os::basename(self.file)
    }
}

/// A single log event. Name and payload borrow from the call site (or from
/// an [`OwnedRecord`]'s buffer).
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    logger_name: &'a str,
    payload: &'a str,
    level: Level,
    time: SystemTime,
    thread_id: u64,
    source: Option<SourceLocation>,
}

impl<'a> Record<'a> {
    pub fn new(logger_name: &'a str, level: Level, payload: &'a str) -> Self {
        Record {
            logger_name,
            payload,
            level,
            time: SystemTime::now(),
            thread_id: os::thread_id(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<SourceLocation>) -> Self {
        self.source = source;
        self
    }

    pub fn with_time(mut self, time: SystemTime) -> Self {
        self.time = time;
        self
    }

    pub fn logger_name(&self) -> &'a str {
        self.logger_name
    }

    pub fn payload(&self) -> &'a str {
        self.payload
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn time(&self) -> SystemTime {
        self.time
    }

    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    pub fn source(&self) -> Option<SourceLocation> {
        self.source
    }

    /// Copies the record into a self-contained form that can outlive the
    /// producing stack frame.
    pub fn to_owned(&self) -> OwnedRecord {
        let mut buffer = Buffer::new();
        buffer.push_str(self.logger_name);
        buffer.push_str(self.payload);
        OwnedRecord {
            buffer,
            name_len: self.logger_name.len(),
            level: self.level,
            time: self.time,
            thread_id: self.thread_id,
            source: self.source,
        }
    }
}

/// A record whose name and payload live in an internal buffer, stored
/// contiguously. Required for queue transport.
#[derive(Debug, Clone)]
pub struct OwnedRecord {
    buffer: Buffer,
    name_len: usize,
    level: Level,
    time: SystemTime,
    thread_id: u64,
    source: Option<SourceLocation>,
}

impl OwnedRecord {
    /// Borrowed view rebased onto the internal buffer.
    pub fn as_record(&self) -> Record<'_> {
        let text = self.buffer.as_str();
        Record {
            logger_name: &text[..self.name_len],
            payload: &text[self.name_len..],
            level: self.level,
            time: self.time,
            thread_id: self.thread_id,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_record_preserves_views() {
        let record = Record::new("net", Level::Warning, "connection lost")
            .with_source(Some(SourceLocation::new("src/io/conn.rs", 42, "app::io")));
        let owned = record.to_owned();
        let view = owned.as_record();

        assert_eq!(view.logger_name(), "net");
        assert_eq!(view.payload(), "connection lost");
        assert_eq!(view.level(), Level::Warning);
        assert_eq!(view.thread_id(), record.thread_id());
        assert_eq!(view.time(), record.time());
        let source = view.source().unwrap();
        assert_eq!(source.line(), 42);
        assert_eq!(source.file_basename(), "conn.rs");
    }

    #[test]
    fn empty_name_and_payload() {
        let owned = Record::new("", Level::Info, "").to_owned();
        let view = owned.as_record();
        assert_eq!(view.logger_name(), "");
        assert_eq!(view.payload(), "");
    }
}
