//! Pattern-based record rendering.
//!
//! A pattern string is compiled once into an ordered list of field emitters;
//! rendering a record walks that list and appends bytes to the destination
//! buffer. Formatting never fails: unknown `%` flags degrade to literal
//! output.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::buffer::Buffer;
use crate::os;
use crate::record::Record;

/// Byte offsets reported back to the sink after formatting.
///
/// The console color sink brackets `color_start..color_end` with the ANSI
/// code for the record's level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatInfo {
    pub color_start: usize,
    pub color_end: usize,
}

impl FormatInfo {
    pub fn color_range(&self) -> Option<std::ops::Range<usize>> {
        (self.color_end > self.color_start).then(|| self.color_start..self.color_end)
    }
}

/// Renders records into byte buffers.
pub trait Formatter: Send {
    /// Appends the rendering of `record` plus a trailing newline to `dest`.
    fn format(&mut self, record: &Record<'_>, dest: &mut Buffer) -> FormatInfo;

    /// An independent formatter producing identical output.
    fn clone_box(&self) -> Box<dyn Formatter>;
}

#[derive(Debug, Clone)]
enum Op {
    Literal(String),
    Full,
    Payload,
    LevelName,
    LoggerName,
    ThreadId,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millis,
    Micros,
    Nanos,
    SourceFile,
    SourceBasename,
    SourceLine,
    SourceModule,
    ColorStart,
    ColorEnd,
}

/// Cached per-second state. Most records land within the same second, so the
/// broken-down time and the fixed prefix of the full form are recomputed only
/// when the second changes.
struct SecondCache {
    secs: i64,
    tm: NaiveDateTime,
    full_prefix: Buffer,
}

impl SecondCache {
    fn new() -> Self {
        SecondCache {
            secs: i64::MIN,
            tm: NaiveDateTime::MIN,
            full_prefix: Buffer::new(),
        }
    }
}

/// Compiles a `%`-flag pattern string into a formatter.
pub struct PatternFormatter {
    pattern: String,
    ops: Vec<Op>,
    cache: SecondCache,
}

impl PatternFormatter {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let ops = compile(&pattern);
        PatternFormatter {
            pattern,
            ops,
            cache: SecondCache::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        PatternFormatter::new("%+")
    }
}

impl Formatter for PatternFormatter {
    fn format(&mut self, record: &Record<'_>, dest: &mut Buffer) -> FormatInfo {
        let (secs, nanos) = os::time_parts(record.time());
        if self.cache.secs != secs {
            self.cache.tm = os::localtime(secs);
            self.cache.full_prefix.clear();
            self.cache.secs = secs;
        }

        let mut info = FormatInfo::default();
        let Self { ops, cache, .. } = self;
        for op in ops.iter() {
            emit(op, record, cache, nanos, dest, &mut info);
        }
        dest.push_byte(b'\n');
        info
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(PatternFormatter::new(self.pattern.clone()))
    }
}

fn compile(pattern: &str) -> Vec<Op> {
    let mut ops = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            literal.push(ch);
            continue;
        }
        // A trailing lone '%' is ignored.
        let Some(flag) = chars.next() else { break };
        let op = match flag {
            '+' => Some(Op::Full),
            'v' => Some(Op::Payload),
            'l' => Some(Op::LevelName),
            'n' => Some(Op::LoggerName),
            't' => Some(Op::ThreadId),
            'Y' => Some(Op::Year),
            'm' => Some(Op::Month),
            'd' => Some(Op::Day),
            'H' => Some(Op::Hour),
            'M' => Some(Op::Minute),
            'S' => Some(Op::Second),
            'e' => Some(Op::Millis),
            'f' => Some(Op::Micros),
            'F' => Some(Op::Nanos),
            'g' => Some(Op::SourceFile),
            's' => Some(Op::SourceBasename),
            'L' => Some(Op::SourceLine),
            '@' => Some(Op::SourceModule),
            '^' => Some(Op::ColorStart),
            '$' => Some(Op::ColorEnd),
            '%' => {
                literal.push('%');
                None
            }
            unknown => {
                // Unknown flags appear as-is.
                literal.push('%');
                literal.push(unknown);
                None
            }
        };
        if let Some(op) = op {
            if !literal.is_empty() {
                ops.push(Op::Literal(std::mem::take(&mut literal)));
            }
            ops.push(op);
        }
    }

    if !literal.is_empty() {
        ops.push(Op::Literal(literal));
    }
    ops
}

fn emit(
    op: &Op,
    record: &Record<'_>,
    cache: &mut SecondCache,
    nanos: u32,
    dest: &mut Buffer,
    info: &mut FormatInfo,
) {
    match op {
        Op::Literal(text) => dest.push_str(text),
        Op::Full => emit_full(record, cache, nanos, dest, info),
        Op::Payload => dest.push_str(record.payload()),
        Op::LevelName => dest.push_str(record.level().as_str()),
        Op::LoggerName => dest.push_str(record.logger_name()),
        Op::ThreadId => dest.push_uint(record.thread_id()),
        Op::Year => dest.push_uint(cache.tm.year() as u64),
        Op::Month => dest.pad2(cache.tm.month()),
        Op::Day => dest.pad2(cache.tm.day()),
        Op::Hour => dest.pad2(cache.tm.hour()),
        Op::Minute => dest.pad2(cache.tm.minute()),
        Op::Second => dest.pad2(cache.tm.second()),
        Op::Millis => dest.pad3(nanos / 1_000_000),
        Op::Micros => dest.pad3(nanos / 1_000 % 1_000),
        Op::Nanos => dest.pad3(nanos % 1_000),
        Op::SourceFile => {
            if let Some(source) = record.source() {
                dest.push_str(source.file());
            }
        }
        Op::SourceBasename => {
            if let Some(source) = record.source() {
                dest.push_str(source.file_basename());
            }
        }
        Op::SourceLine => {
            if let Some(source) = record.source() {
                dest.push_uint(source.line() as u64);
            }
        }
        Op::SourceModule => {
            if let Some(source) = record.source() {
                dest.push_str(source.module_path());
            }
        }
        Op::ColorStart => info.color_start = dest.len(),
        Op::ColorEnd => info.color_end = dest.len(),
    }
}

/// `[YYYY-MM-DD HH-MM-SS.mmm] [logger] [level] [thread] [file:line module]
/// payload`, with the logger, thread, and source brackets suppressed when
/// their field is empty. The level substring is reported as the color range.
fn emit_full(
    record: &Record<'_>,
    cache: &mut SecondCache,
    nanos: u32,
    dest: &mut Buffer,
    info: &mut FormatInfo,
) {
    if cache.full_prefix.is_empty() {
        let prefix = &mut cache.full_prefix;
        prefix.push_byte(b'[');
        prefix.push_uint(cache.tm.year() as u64);
        prefix.push_byte(b'-');
        prefix.pad2(cache.tm.month());
        prefix.push_byte(b'-');
        prefix.pad2(cache.tm.day());
        prefix.push_byte(b' ');
        prefix.pad2(cache.tm.hour());
        prefix.push_byte(b'-');
        prefix.pad2(cache.tm.minute());
        prefix.push_byte(b'-');
        prefix.pad2(cache.tm.second());
        prefix.push_byte(b'.');
    }
    dest.extend_from_buffer(&cache.full_prefix);
    dest.pad3(nanos / 1_000_000);
    dest.push_str("] ");

    if !record.logger_name().is_empty() {
        dest.push_byte(b'[');
        dest.push_str(record.logger_name());
        dest.push_str("] ");
    }

    dest.push_byte(b'[');
    info.color_start = dest.len();
    dest.push_str(record.level().as_str());
    info.color_end = dest.len();
    dest.push_str("] ");

    if record.thread_id() != 0 {
        dest.push_byte(b'[');
        dest.pad_uint(record.thread_id(), 6);
        dest.push_str("] ");
    }

    if let Some(source) = record.source() {
        dest.push_byte(b'[');
        dest.push_str(source.file_basename());
        dest.push_byte(b':');
        dest.push_uint(source.line() as u64);
        dest.push_byte(b' ');
        dest.push_str(source.module_path());
        dest.push_str("] ");
    }

    dest.push_str(record.payload());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::SourceLocation;

    fn render(pattern: &str, record: &Record<'_>) -> (String, FormatInfo) {
        let mut formatter = PatternFormatter::new(pattern);
        let mut dest = Buffer::new();
        let info = formatter.format(record, &mut dest);
        (dest.as_str().to_string(), info)
    }

    #[test]
    fn flag_free_pattern_is_literal() {
        let record = Record::new("core", Level::Info, "payload");
        let (out, _) = render("hello world", &record);
        assert_eq!(out, "hello world\n");
    }

    #[test]
    fn payload_and_level_flags() {
        let record = Record::new("core", Level::Warning, "disk almost full");
        let (out, _) = render("%l: %v", &record);
        assert_eq!(out, "warning: disk almost full\n");
    }

    #[test]
    fn logger_name_and_thread() {
        let record = Record::new("core", Level::Info, "x");
        let (out, _) = render("[%n] %v", &record);
        assert_eq!(out, "[core] x\n");

        let (out, _) = render("%t", &record);
        assert_eq!(out.trim_end(), record.thread_id().to_string());
    }

    #[test]
    fn percent_escapes() {
        let record = Record::new("core", Level::Info, "x");
        let (out, _) = render("100%% done", &record);
        assert_eq!(out, "100% done\n");
    }

    #[test]
    fn unknown_flag_is_literal() {
        let record = Record::new("core", Level::Info, "x");
        let (out, _) = render("%q%v", &record);
        assert_eq!(out, "%qx\n");
    }

    #[test]
    fn trailing_percent_is_ignored() {
        let record = Record::new("core", Level::Info, "x");
        let (out, _) = render("%v%", &record);
        assert_eq!(out, "x\n");
    }

    #[test]
    fn color_markers_record_offsets() {
        let record = Record::new("core", Level::Error, "boom");
        let (out, info) = render(">> %^%l%$ <<", &record);
        assert_eq!(out, ">> error <<\n");
        assert_eq!(&out[info.color_start..info.color_end], "error");
    }

    #[test]
    fn source_flags() {
        let source = SourceLocation::new("src/net/conn.rs", 77, "app::net");
        let record = Record::new("core", Level::Info, "x").with_source(Some(source));
        let (out, _) = render("%g %s %L %@", &record);
        assert_eq!(out, "src/net/conn.rs conn.rs 77 app::net\n");

        let bare = Record::new("core", Level::Info, "x");
        let (out, _) = render("%g%s%L%@", &bare);
        assert_eq!(out, "\n");
    }

    #[test]
    fn date_flags_are_padded() {
        let record = Record::new("core", Level::Info, "x");
        let (out, _) = render("%Y-%m-%d %H:%M:%S.%e", &record);
        let line = out.trim_end();
        // YYYY-MM-DD HH:MM:SS.mmm
        assert_eq!(line.len(), 23);
        assert_eq!(&line[4..5], "-");
        assert_eq!(&line[10..11], " ");
        assert_eq!(&line[19..20], ".");
    }

    #[test]
    fn full_pattern_shape() {
        let source = SourceLocation::new("src/main.rs", 10, "app");
        let record = Record::new("core", Level::Info, "started").with_source(Some(source));
        let (out, info) = render("%+", &record);
        assert!(out.starts_with('['));
        assert!(out.contains("[core]"));
        assert!(out.contains("[info]"));
        assert!(out.contains("[main.rs:10 app]"));
        assert!(out.ends_with("started\n"));
        assert_eq!(&out[info.color_start..info.color_end], "info");
    }

    #[test]
    fn full_pattern_suppresses_empty_fields() {
        let record = Record::new("", Level::Info, "started");
        let (out, _) = render("%+", &record);
        assert!(!out.contains("[] "));
        assert!(out.contains("[info]"));
    }

    #[test]
    fn clone_renders_identically() {
        let source = SourceLocation::new("src/lib.rs", 5, "app");
        let record = Record::new("core", Level::Debug, "check").with_source(Some(source));
        for pattern in ["%+", "%Y-%m-%d %H:%M:%S.%e%f%F [%n] %l %t %s:%L %v", "%^%v%$"] {
            let mut original = PatternFormatter::new(pattern);
            let mut cloned = original.clone_box();

            let mut a = Buffer::new();
            let info_a = original.format(&record, &mut a);
            let mut b = Buffer::new();
            let info_b = cloned.format(&record, &mut b);

            assert_eq!(a.as_str(), b.as_str());
            assert_eq!(info_a, info_b);
        }
    }

    #[test]
    fn second_cache_tracks_time_changes() {
        let mut formatter = PatternFormatter::new("%H:%M:%S");
        let base = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let record = Record::new("core", Level::Info, "x").with_time(base);
        let later = Record::new("core", Level::Info, "x")
            .with_time(base + std::time::Duration::from_secs(61));

        let mut a = Buffer::new();
        formatter.format(&record, &mut a);
        let mut b = Buffer::new();
        formatter.format(&later, &mut b);
        let mut c = Buffer::new();
        formatter.format(&record, &mut c);

        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(a.as_str(), c.as_str());
    }
}
