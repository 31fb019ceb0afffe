//! Date-based rotating file sink.
//!
//! A new file is opened when a record's wall clock reaches the next rotation
//! instant (a configurable hour:minute each day). Filenames come from a
//! pluggable scheme; an optional retention count bounds how many dated files
//! stay on disk.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{NaiveDateTime, Timelike};
use parking_lot::Mutex;
use regex::Regex;

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::formatter::{Formatter, PatternFormatter};
use crate::fs::{self, LogFile};
use crate::level::{AtomicLevel, Level};
use crate::os;
use crate::queue::CircularQueue;
use crate::record::Record;
use crate::sinks::Sink;

/// Renders a base filename plus a date into the concrete path for that day.
pub trait DailyNameScheme: Send + Sync + 'static {
    fn filename(base: &str, date: &NaiveDateTime) -> String;

    /// Whether `candidate` (a bare file name) looks like a dated sibling of
    /// `base`. Used to seed retention from files left by earlier runs;
    /// schemes that cannot tell return `false`.
    fn matches(base: &str, candidate: &str) -> bool {
        let _ = (base, candidate);
        false
    }
}

/// Default scheme: `log.txt` → `log_2026-08-01.txt`.
pub struct DateSuffix;

impl DailyNameScheme for DateSuffix {
    fn filename(base: &str, date: &NaiveDateTime) -> String {
        let (stem, ext) = fs::split_by_extension(base);
        format!("{}_{}{}", stem, date.format("%Y-%m-%d"), ext)
    }

    fn matches(base: &str, candidate: &str) -> bool {
        let (stem, ext) = fs::split_by_extension(base);
        let stem = os::basename(stem);
        let pattern = format!(
            "^{}_\\d{{4}}-\\d{{2}}-\\d{{2}}{}$",
            regex::escape(stem),
            regex::escape(ext)
        );
        Regex::new(&pattern)
            .map(|re| re.is_match(candidate))
            .unwrap_or(false)
    }
}

/// Treats the base name itself as a `strftime` pattern,
/// e.g. `server-%Y%m%d.log`.
pub struct StrftimePath;

impl DailyNameScheme for StrftimePath {
    fn filename(base: &str, date: &NaiveDateTime) -> String {
        date.format(base).to_string()
    }
}

struct DailyInner {
    formatter: Box<dyn Formatter>,
    base: String,
    truncate: bool,
    next_rotation: SystemTime,
    file: LogFile,
    /// Dated files created so far, oldest first; `None` when retention is
    /// disabled.
    recent: Option<CircularQueue<PathBuf>>,
}

/// Opens a fresh file once per day and deletes the oldest dated files beyond
/// `max_days`.
pub struct DailyFileSink<N: DailyNameScheme = DateSuffix> {
    level: AtomicLevel,
    inner: Mutex<DailyInner>,
    _scheme: PhantomData<N>,
}

impl<N: DailyNameScheme> DailyFileSink<N> {
    /// `max_days == 0` disables retention.
    pub fn new(
        path: impl Into<PathBuf>,
        rotation_hour: u32,
        rotation_minute: u32,
        truncate: bool,
        max_days: usize,
    ) -> Result<Self> {
        if rotation_hour > 23 || rotation_minute > 59 {
            return Err(Error::InvalidArgument(
                "daily sink: invalid rotation time".into(),
            ));
        }

        let base = path.into().to_string_lossy().into_owned();
        let now = SystemTime::now();
        let (secs, _) = os::time_parts(now);
        let tm = os::localtime(secs);
        let filename = N::filename(&base, &tm);

        let mut file = LogFile::new();
        file.open(&filename, truncate)?;

        let recent =
            (max_days > 0).then(|| seed_recent::<N>(&base, max_days, Path::new(&filename)));

        Ok(DailyFileSink {
            level: AtomicLevel::new(Level::Trace),
            inner: Mutex::new(DailyInner {
                formatter: Box::new(PatternFormatter::default()),
                base,
                truncate,
                next_rotation: next_rotation_instant(now, rotation_hour, rotation_minute),
                file,
                recent,
            }),
            _scheme: PhantomData,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.inner.lock().file.path().to_path_buf()
    }
}

impl<N: DailyNameScheme> Sink for DailyFileSink<N> {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let mut inner = self.inner.lock();

        if record.time() >= inner.next_rotation {
            rotate::<N>(&mut inner, record.time())?;
        }

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

fn rotate<N: DailyNameScheme>(inner: &mut DailyInner, record_time: SystemTime) -> Result<()> {
    inner.file.flush()?;
    inner.file.close();

    let (secs, _) = os::time_parts(record_time);
    let tm = os::localtime(secs);
    let filename = N::filename(&inner.base, &tm);
    let truncate = inner.truncate;
    inner.file.open(&filename, truncate)?;

    while inner.next_rotation <= record_time {
        inner.next_rotation += std::time::Duration::from_secs(24 * 60 * 60);
    }

    if let Some(recent) = inner.recent.as_mut() {
        remember_file(recent, PathBuf::from(&filename))?;
    }
    Ok(())
}

/// Pushes a freshly opened filename into the retention ring, deleting the
/// file that falls out of it.
fn remember_file(recent: &mut CircularQueue<PathBuf>, filename: PathBuf) -> Result<()> {
    if recent.is_full() {
        if let Some(oldest) = recent.pop_front() {
            if oldest != filename && oldest.exists() {
                std::fs::remove_file(&oldest).map_err(|source| Error::RemoveFile {
                    path: oldest,
                    source,
                })?;
            }
        }
    }
    recent.push_back(filename);
    Ok(())
}

/// Builds the retention ring from dated files left behind by earlier runs,
/// removing the ones that fall outside the retention window. The file just
/// opened counts as the newest entry whatever its date; lexicographic order
/// of the ISO-dated names is chronological for the rest.
fn seed_recent<N: DailyNameScheme>(
    base: &str,
    max_days: usize,
    current: &Path,
) -> CircularQueue<PathBuf> {
    let mut recent = CircularQueue::new(max_days);
    let base_path = PathBuf::from(base);
    let dir = match base_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let matched = match std::fs::read_dir(&dir) {
        Ok(entries) => {
            let mut matched: Vec<PathBuf> = entries
                .flatten()
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| N::matches(base, name))
                })
                .map(|entry| entry.path())
                .filter(|path| path != current)
                .collect();
            matched.sort();
            matched
        }
        Err(_) => Vec::new(),
    };

    let keep = max_days.saturating_sub(1);
    let skip = matched.len().saturating_sub(keep);
    for path in &matched[..skip] {
        let _ = std::fs::remove_file(path);
    }
    for path in matched.into_iter().skip(skip) {
        recent.push_back(path);
    }
    recent.push_back(current.to_path_buf());
    recent
}

/// Next instant at which the local clock reaches `hour:minute`.
fn next_rotation_instant(now: SystemTime, hour: u32, minute: u32) -> SystemTime {
    let (secs, _) = os::time_parts(now);
    let tm = os::localtime(secs);
    let at_rotation = tm
        .with_hour(hour)
        .and_then(|tm| tm.with_minute(minute))
        .and_then(|tm| tm.with_second(0))
        .unwrap_or(tm);
    let candidate = os::from_localtime(at_rotation);
    if candidate > now {
        candidate
    } else {
        candidate + std::time::Duration::from_secs(24 * 60 * 60)
    }
}
