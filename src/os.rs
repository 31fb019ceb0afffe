//! Small OS facade: thread ids, time conversion, path basename.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Process-unique id of the calling thread.
///
/// Ids are small integers handed out in first-use order; they are stable for
/// the lifetime of the thread.
pub(crate) fn thread_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static TID: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    TID.with(|tid| *tid)
}

/// Final component of a `/`-separated path string.
pub(crate) fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Splits a timestamp into whole seconds since the epoch and the
/// sub-second nanoseconds. Times before the epoch clamp to zero.
pub(crate) fn time_parts(time: SystemTime) -> (i64, u32) {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => (duration.as_secs() as i64, duration.subsec_nanos()),
        Err(_) => (0, 0),
    }
}

/// Local broken-down time for the given epoch second.
pub(crate) fn localtime(secs: i64) -> NaiveDateTime {
    match Local.timestamp_opt(secs, 0) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => dt.naive_local(),
        chrono::LocalResult::None => NaiveDateTime::MIN,
    }
}

/// Converts a local broken-down time back to a system timestamp.
///
/// Nonexistent local times (DST gaps) resolve to the earliest valid instant
/// at or after the requested time.
pub(crate) fn from_localtime(naive: NaiveDateTime) -> SystemTime {
    let resolved: DateTime<Local> = match Local.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => Local
            .from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest()
            .unwrap_or_else(Local::now),
    };
    SystemTime::from(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_ids_are_distinct() {
        let here = thread_id();
        assert_eq!(here, thread_id());
        let there = std::thread::spawn(thread_id).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn basename_strips_directories() {
        assert_eq!(basename("a/b/c.rs"), "c.rs");
        assert_eq!(basename("c.rs"), "c.rs");
        assert_eq!(basename("a/"), "");
    }

    #[test]
    fn localtime_round_trip() {
        let now = SystemTime::now();
        let (secs, _) = time_parts(now);
        let naive = localtime(secs);
        let back = from_localtime(naive);
        let (back_secs, _) = time_parts(back);
        assert_eq!(secs, back_secs);
    }
}
