use crate::error::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

/// Timestamp format of the sensor log, second granularity.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Field separator of the sensor log line format
/// `TIMESTAMP - SOURCE - LEVEL - MESSAGE`.
const SEPARATOR: &str = " - ";

// ---------------------------------------------------------------------------
// EventEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub level: String,
    pub message: String,
}

/// Parse one sensor log line. Returns `None` for malformed lines: fewer
/// than 4 delimited fields or an unparsable timestamp. The message field
/// may itself contain the separator; only the first three splits count.
pub fn parse_line(line: &str) -> Option<EventEntry> {
    let mut parts = line.splitn(4, SEPARATOR);
    let raw_ts = parts.next()?;
    let source = parts.next()?;
    let level = parts.next()?;
    let message = parts.next()?;

    let naive = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT).ok()?;
    Some(EventEntry {
        timestamp: naive.and_utc(),
        source: source.to_string(),
        level: level.to_string(),
        message: message.to_string(),
    })
}

/// Append one event line to the sensor log — the writer side used by the
/// sensor daemon and the debug injector. The console never calls this.
pub fn append_event(
    path: &Path,
    source: &str,
    level: &str,
    message: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let line = format!(
        "{} - {} - {} - {}",
        now.format(TIMESTAMP_FORMAT),
        source,
        level,
        message
    );
    crate::io::append_line(path, &line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
