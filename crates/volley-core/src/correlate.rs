use crate::error::Result;
use crate::eventlog;
use crate::types::TargetId;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// TargetDescriptor
// ---------------------------------------------------------------------------

/// What the correlator knows about a candidate target: its id and the exact
/// textual prefix the sensor daemon logs when it is hit.
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    pub id: TargetId,
    pub signature: String,
}

// ---------------------------------------------------------------------------
// Correlator
// ---------------------------------------------------------------------------

/// Matches actuations to sensor events by recency. The sensor log carries
/// no correlation id, only free-text lines, so an event counts if it was
/// appended within `recent_window` of read time and its message starts with
/// a candidate's signature.
#[derive(Debug, Clone)]
pub struct Correlator {
    pub log_path: PathBuf,
    /// Grace period before reading, letting the sensor daemon flush.
    pub settle: std::time::Duration,
    pub recent_window: Duration,
}

impl Correlator {
    pub fn new(log_path: PathBuf, settle_seconds: u32, recent_window_seconds: u32) -> Self {
        Self {
            log_path,
            settle: std::time::Duration::from_secs(u64::from(settle_seconds)),
            recent_window: Duration::seconds(i64::from(recent_window_seconds)),
        }
    }

    /// Wait out the settle delay, then scan the log for recent matches.
    /// A missing log file yields the empty set: "no crash detected" is a
    /// normal outcome, not an error.
    pub fn correlate(&self, candidates: &[TargetDescriptor]) -> Result<BTreeSet<TargetId>> {
        std::thread::sleep(self.settle);
        let content = match std::fs::read_to_string(&self.log_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(self.scan(Utc::now(), &content, candidates))
    }

    /// Pure matching step over the full log content. Malformed lines are
    /// skipped at debug level, never fatal.
    pub fn scan(
        &self,
        now: DateTime<Utc>,
        content: &str,
        candidates: &[TargetDescriptor],
    ) -> BTreeSet<TargetId> {
        let mut matched = BTreeSet::new();
        for line in content.lines() {
            if line.is_empty() {
                continue;
            }
            let Some(entry) = eventlog::parse_line(line) else {
                tracing::debug!(line, "skipping malformed sensor log line");
                continue;
            };
            if !self.is_recent(now, entry.timestamp) {
                continue;
            }
            for candidate in candidates {
                if entry.message.starts_with(&candidate.signature) {
                    tracing::info!(target_id = candidate.id.0, "detected crash");
                    matched.insert(candidate.id);
                }
            }
        }
        matched
    }

    /// An event is relevant if it happened within `[now - window, now]`.
    /// Events timestamped ahead of `now` (skewed sensor clock) are ignored.
    fn is_recent(&self, now: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(at);
        age >= Duration::zero() && age <= self.recent_window
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
