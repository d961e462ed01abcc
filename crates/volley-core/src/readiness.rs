use chrono::{DateTime, Duration, Utc};

// ---------------------------------------------------------------------------
// Readiness gate
// ---------------------------------------------------------------------------

/// Seconds left before the next fire batch may start, rounded up so a
/// sub-second remainder still reads as "not ready". Derived, never
/// stored: a pure function of `now` and the last launch timestamp. Clock
/// skew can make the delta negative; that clamps to ready rather than
/// blocking forever.
pub fn time_left(
    now: DateTime<Utc>,
    last_launch: Option<DateTime<Utc>>,
    cooldown_seconds: u32,
) -> i64 {
    let Some(last) = last_launch else {
        return 0;
    };
    let elapsed = now.signed_duration_since(last);
    let left = Duration::seconds(i64::from(cooldown_seconds)) - elapsed;
    if left <= Duration::zero() {
        return 0;
    }
    // Ceiling division: 2.5s left reports 3, not 2.
    let micros = left.num_microseconds().unwrap_or(i64::MAX);
    micros.saturating_add(999_999) / 1_000_000
}

/// Ready only once the full cooldown has elapsed. Compares durations
/// directly rather than going through the rounded `time_left`.
pub fn is_ready(
    now: DateTime<Utc>,
    last_launch: Option<DateTime<Utc>>,
    cooldown_seconds: u32,
) -> bool {
    let Some(last) = last_launch else {
        return true;
    };
    now.signed_duration_since(last) >= Duration::seconds(i64::from(cooldown_seconds))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn ready_with_no_launch_history() {
        assert!(is_ready(t(0), None, 3));
        assert_eq!(time_left(t(0), None, 3), 0);
    }

    #[test]
    fn counts_down_after_a_launch() {
        let last = Some(t(0));
        assert_eq!(time_left(t(0), last, 3), 3);
        assert_eq!(time_left(t(1), last, 3), 2);
        assert_eq!(time_left(t(2), last, 3), 1);
        assert_eq!(time_left(t(3), last, 3), 0);
        assert!(is_ready(t(3), last, 3));
        assert!(!is_ready(t(1), last, 3));
    }

    #[test]
    fn clock_skew_clamps_to_ready() {
        // Last launch recorded "in the future" relative to now.
        let last = Some(t(60));
        assert!(time_left(t(0), last, 3) >= 0);
        // A 3s cooldown against a launch 60s ahead still has time left.
        assert!(!is_ready(t(58), last, 3));
        // But a negative remainder never goes below zero.
        assert_eq!(time_left(t(120), last, 3), 0);
    }

    #[test]
    fn zero_cooldown_is_always_ready() {
        assert!(is_ready(t(0), Some(t(0)), 0));
    }

    #[test]
    fn subsecond_remainder_still_blocks() {
        let last = Some(t(0));
        let now = t(2) + Duration::milliseconds(500);
        // 2.5s into a 3s cooldown: half a second still to go.
        assert!(!is_ready(now, last, 3));
        assert_eq!(time_left(now, last, 3), 1);
    }

    #[test]
    fn gate_opens_at_the_exact_boundary() {
        let last = Some(t(0));
        let just_before = t(3) - Duration::milliseconds(1);
        assert!(!is_ready(just_before, last, 3));
        assert_eq!(time_left(just_before, last, 3), 1);
        assert!(is_ready(t(3), last, 3));
        assert_eq!(time_left(t(3), last, 3), 0);
    }
}
