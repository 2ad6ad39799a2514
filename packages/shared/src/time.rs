//! Time utilities.
//!
//! Internal timestamps are Unix milliseconds; the wire carries
//! RFC 3339 strings.

use chrono::{DateTime, Utc};

/// Get the current Unix timestamp in milliseconds (UTC).
pub fn now_unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix-millisecond timestamp as an RFC 3339 string.
///
/// Out-of-range values fall back to the epoch rather than panicking;
/// they can only come from a corrupted timestamp, not from `now_unix_millis`.
pub fn unix_millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_unix_millis_is_positive() {
        // given (前提条件): the system clock is past the epoch
        // when (操作):
        let now = now_unix_millis();

        // then (期待する結果):
        assert!(now > 0);
    }

    #[test]
    fn test_unix_millis_to_rfc3339_known_value() {
        // given (前提条件): a fixed timestamp
        let millis = 1_672_498_800_000i64; // 2022-12-31T15:00:00Z

        // when (操作):
        let formatted = unix_millis_to_rfc3339(millis);

        // then (期待する結果):
        assert_eq!(formatted, "2022-12-31T15:00:00+00:00");
    }

    #[test]
    fn test_unix_millis_to_rfc3339_out_of_range_falls_back() {
        // given (前提条件): a timestamp outside the representable range
        let millis = i64::MAX;

        // when (操作):
        let formatted = unix_millis_to_rfc3339(millis);

        // then (期待する結果): epoch fallback instead of a panic
        assert_eq!(formatted, "1970-01-01T00:00:00+00:00");
    }
}
