//! Timestamp source for created/completed times.

use chrono::{Local, NaiveDateTime};

/// Storage format for every timestamp field, in local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Supplies the current wall-clock time to the store.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    /// The current time rendered in [`TIMESTAMP_FORMAT`].
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[must_use]
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Empty or foreign strings yield `None`.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed() -> FixedClock {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 1))
            .expect("valid date");
        FixedClock(at)
    }

    #[test]
    fn fixed_clock_formats_zero_padded() {
        assert_eq!(fixed().timestamp(), "2024-03-09 07:05:01");
    }

    #[test]
    fn system_clock_output_parses_back() {
        let stamp = SystemClock.timestamp();
        assert_eq!(stamp.len(), 19);
        assert!(parse_timestamp(&stamp).is_some());
    }

    #[test]
    fn parse_rejects_empty_and_iso() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-03-09T07:05:01").is_none());
    }
}
