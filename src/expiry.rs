//! Expiry timestamps and the clock they are compared against.
//!
//! Licensing servers are inconsistent about expiry formats: the REST
//! dialect sends ISO-8601 (with or without offset, sometimes a bare date),
//! KeyAuth sends unix seconds as a string. [`parse_expiry`] accepts all of
//! them and always yields UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    /// Get the current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock for deterministic expiry tests.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone, Copy)]
pub struct MockClock(pub DateTime<Utc>);

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Freeze at the given expiry-style timestamp.
    ///
    /// # Panics
    /// Panics if `s` is not accepted by [`parse_expiry`].
    pub fn at(s: &str) -> Self {
        Self(parse_expiry(s).expect("mock clock timestamp must parse"))
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a server expiry value into UTC.
///
/// Returns `None` for empty or unrecognized input.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = raw.parse().ok()?;
        return Utc.timestamp_opt(secs, 0).single();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offset-less timestamps are UTC on every server we talk to.
    let trimmed = raw.trim_end_matches('Z');
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Render a unix-seconds string as `UTC: dd/mm/YYYY HH:MM:SS`.
pub fn format_unix_timestamp(raw: &str) -> Option<String> {
    let secs: i64 = raw.trim().parse().ok()?;
    let dt = Utc.timestamp_opt(secs, 0).single()?;
    Some(format!("UTC: {}", dt.format("%d/%m/%Y %H:%M:%S")))
}

/// Whole days from `now` until `expiry`, or `None` once it has passed.
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    if expiry < now {
        return None;
    }
    Some((expiry - now).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_system_clock_returns_time() {
        assert!(SystemClock.now_utc().year() >= 2024);
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_expiry("2025-12-31T23:59:59.999Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-31T23:59:59.999+00:00");
    }

    #[test]
    fn test_parse_offset_is_normalized() {
        let dt = parse_expiry("2025-06-01T02:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_naive_timestamp() {
        let dt = parse_expiry("2025-06-01 12:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_bare_date() {
        let dt = parse_expiry("2025-01-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_unix_seconds() {
        let dt = parse_expiry("1735689600").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_expiry("").is_none());
        assert!(parse_expiry("lifetime").is_none());
        assert!(parse_expiry("31/12/2025").is_none());
    }

    #[test]
    fn test_format_unix_timestamp() {
        assert_eq!(
            format_unix_timestamp("1735689600").as_deref(),
            Some("UTC: 01/01/2025 00:00:00")
        );
        assert!(format_unix_timestamp("soon").is_none());
    }

    #[test]
    fn test_days_until() {
        let now = MockClock::at("2025-01-01T00:00:00Z").now_utc();
        let expiry = parse_expiry("2025-01-11T12:00:00Z").unwrap();
        assert_eq!(days_until(expiry, now), Some(10));
        assert_eq!(days_until(now, expiry), None);
    }
}
