//! Expiration timestamps and the clock they are checked against.
//!
//! Timestamps are Unix seconds as `f64`, written in the shortest decimal
//! form that parses back to the same value.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::{EnvelopeError, Result};

/// Source of the current wall-clock time, in seconds since the Unix epoch.
pub trait Clock {
    fn now(&self) -> f64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f64);

impl FixedClock {
    pub fn at(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Freeze the clock at a calendar time.
    pub fn at_datetime(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_micros() as f64 / 1_000_000.0)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Absolute expiration for something created at `now` that lives for `ttl`.
pub fn expires_at(now: f64, ttl: Duration) -> f64 {
    now + ttl.as_secs_f64()
}

/// Render a timestamp the way it is written into an envelope.
///
/// `Display` for `f64` never uses exponent notation and round-trips
/// exactly through [`parse_timestamp`].
pub fn render_timestamp(timestamp: f64) -> String {
    format!("{timestamp}")
}

/// Parse the timestamp text of an envelope.  Must be a finite number.
pub fn parse_timestamp(text: &[u8]) -> Result<f64> {
    let text = std::str::from_utf8(text)
        .map_err(|_| EnvelopeError::InvalidExpiration("timestamp is not ASCII".into()))?;

    let value: f64 = text
        .parse()
        .map_err(|_| EnvelopeError::InvalidExpiration(format!("'{text}' is not a number")))?;

    if !value.is_finite() {
        return Err(EnvelopeError::InvalidExpiration(format!(
            "'{text}' is not a finite number"
        )));
    }

    Ok(value)
}

/// Fail with `Expired` if `now` is strictly past `expires_at`.
pub fn check_not_expired(expires_at: f64, now: f64) -> Result<()> {
    if now > expires_at {
        return Err(EnvelopeError::Expired {
            expired_at: format_timestamp(expires_at),
        });
    }
    Ok(())
}

/// Human-readable RFC 3339 form of a timestamp, falling back to the
/// raw number when it is outside chrono's range.
pub fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1_000_000_000.0).round() as u32;

    DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| render_timestamp(timestamp))
}

/// Parse a relative duration like `90s`, `30m`, `24h` or `7d`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();

    let (num_str, unit_secs) = if let Some(s) = input.strip_suffix('d') {
        (s, 86_400)
    } else if let Some(s) = input.strip_suffix('h') {
        (s, 3_600)
    } else if let Some(s) = input.strip_suffix('m') {
        (s, 60)
    } else if let Some(s) = input.strip_suffix('s') {
        (s, 1)
    } else {
        return Err(EnvelopeError::InvalidDuration(input.to_string()));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| EnvelopeError::InvalidDuration(input.to_string()))?;

    let secs = num
        .checked_mul(unit_secs)
        .ok_or_else(|| EnvelopeError::InvalidDuration(input.to_string()))?;

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_plain_decimal() {
        assert_eq!(render_timestamp(1_626_566_460.0), "1626566460");
        assert_eq!(render_timestamp(0.5), "0.5");
        assert_eq!(render_timestamp(1e21), "1000000000000000000000");
        assert!(!render_timestamp(1e-7).contains('e'));
    }

    #[test]
    fn render_then_parse_is_exact() {
        // Sub-microsecond values must not be rounded on the wire.
        for ts in [
            1_626_566_460.123_456,
            1_626_566_400.123_456_3 + 60.0,
            0.1 + 0.2,
            f64::MIN_POSITIVE,
        ] {
            let parsed = parse_timestamp(render_timestamp(ts).as_bytes()).unwrap();
            assert_eq!(parsed.to_bits(), ts.to_bits(), "{ts}");
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_timestamp(b"").is_err());
        assert!(parse_timestamp(b"12x4").is_err());
        assert!(parse_timestamp(b"inf").is_err());
        assert!(parse_timestamp(b"-inf").is_err());
        assert!(parse_timestamp(b"NaN").is_err());
        assert!(parse_timestamp(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn parse_accepts_integers_and_fractions() {
        assert_eq!(parse_timestamp(b"42").unwrap(), 42.0);
        assert_eq!(parse_timestamp(b"42.25").unwrap(), 42.25);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        assert!(check_not_expired(100.0, 99.0).is_ok());
        assert!(check_not_expired(100.0, 100.0).is_ok());
        assert!(matches!(
            check_not_expired(100.0, 100.5),
            Err(EnvelopeError::Expired { .. })
        ));
    }

    #[test]
    fn expired_error_shows_calendar_date() {
        let err = check_not_expired(1_626_393_600.0, 1_626_566_400.0).unwrap_err();
        assert!(err.to_string().contains("2021-07-16"));
    }

    #[test]
    fn expires_at_adds_ttl() {
        assert_eq!(expires_at(1000.0, Duration::from_secs(60)), 1060.0);
    }

    #[test]
    fn fixed_clock_from_datetime() {
        let at = DateTime::<Utc>::from_timestamp(1_626_566_400, 0).unwrap();
        assert_eq!(FixedClock::at_datetime(at).now(), 1_626_566_400.0);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800.0);
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1_800));
        assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration(" 7d ").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("7x").is_err());
        assert!(parse_duration("d").is_err());
        assert!(parse_duration("-5m").is_err());
        assert!(parse_duration("99999999999999999999d").is_err());
    }
}
