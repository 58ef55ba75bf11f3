//! # Temporal Coercion
//!
//! JSON has no date or time types, so date-time, date, time and duration
//! values are stored as strings. This module defines the one encoding used
//! for each and the matching decoders.
//!
//! | Value | Encoding | Example |
//! |---|---|---|
//! | `DateTime<Utc>` | `YYYY-MM-DDTHH:MM:SSZ` | `2013-05-01T12:30:00Z` |
//! | `NaiveDate` | `YYYY-MM-DD` | `2013-05-01` |
//! | `NaiveTime` | `HH:MM:SS` | `12:30:00` |
//! | `TimeDelta` | `<days>d <seconds>s <microseconds>us` | `3d 7200s 500us` |
//!
//! Date-times are UTC with seconds precision; sub-second components are
//! truncated. Durations are normalized so that seconds stay below one day
//! and microseconds below one second, and must be non-negative.
//!
//! [`Temporal`] ties each type to its decoder so that documents can offer
//! one typed read for all four.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use serde_json::Value;

use crate::error::CoercionError;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

const MICROS_PER_SECOND: i64 = 1_000_000;
const SECONDS_PER_DAY: i64 = 86_400;
const MICROS_PER_DAY: i64 = MICROS_PER_SECOND * SECONDS_PER_DAY;

/// Encode a UTC date-time, truncated to seconds.
pub fn encode_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Decode a `YYYY-MM-DDTHH:MM:SSZ` string.
pub fn decode_datetime(s: &str) -> Result<DateTime<Utc>, CoercionError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| CoercionError::InvalidEncoding {
            expected: "date-time",
            input: s.to_string(),
        })
}

/// Encode a calendar date.
pub fn encode_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Decode a `YYYY-MM-DD` string.
pub fn decode_date(s: &str) -> Result<NaiveDate, CoercionError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| CoercionError::InvalidEncoding {
        expected: "date",
        input: s.to_string(),
    })
}

/// Encode a wall-clock time, truncated to seconds.
pub fn encode_time(time: &NaiveTime) -> String {
    let truncated = time.with_nanosecond(0).unwrap_or(*time);
    truncated.format(TIME_FORMAT).to_string()
}

/// Decode an `HH:MM:SS` or `HH:MM` string.
pub fn decode_time(s: &str) -> Result<NaiveTime, CoercionError> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| CoercionError::InvalidEncoding {
            expected: "time",
            input: s.to_string(),
        })
}

/// Encode a non-negative duration as `<days>d <seconds>s <microseconds>us`.
///
/// # Errors
///
/// Returns [`CoercionError::NegativeDuration`] for negative spans and
/// [`CoercionError::DurationOverflow`] when the span does not fit in
/// microseconds.
pub fn encode_duration(delta: &TimeDelta) -> Result<String, CoercionError> {
    let total = delta
        .num_microseconds()
        .ok_or_else(|| CoercionError::DurationOverflow(delta.to_string()))?;
    if total < 0 {
        return Err(CoercionError::NegativeDuration(delta.to_string()));
    }
    let days = total / MICROS_PER_DAY;
    let seconds = (total % MICROS_PER_DAY) / MICROS_PER_SECOND;
    let micros = total % MICROS_PER_SECOND;
    Ok(format!("{days}d {seconds}s {micros}us"))
}

/// Decode a `<days>d <seconds>s <microseconds>us` string.
///
/// Components need not be normalized: `0d 90000s 0us` decodes to one day
/// and one hour.
pub fn decode_duration(s: &str) -> Result<TimeDelta, CoercionError> {
    let invalid = || CoercionError::InvalidEncoding {
        expected: "duration",
        input: s.to_string(),
    };

    let mut parts = s.split(' ');
    let (Some(d), Some(sec), Some(us), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let component = |part: &str, suffix: &str| -> Result<i64, CoercionError> {
        let digits = part.strip_suffix(suffix).ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.parse::<i64>().map_err(|_| invalid())
    };

    let days = component(d, "d")?;
    let seconds = component(sec, "s")?;
    let micros = component(us, "us")?;

    days.checked_mul(MICROS_PER_DAY)
        .and_then(|total| total.checked_add(seconds.checked_mul(MICROS_PER_SECOND)?))
        .and_then(|total| total.checked_add(micros))
        .map(TimeDelta::microseconds)
        .ok_or_else(|| CoercionError::DurationOverflow(s.to_string()))
}

/// A `chrono` type stored as one of this module's string encodings.
pub trait Temporal: Sized {
    /// Encoding name reported in [`CoercionError::InvalidEncoding`].
    const ENCODING: &'static str;

    /// Decode the string form.
    ///
    /// # Errors
    ///
    /// `InvalidEncoding` or `DurationOverflow`.
    fn decode(s: &str) -> Result<Self, CoercionError>;

    /// Decode a stored JSON value, which must be a string.
    ///
    /// # Errors
    ///
    /// `InvalidEncoding` for non-strings and malformed strings.
    fn from_json(value: &Value) -> Result<Self, CoercionError> {
        match value {
            Value::String(s) => Self::decode(s),
            other => Err(CoercionError::InvalidEncoding {
                expected: Self::ENCODING,
                input: other.to_string(),
            }),
        }
    }
}

impl Temporal for DateTime<Utc> {
    const ENCODING: &'static str = "date-time";

    fn decode(s: &str) -> Result<Self, CoercionError> {
        decode_datetime(s)
    }
}

impl Temporal for NaiveDate {
    const ENCODING: &'static str = "date";

    fn decode(s: &str) -> Result<Self, CoercionError> {
        decode_date(s)
    }
}

impl Temporal for NaiveTime {
    const ENCODING: &'static str = "time";

    fn decode(s: &str) -> Result<Self, CoercionError> {
        decode_time(s)
    }
}

impl Temporal for TimeDelta {
    const ENCODING: &'static str = "duration";

    fn decode(s: &str) -> Result<Self, CoercionError> {
        decode_duration(s)
    }
}
