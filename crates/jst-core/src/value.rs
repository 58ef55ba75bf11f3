//! # Write Values
//!
//! [`FieldValue`] is what callers pass to a document or fragment write.
//! Everything JSON-compatible converts into it, and so do the `chrono`
//! temporal types, which the store encodes with [`crate::temporal`] before
//! anything reaches the value tree.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde_json::{Number, Value};

use crate::error::CoercionError;
use crate::temporal;

/// A value on its way into a document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Already JSON.
    Json(Value),
    /// Stored as `YYYY-MM-DDTHH:MM:SSZ`.
    DateTime(DateTime<Utc>),
    /// Stored as `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Stored as `HH:MM:SS`.
    Time(NaiveTime),
    /// Stored as `<days>d <seconds>s <microseconds>us`.
    Duration(TimeDelta),
    /// A float awaiting a finiteness check.
    Float(f64),
}

impl FieldValue {
    /// Encode into the JSON stored in the document.
    ///
    /// # Errors
    ///
    /// Fails for negative or overflowing durations and non-finite floats.
    pub fn into_json(self) -> Result<Value, CoercionError> {
        match self {
            Self::Json(value) => Ok(value),
            Self::DateTime(dt) => Ok(Value::String(temporal::encode_datetime(&dt))),
            Self::Date(date) => Ok(Value::String(temporal::encode_date(&date))),
            Self::Time(time) => Ok(Value::String(temporal::encode_time(&time))),
            Self::Duration(delta) => temporal::encode_duration(&delta).map(Value::String),
            Self::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .ok_or(CoercionError::NonFiniteNumber(f)),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        Self::Json(value.clone())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(time: NaiveTime) -> Self {
        Self::Time(time)
    }
}

impl From<TimeDelta> for FieldValue {
    fn from(delta: TimeDelta) -> Self {
        Self::Duration(delta)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

macro_rules! json_field_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    Self::Json(Value::from(v))
                }
            }
        )*
    };
}

json_field_value!(bool, i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, String, &str);

impl<T: Into<Value>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        Self::Json(value.map_or(Value::Null, Into::into))
    }
}

impl<T: Into<Value>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::Json(Value::Array(items.into_iter().map(Into::into).collect()))
    }
}
