//! # Error Types
//!
//! Errors raised while addressing fragments of a value tree and while
//! coercing typed values into JSON. Both are surfaced unchanged by the
//! store and the document layer.

use thiserror::Error;

use crate::address::Address;

/// Navigation to a non-existent or type-mismatched fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The object at `address` has no entry named `key`.
    #[error("no key '{key}' in object at '{address}'")]
    NoSuchKey {
        /// Address of the object that was searched.
        address: Address,
        /// The missing key.
        key: String,
    },

    /// The array at `address` is shorter than `index + 1`.
    #[error("index {index} out of range for array of length {len} at '{address}'")]
    IndexOutOfRange {
        /// Address of the array.
        address: Address,
        /// Requested index.
        index: usize,
        /// Actual array length.
        len: usize,
    },

    /// A key or index was applied to a scalar value.
    #[error("value at '{address}' is a {found}, not an object or array")]
    NotAContainer {
        /// Address of the scalar.
        address: Address,
        /// JSON type name of the scalar.
        found: &'static str,
    },

    /// A string key was applied to an array.
    #[error("cannot address array at '{address}' by key '{key}'")]
    KeyOnArray {
        /// Address of the array.
        address: Address,
        /// Offending key.
        key: String,
    },

    /// A numeric index was applied to an object.
    #[error("cannot address object at '{address}' by index {index}")]
    IndexOnObject {
        /// Address of the object.
        address: Address,
        /// Offending index.
        index: usize,
    },
}

/// A typed value could not be encoded into JSON.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// Durations are encoded as `<days>d <seconds>s <microseconds>us`,
    /// which has no representation for negative spans.
    #[error("negative duration cannot be encoded: {0}")]
    NegativeDuration(String),

    /// The duration exceeds microsecond precision range.
    #[error("duration overflows microsecond precision: {0}")]
    DurationOverflow(String),

    /// Non-finite floats have no JSON representation.
    #[error("non-finite number cannot be encoded as JSON: {0}")]
    NonFiniteNumber(f64),

    /// A string did not match the expected temporal encoding.
    #[error("invalid {expected} encoding: {input:?}")]
    InvalidEncoding {
        /// Name of the expected encoding (e.g. `"date-time"`).
        expected: &'static str,
        /// The rejected input.
        input: String,
    },
}
