//! # Fragment Codecs
//!
//! A [`FragmentCodec`] decides how a [`FieldValue`] becomes the JSON stored
//! at a fragment. Field declarations may name one per field; the store
//! falls back to its own default codec for fields without one, and that
//! default is [`TemporalCodec`] unless the store is built otherwise.
//!
//! Codecs see every write at their node, including whole-region
//! reassignments after a delete, which arrive as [`FieldValue::Json`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CoercionError;
use crate::value::FieldValue;

/// Encoding of write values for one kind of fragment.
pub trait FragmentCodec: Send + Sync {
    /// Name used in logs and `Debug` output.
    fn name(&self) -> &str;

    /// Turn a write value into the JSON to store.
    ///
    /// # Errors
    ///
    /// A [`CoercionError`] when the value has no JSON form under this codec.
    fn encode(&self, value: FieldValue) -> Result<Value, CoercionError>;
}

/// Plain JSON passes through; `chrono` values are encoded with
/// [`crate::temporal`]; floats must be finite.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalCodec;

impl FragmentCodec for TemporalCodec {
    fn name(&self) -> &str {
        "temporal"
    }

    fn encode(&self, value: FieldValue) -> Result<Value, CoercionError> {
        value.into_json()
    }
}

/// Shared handle to a codec. Two handles are equal when they point at the
/// same codec instance.
#[derive(Clone)]
pub struct Codec(Arc<dyn FragmentCodec>);

impl Codec {
    pub fn new(codec: impl FragmentCodec + 'static) -> Self {
        Self(Arc::new(codec))
    }

    /// A handle to [`TemporalCodec`].
    pub fn temporal() -> Self {
        Self::new(TemporalCodec)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Encode through the wrapped codec.
    ///
    /// # Errors
    ///
    /// The codec's [`CoercionError`].
    pub fn encode(&self, value: FieldValue) -> Result<Value, CoercionError> {
        self.0.encode(value)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::temporal()
    }
}

impl From<Arc<dyn FragmentCodec>> for Codec {
    fn from(codec: Arc<dyn FragmentCodec>) -> Self {
        Self(codec)
    }
}

impl PartialEq for Codec {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Codec").field(&self.name()).finish()
    }
}
