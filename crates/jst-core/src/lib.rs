//! # jst-core — Foundational Types for json-schema-toolkit
//!
//! The leaf of the workspace DAG. Defines the vocabulary every other crate
//! speaks when it talks about JSON documents:
//!
//! 1. **`Kind`.** The six JSON Schema primitive types a field can declare.
//!    One enum, exhaustive `match` everywhere.
//!
//! 2. **`Address`.** A path of object keys and array indices identifying a
//!    fragment of a document's value tree. Rendered as a JSON Pointer.
//!
//! 3. **`FieldValue`.** What callers hand to a write. Plain JSON passes
//!    through; `chrono` date, time, date-time and duration values are
//!    encoded into their JSON string forms by [`temporal`].
//!
//! 4. **`FragmentCodec`.** The per-field hook that turns a `FieldValue`
//!    into stored JSON. [`TemporalCodec`] is the default.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jst-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod address;
pub mod codec;
pub mod error;
pub mod kind;
pub mod temporal;
pub mod value;

pub use address::{Address, Segment};
pub use codec::{Codec, FragmentCodec, TemporalCodec};
pub use error::{AddressError, CoercionError};
pub use kind::Kind;
pub use temporal::Temporal;
pub use value::FieldValue;
