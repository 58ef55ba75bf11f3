//! # jst-store — Schema-Bound Value Store
//!
//! Owns a document's JSON value and is the only way to change it. Every
//! mutation goes through [`ValueStore::write`], which coerces the incoming
//! [`FieldValue`](jst_core::FieldValue), validates it against the schema
//! node at the target address, assigns it, and bumps the revision.
//!
//! ## Interface
//!
//! [`ValueStore`] is the seam the document layer depends on. Methods take
//! `&self`: a document and all of its fragment proxies hold the same store,
//! so mutation uses interior mutability inside the implementation.
//!
//! ## Reference implementation
//!
//! [`MemoryStore`] keeps the value in a `RefCell` and is therefore
//! single-threaded. It accepts an optional [`Validate`](jst_schema::Validate)
//! hook; without one, writes are assigned unchecked.
//!
//! ## Crate Policy
//!
//! - A rejected write leaves the value and the revision untouched.
//! - Errors from addressing, coercion and validation pass through unchanged.

pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use jst_core::{Address, FieldValue};
use jst_schema::SchemaNode;
use serde_json::Value;

/// Addressed access to a schema-bound JSON value.
pub trait ValueStore {
    /// Root schema of the stored document.
    fn schema(&self) -> &SchemaNode;

    /// Schema of the fragment at `address`.
    ///
    /// `Ok(None)` means the position is unconstrained: an undeclared
    /// property or a tuple position beyond the declared items.
    ///
    /// # Errors
    ///
    /// Fails when `address` steps into a declared scalar, or indexes a
    /// declared object or keys a declared array.
    fn schema_at(&self, address: &Address) -> Result<Option<&SchemaNode>, StoreError>;

    /// Snapshot of the fragment at `address`.
    ///
    /// # Errors
    ///
    /// Fails with an address error when nothing exists there.
    fn value_at(&self, address: &Address) -> Result<Value, StoreError>;

    /// Whether the value at `address` is an object or an array.
    ///
    /// # Errors
    ///
    /// Fails with an address error when nothing exists there.
    fn is_container_at(&self, address: &Address) -> Result<bool, StoreError> {
        self.value_at(address)
            .map(|value| value.is_object() || value.is_array())
    }

    /// Encode `value` with the codec of the schema node at `address` (or
    /// the store's default), validate and assign it, incrementing the
    /// revision exactly once.
    ///
    /// A missing key of an existing object is inserted; index `len` of an
    /// existing array appends.
    ///
    /// # Errors
    ///
    /// Coercion, validation and addressing failures. Nothing is changed on
    /// error.
    fn write(&self, address: &Address, value: FieldValue) -> Result<(), StoreError>;

    /// Check the whole value against the root schema.
    ///
    /// # Errors
    ///
    /// The validator's error, if one is attached and the value violates the
    /// schema.
    fn validate(&self) -> Result<(), StoreError>;

    /// Number of successful writes since construction.
    fn revision(&self) -> u64;

    /// Snapshot of the whole value.
    fn value(&self) -> Value {
        self.value_at(&Address::root()).unwrap_or(Value::Null)
    }
}
