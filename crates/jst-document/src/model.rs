//! # Document Model
//!
//! A [`Document`] binds one JSON value to a [`DocumentDefinition`] through a
//! [`ValueStore`]. Fields are accessed by name:
//!
//! - [`read`](Document::read) returns a [`FragmentProxy`] for object and
//!   array fields and the stored value for everything else.
//! - [`write`](Document::write) performs exactly one addressed store write,
//!   validated against the field's schema.
//! - [`delete`](Document::delete) removes the key from a snapshot of the
//!   whole value and reassigns it, so the store records one revision.
//!
//! Names that are not registered fields fail with
//! [`DocumentError::UnknownField`]. Methods of a Rust document type that are
//! not fields are ordinary Rust items and never go through this lookup.
//!
//! ## Sharing
//!
//! The store sits behind `Rc`: proxies returned by `read` share it with the
//! document, and writes through either are visible to both. A document is
//! neither `Send` nor `Sync`.

use std::rc::Rc;
use std::sync::Arc;

use jst_core::{Address, FieldValue, Segment, Temporal};
use jst_schema::{SchemaNode, SchemaValidator};
use jst_store::{MemoryStore, ValueStore};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::definition::{DocumentDefinition, FieldRegistry};
use crate::error::DocumentError;
use crate::proxy::{decode, decode_temporal, remove_entry, Entry, FragmentProxy};

/// A live document of some registered type.
#[derive(Debug)]
pub struct Document<S: ValueStore = MemoryStore> {
    definition: Arc<DocumentDefinition>,
    store: Rc<S>,
}

impl Document<MemoryStore> {
    /// Bind `value` to `definition` in a fresh unvalidated store.
    pub fn open(definition: Arc<DocumentDefinition>, value: Value) -> Self {
        let store = MemoryStore::new(value, Arc::clone(definition.schema()));
        Self::with_store(definition, store)
    }

    /// Bind `value` to `definition` in a store that validates the initial
    /// value and every write with [`SchemaValidator`].
    ///
    /// # Errors
    ///
    /// The validation error if `value` does not conform to the root schema.
    pub fn open_validated(
        definition: Arc<DocumentDefinition>,
        value: Value,
    ) -> Result<Self, DocumentError> {
        let store = MemoryStore::validated(
            value,
            Arc::clone(definition.schema()),
            SchemaValidator::new(),
        )?;
        Ok(Self::with_store(definition, store))
    }

    /// Consume the document, returning its value.
    ///
    /// Proxies still alive keep the store shared; the value is copied out
    /// in that case.
    pub fn into_value(self) -> Value {
        match Rc::try_unwrap(self.store) {
            Ok(store) => store.into_value(),
            Err(shared) => shared.value(),
        }
    }
}

impl<S: ValueStore> Document<S> {
    /// Bind `definition` to an existing store. The store's schema is
    /// expected to be the definition's root schema.
    pub fn with_store(definition: Arc<DocumentDefinition>, store: S) -> Self {
        Self {
            definition,
            store: Rc::new(store),
        }
    }

    /// Read a field.
    ///
    /// # Errors
    ///
    /// `UnknownField` for unregistered names; store errors (e.g. the field
    /// is absent from the value) unchanged.
    pub fn read(&self, name: &str) -> Result<Entry<S>, DocumentError> {
        self.definition.field(name)?;
        Entry::resolve(&self.store, Address::root().child(name))
    }

    /// Write a field through the store.
    ///
    /// # Errors
    ///
    /// `UnknownField` for unregistered names; coercion, validation and
    /// address errors from the store unchanged.
    pub fn write(&self, name: &str, value: impl Into<FieldValue>) -> Result<(), DocumentError> {
        self.definition.field(name)?;
        self.store
            .write(&Address::root().child(name), value.into())
            .map_err(Into::into)
    }

    /// Remove a field from the value by reassigning the whole document.
    ///
    /// # Errors
    ///
    /// `UnknownField` for unregistered names, `MissingKey` if the field is
    /// not present, and validation errors if the root schema requires it.
    pub fn delete(&self, name: &str) -> Result<(), DocumentError> {
        self.definition.field(name)?;
        remove_entry(self.store.as_ref(), &Address::root(), &Segment::from(name))
    }

    /// Alias of [`read`](Self::read).
    pub fn get(&self, name: &str) -> Result<Entry<S>, DocumentError> {
        self.read(name)
    }

    /// Alias of [`write`](Self::write).
    pub fn set(&self, name: &str, value: impl Into<FieldValue>) -> Result<(), DocumentError> {
        self.write(name, value)
    }

    /// Alias of [`delete`](Self::delete).
    pub fn remove(&self, name: &str) -> Result<(), DocumentError> {
        self.delete(name)
    }

    /// Read a field and deserialize it.
    ///
    /// # Errors
    ///
    /// As [`read`](Self::read), plus `Decode` if the value does not
    /// deserialize into `T`.
    pub fn read_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, DocumentError> {
        self.definition.field(name)?;
        let address = Address::root().child(name);
        decode(&address, self.store.value_at(&address)?)
    }

    /// Read a field holding a date, time, date-time or duration.
    ///
    /// # Errors
    ///
    /// As [`read`](Self::read), plus `Decode` if the stored string is not in
    /// `T`'s encoding.
    pub fn read_temporal<T: Temporal>(&self, name: &str) -> Result<T, DocumentError> {
        self.definition.field(name)?;
        let address = Address::root().child(name);
        decode_temporal(&address, &self.store.value_at(&address)?)
    }

    /// Snapshot of the whole value.
    pub fn value(&self) -> Value {
        self.store.value()
    }

    /// Root schema.
    pub fn schema(&self) -> &SchemaNode {
        self.store.schema()
    }

    pub fn definition(&self) -> &Arc<DocumentDefinition> {
        &self.definition
    }

    pub fn fields(&self) -> &FieldRegistry {
        self.definition.fields()
    }

    /// Store revision; increases by one per successful write or delete.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Re-check the whole value against the root schema.
    ///
    /// # Errors
    ///
    /// The store's validation error; always `Ok` for unvalidated stores.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.store.validate().map_err(Into::into)
    }

    /// A proxy over the whole document value.
    pub fn root(&self) -> FragmentProxy<S> {
        FragmentProxy::new(Rc::clone(&self.store), Address::root())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
