//! # Fragment Proxy
//!
//! A [`FragmentProxy`] is a view over one object or array region of a
//! document. It holds the shared store and an address, nothing else: every
//! call goes to the store, and every container read builds a fresh proxy.
//!
//! Whether a child comes back as a proxy or as a plain value is decided by
//! its schema. Declared objects and arrays become proxies; scalars and
//! unconstrained positions (undeclared properties, tuple positions past
//! the declared items) are returned as values. A nullable container that
//! currently holds `null` is returned as the value `null`.

use std::fmt;
use std::rc::Rc;

use jst_core::kind::json_type_name;
use jst_core::{Address, AddressError, FieldValue, Segment, Temporal};
use jst_schema::SchemaNode;
use jst_store::{MemoryStore, ValueStore};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DocumentError;

/// Result of reading a field or a fragment key.
#[derive(Debug)]
pub enum Entry<S: ValueStore = MemoryStore> {
    /// A scalar, or an unconstrained value.
    Value(Value),
    /// An object or array region.
    Fragment(FragmentProxy<S>),
}

impl<S: ValueStore> Entry<S> {
    pub(crate) fn resolve(store: &Rc<S>, address: Address) -> Result<Self, DocumentError> {
        let declared_container = store
            .schema_at(&address)?
            .is_some_and(|node| node.kind().is_container());
        if declared_container && store.is_container_at(&address)? {
            tracing::trace!(address = %address, "fragment");
            Ok(Self::Fragment(FragmentProxy::new(Rc::clone(store), address)))
        } else {
            Ok(Self::Value(store.value_at(&address)?))
        }
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, Self::Fragment(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Fragment(_) => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&FragmentProxy<S>> {
        match self {
            Self::Fragment(proxy) => Some(proxy),
            Self::Value(_) => None,
        }
    }

    pub fn into_fragment(self) -> Option<FragmentProxy<S>> {
        match self {
            Self::Fragment(proxy) => Some(proxy),
            Self::Value(_) => None,
        }
    }

    /// The plain value, snapshotting the region for fragments.
    ///
    /// # Errors
    ///
    /// Store errors from snapshotting a fragment.
    pub fn into_value(self) -> Result<Value, DocumentError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Fragment(proxy) => proxy.value(),
        }
    }
}

/// View over one object or array region of a document.
pub struct FragmentProxy<S: ValueStore = MemoryStore> {
    store: Rc<S>,
    address: Address,
}

impl<S: ValueStore> FragmentProxy<S> {
    pub(crate) fn new(store: Rc<S>, address: Address) -> Self {
        Self { store, address }
    }

    /// Address of the wrapped region.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Schema of the wrapped region; `None` if unconstrained.
    ///
    /// # Errors
    ///
    /// Address errors from the store.
    pub fn schema(&self) -> Result<Option<&SchemaNode>, DocumentError> {
        Ok(self.store.schema_at(&self.address)?)
    }

    /// Read the child at `key`.
    ///
    /// # Errors
    ///
    /// Address errors from the store (missing key, index out of range,
    /// key applied to an array and so on).
    pub fn get(&self, key: impl Into<Segment>) -> Result<Entry<S>, DocumentError> {
        let address = self.address.child(key);
        tracing::trace!(address = %address, "proxy get");
        Entry::resolve(&self.store, address)
    }

    /// Read the array element at `index`.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get).
    pub fn at(&self, index: usize) -> Result<Entry<S>, DocumentError> {
        self.get(index)
    }

    /// Read the child at `key` and deserialize it.
    ///
    /// # Errors
    ///
    /// Store errors, or `Decode` if the value does not deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: impl Into<Segment>) -> Result<T, DocumentError> {
        let address = self.address.child(key);
        decode(&address, self.store.value_at(&address)?)
    }

    /// Read the child at `key` as a date, time, date-time or duration.
    ///
    /// # Errors
    ///
    /// Store errors, or `Decode` if the value is not in `T`'s encoding.
    pub fn get_temporal<T: Temporal>(&self, key: impl Into<Segment>) -> Result<T, DocumentError> {
        let address = self.address.child(key);
        decode_temporal(&address, &self.store.value_at(&address)?)
    }

    /// Write the child at `key` through the store.
    ///
    /// # Errors
    ///
    /// Coercion, validation and address errors from the store.
    pub fn set(
        &self,
        key: impl Into<Segment>,
        value: impl Into<FieldValue>,
    ) -> Result<(), DocumentError> {
        let address = self.address.child(key);
        Ok(self.store.write(&address, value.into())?)
    }

    /// Remove the child at `key` by reassigning this region.
    ///
    /// # Errors
    ///
    /// `MissingKey` if absent; validation errors if the region's schema
    /// rejects the result.
    pub fn delete(&self, key: impl Into<Segment>) -> Result<(), DocumentError> {
        remove_entry(self.store.as_ref(), &self.address, &key.into())
    }

    /// Append to the wrapped array.
    ///
    /// # Errors
    ///
    /// Address errors if the region is not an array; validation errors
    /// against the item schema of the new position, if declared.
    pub fn push(&self, value: impl Into<FieldValue>) -> Result<(), DocumentError> {
        let len = self.len()?;
        self.set(len, value)
    }

    /// Snapshot of the wrapped region.
    ///
    /// # Errors
    ///
    /// Address errors if the region no longer exists.
    pub fn value(&self) -> Result<Value, DocumentError> {
        Ok(self.store.value_at(&self.address)?)
    }

    /// Number of members or elements.
    ///
    /// # Errors
    ///
    /// Address errors if the region no longer exists or is not a container.
    pub fn len(&self) -> Result<usize, DocumentError> {
        match self.value()? {
            Value::Object(map) => Ok(map.len()),
            Value::Array(items) => Ok(items.len()),
            other => Err(self.not_a_container(&other)),
        }
    }

    /// # Errors
    ///
    /// As [`len`](Self::len).
    pub fn is_empty(&self) -> Result<bool, DocumentError> {
        Ok(self.len()? == 0)
    }

    /// Member names or element indices, in storage order.
    ///
    /// # Errors
    ///
    /// As [`len`](Self::len).
    pub fn keys(&self) -> Result<Vec<Segment>, DocumentError> {
        match self.value()? {
            Value::Object(map) => Ok(map.into_iter().map(|(k, _)| Segment::Key(k)).collect()),
            Value::Array(items) => Ok((0..items.len()).map(Segment::Index).collect()),
            other => Err(self.not_a_container(&other)),
        }
    }

    fn not_a_container(&self, value: &Value) -> DocumentError {
        AddressError::NotAContainer {
            address: self.address.clone(),
            found: json_type_name(value),
        }
        .into()
    }
}

impl<S: ValueStore> Clone for FragmentProxy<S> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.store), self.address.clone())
    }
}

impl<S: ValueStore> fmt::Debug for FragmentProxy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentProxy")
            .field("address", &self.address.to_string())
            .finish_non_exhaustive()
    }
}

/// Remove `segment` from a snapshot of `region` and write the snapshot
/// back as one store write.
pub(crate) fn remove_entry<S: ValueStore + ?Sized>(
    store: &S,
    region: &Address,
    segment: &Segment,
) -> Result<(), DocumentError> {
    let mut snapshot = store.value_at(region)?;
    let missing = || DocumentError::MissingKey {
        address: region.clone(),
        key: segment.to_string(),
    };
    match (&mut snapshot, segment) {
        (Value::Object(map), Segment::Key(key)) => {
            if map.remove(key).is_none() {
                return Err(missing());
            }
        }
        (Value::Array(items), Segment::Index(index)) => {
            if *index >= items.len() {
                return Err(missing());
            }
            items.remove(*index);
        }
        (Value::Object(_), Segment::Index(index)) => {
            return Err(AddressError::IndexOnObject {
                address: region.clone(),
                index: *index,
            }
            .into())
        }
        (Value::Array(_), Segment::Key(key)) => {
            return Err(AddressError::KeyOnArray {
                address: region.clone(),
                key: key.clone(),
            }
            .into())
        }
        (other, _) => {
            return Err(AddressError::NotAContainer {
                address: region.clone(),
                found: json_type_name(other),
            }
            .into())
        }
    }
    tracing::trace!(region = %region, removed = %segment, "reassigning region");
    store.write(region, FieldValue::Json(snapshot))?;
    Ok(())
}

pub(crate) fn decode<T: DeserializeOwned>(address: &Address, value: Value) -> Result<T, DocumentError> {
    serde_json::from_value(value).map_err(|e| DocumentError::Decode {
        address: address.clone(),
        reason: e.to_string(),
    })
}

pub(crate) fn decode_temporal<T: Temporal>(
    address: &Address,
    value: &Value,
) -> Result<T, DocumentError> {
    T::from_json(value).map_err(|e| DocumentError::Decode {
        address: address.clone(),
        reason: e.to_string(),
    })
}
