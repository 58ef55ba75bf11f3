//! # In-Memory Store
//!
//! [`MemoryStore`] holds the document value in a `RefCell` and the revision
//! counter in a `Cell`. Neither is `Sync`, so a store (and every document
//! or proxy sharing it) stays on one thread.
//!
//! Writes are encoded by the codec declared on the target node, or by the
//! store's default codec ([`TemporalCodec`](jst_core::TemporalCodec) unless
//! replaced with [`MemoryStore::with_codec`]).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;

use jst_core::kind::json_type_name;
use jst_core::{Address, AddressError, Codec, FieldValue, Kind, Segment};
use jst_schema::{SchemaNode, Validate};
use serde_json::Value;

use crate::error::StoreError;
use crate::ValueStore;

/// Single-threaded value store over an owned JSON value.
pub struct MemoryStore {
    value: RefCell<Value>,
    revision: Cell<u64>,
    schema: Arc<SchemaNode>,
    validator: Option<Box<dyn Validate>>,
    codec: Codec,
}

impl MemoryStore {
    /// Bind `value` to `schema` without validation.
    pub fn new(value: Value, schema: Arc<SchemaNode>) -> Self {
        Self {
            value: RefCell::new(value),
            revision: Cell::new(0),
            schema,
            validator: None,
            codec: Codec::default(),
        }
    }

    /// Bind `value` to `schema`, checking it against the root schema first.
    /// Subsequent writes are validated with the same validator.
    ///
    /// # Errors
    ///
    /// Returns the validator's error if `value` does not conform.
    pub fn validated(
        value: Value,
        schema: Arc<SchemaNode>,
        validator: impl Validate + 'static,
    ) -> Result<Self, StoreError> {
        validator.validate(&schema, &value)?;
        Ok(Self {
            value: RefCell::new(value),
            revision: Cell::new(0),
            schema,
            validator: Some(Box::new(validator)),
            codec: Codec::default(),
        })
    }

    /// Replace the default codec used for nodes that declare none.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// The default codec.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Whether writes are validated.
    pub fn is_validated(&self) -> bool {
        self.validator.is_some()
    }

    /// Consume the store, returning the value.
    pub fn into_value(self) -> Value {
        self.value.into_inner()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("value", &self.value.borrow())
            .field("revision", &self.revision.get())
            .field("validated", &self.is_validated())
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl ValueStore for MemoryStore {
    fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    fn schema_at(&self, address: &Address) -> Result<Option<&SchemaNode>, StoreError> {
        let mut node: &SchemaNode = &self.schema;
        for (depth, segment) in address.segments().iter().enumerate() {
            let reached = || address.segments()[..depth].iter().cloned().collect::<Address>();
            let child = match (node.kind(), segment) {
                (Kind::Object, Segment::Key(_)) | (Kind::Array, Segment::Index(_)) => {
                    node.child(segment)
                }
                (Kind::Object, Segment::Index(index)) => {
                    return Err(AddressError::IndexOnObject {
                        address: reached(),
                        index: *index,
                    }
                    .into())
                }
                (Kind::Array, Segment::Key(key)) => {
                    return Err(AddressError::KeyOnArray {
                        address: reached(),
                        key: key.clone(),
                    }
                    .into())
                }
                (kind, _) => {
                    return Err(AddressError::NotAContainer {
                        address: reached(),
                        found: kind.as_str(),
                    }
                    .into())
                }
            };
            match child {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    fn value_at(&self, address: &Address) -> Result<Value, StoreError> {
        let root = self.value.borrow();
        Ok(address.resolve(&root)?.clone())
    }

    fn is_container_at(&self, address: &Address) -> Result<bool, StoreError> {
        let root = self.value.borrow();
        let value = address.resolve(&root)?;
        Ok(value.is_object() || value.is_array())
    }

    fn write(&self, address: &Address, value: FieldValue) -> Result<(), StoreError> {
        // Unvalidated stores may hold values that disagree with the schema's
        // shape; there a schema lookup failure only means "no codec".
        let node = match self.schema_at(address) {
            Ok(node) => node,
            Err(err) if self.validator.is_some() => return Err(err),
            Err(_) => None,
        };
        let codec = node.and_then(|node| node.codec.as_ref()).unwrap_or(&self.codec);
        let value = codec.encode(value)?;

        if let (Some(validator), Some(node)) = (&self.validator, node) {
            validator
                .validate(node, &value)
                .map_err(|e| e.at(address))?;
        }

        {
            let mut root = self.value.borrow_mut();
            match address.split_last() {
                None => *root = value,
                Some((parent, last)) => {
                    assign(address, parent.resolve_mut(&mut root)?, last, value)?;
                }
            }
        }

        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        tracing::debug!(address = %address, revision, codec = codec.name(), "store write");
        Ok(())
    }

    fn validate(&self) -> Result<(), StoreError> {
        match &self.validator {
            Some(validator) => Ok(validator.validate(&self.schema, &self.value.borrow())?),
            None => Ok(()),
        }
    }

    fn revision(&self) -> u64 {
        self.revision.get()
    }
}

/// Put `value` under `last` in `container`, inserting new object keys and
/// appending at index `len`.
fn assign(
    address: &Address,
    container: &mut Value,
    last: &Segment,
    value: Value,
) -> Result<(), AddressError> {
    let parent = || {
        address
            .split_last()
            .map(|(parent, _)| parent)
            .unwrap_or_default()
    };
    match (container, last) {
        (Value::Object(map), Segment::Key(key)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (Value::Array(items), Segment::Index(index)) => {
            let len = items.len();
            if *index < len {
                items[*index] = value;
                Ok(())
            } else if *index == len {
                items.push(value);
                Ok(())
            } else {
                Err(AddressError::IndexOutOfRange {
                    address: parent(),
                    index: *index,
                    len,
                })
            }
        }
        (Value::Object(_), Segment::Index(index)) => Err(AddressError::IndexOnObject {
            address: parent(),
            index: *index,
        }),
        (Value::Array(_), Segment::Key(key)) => Err(AddressError::KeyOnArray {
            address: parent(),
            key: key.clone(),
        }),
        (scalar, _) => Err(AddressError::NotAContainer {
            address: parent(),
            found: json_type_name(scalar),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use jst_core::{CoercionError, FragmentCodec};
    use jst_schema::{emit_document, DocumentMeta, FieldDeclaration, SchemaValidator};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn history_schema() -> Arc<SchemaNode> {
        let event = FieldDeclaration::object([
            ("title", FieldDeclaration::string()),
            ("importance", FieldDeclaration::integer().with_minimum(0)),
            ("when", FieldDeclaration::datetime().with_optional(true)),
        ]);
        let mut fields = BTreeMap::new();
        fields.insert("events".to_string(), Arc::new(FieldDeclaration::list([event])));
        fields.insert(
            "note".to_string(),
            Arc::new(FieldDeclaration::string().with_optional(true)),
        );
        Arc::new(emit_document(&DocumentMeta::new("history"), &fields))
    }

    fn history() -> Value {
        json!({"events": [{"title": "Sinking of Atlantis", "importance": 1}]})
    }

    fn validated_store() -> MemoryStore {
        MemoryStore::validated(history(), history_schema(), SchemaValidator::new()).unwrap()
    }

    fn addr(path: &[&str]) -> Address {
        path.iter()
            .map(|s| match s.parse::<usize>() {
                Ok(i) => Segment::Index(i),
                Err(_) => Segment::Key((*s).to_string()),
            })
            .collect()
    }

    #[test]
    fn value_at_snapshots_fragment() {
        let store = validated_store();
        assert_eq!(
            store.value_at(&addr(&["events", "0", "title"])).unwrap(),
            json!("Sinking of Atlantis")
        );
        assert_eq!(store.value(), history());
    }

    #[test]
    fn write_replaces_and_bumps_revision_once() {
        let store = validated_store();
        store
            .write(&addr(&["events", "0", "importance"]), FieldValue::from(7))
            .unwrap();
        assert_eq!(store.revision(), 1);
        assert_eq!(store.value()["events"][0]["importance"], json!(7));
    }

    #[test]
    fn write_inserts_missing_key_and_appends_index() {
        let store = validated_store();
        store.write(&addr(&["note"]), "lost".into()).unwrap();
        store
            .write(
                &addr(&["events", "1"]),
                json!({"title": "Discovery of Atlantis", "importance": 3}).into(),
            )
            .unwrap();
        assert_eq!(store.revision(), 2);
        assert_eq!(store.value()["note"], json!("lost"));
        assert_eq!(store.value()["events"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn write_past_end_is_address_error() {
        let store = validated_store();
        let err = store.write(&addr(&["events", "5"]), json!("x").into()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Address(AddressError::IndexOutOfRange { index: 5, len: 1, .. })
        ));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn rejected_write_changes_nothing() {
        let store = validated_store();
        let err = store
            .write(&addr(&["events", "0", "importance"]), FieldValue::from(-1))
            .unwrap_err();
        let violations = err.violations().unwrap();
        assert_eq!(violations.violations()[0].instance_path, "/events/0/importance");
        assert_eq!(store.revision(), 0);
        assert_eq!(store.value(), history());
    }

    #[test]
    fn wrong_type_rejected_at_field_schema() {
        let store = validated_store();
        let err = store
            .write(&addr(&["events", "0", "title"]), FieldValue::from(3))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn unvalidated_store_accepts_anything_addressable() {
        let store = MemoryStore::new(history(), history_schema());
        store
            .write(&addr(&["events", "0", "importance"]), "very".into())
            .unwrap();
        assert_eq!(store.value()["events"][0]["importance"], json!("very"));
        assert!(store.validate().is_ok());
    }

    #[test]
    fn datetime_stored_as_string() {
        let store = validated_store();
        let when = Utc.with_ymd_and_hms(2013, 5, 1, 8, 0, 0).unwrap();
        store
            .write(&addr(&["events", "0", "when"]), when.into())
            .unwrap();
        assert_eq!(store.value()["events"][0]["when"], json!("2013-05-01T08:00:00Z"));
    }

    /// Stores durations as a whole number of seconds.
    struct Seconds;

    impl FragmentCodec for Seconds {
        fn name(&self) -> &str {
            "seconds"
        }

        fn encode(&self, value: FieldValue) -> Result<Value, CoercionError> {
            match value {
                FieldValue::Duration(delta) => Ok(Value::from(delta.num_seconds())),
                other => other.into_json(),
            }
        }
    }

    fn timed_schema() -> Arc<SchemaNode> {
        let mut fields = BTreeMap::new();
        fields.insert(
            "lasts".to_string(),
            Arc::new(FieldDeclaration::integer().with_codec(Codec::new(Seconds))),
        );
        fields.insert(
            "rests".to_string(),
            Arc::new(FieldDeclaration::duration().with_optional(true)),
        );
        Arc::new(emit_document(&DocumentMeta::new("timed"), &fields))
    }

    #[test]
    fn field_codec_encodes_before_validation() {
        let store =
            MemoryStore::validated(json!({"lasts": 0}), timed_schema(), SchemaValidator::new())
                .unwrap();
        store
            .write(&addr(&["lasts"]), TimeDelta::minutes(2).into())
            .unwrap();
        store
            .write(&addr(&["rests"]), TimeDelta::minutes(2).into())
            .unwrap();
        assert_eq!(store.value(), json!({"lasts": 120, "rests": "0d 120s 0us"}));
    }

    #[test]
    fn store_default_codec_is_replaceable() {
        let store = MemoryStore::new(json!({"lasts": 0}), timed_schema())
            .with_codec(Codec::new(Seconds));
        assert_eq!(store.codec().name(), "seconds");
        store
            .write(&addr(&["rests"]), TimeDelta::seconds(30).into())
            .unwrap();
        assert_eq!(store.value()["rests"], json!(30));
    }

    #[test]
    fn unvalidated_store_writes_through_shape_mismatch() {
        let store = MemoryStore::new(json!({"events": {"title": "x"}}), history_schema());
        store.write(&addr(&["events", "title"]), "y".into()).unwrap();
        assert_eq!(store.value()["events"]["title"], json!("y"));
    }

    #[test]
    fn invalid_initial_value_rejected() {
        let err = MemoryStore::validated(
            json!({"events": [{"title": 1, "importance": 1}]}),
            history_schema(),
            SchemaValidator::new(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn schema_at_follows_declarations() {
        let store = validated_store();
        let node = store.schema_at(&addr(&["events", "0", "importance"])).unwrap().unwrap();
        assert_eq!(node.kind(), Kind::Integer);
        assert!(store.schema_at(&addr(&["events", "3"])).unwrap().is_none());
        assert!(store.schema_at(&addr(&["undeclared", "x"])).unwrap().is_none());
    }

    #[test]
    fn schema_at_rejects_shape_mismatch() {
        let store = validated_store();
        let err = store.schema_at(&addr(&["events", "title"])).unwrap_err();
        assert!(matches!(err, StoreError::Address(AddressError::KeyOnArray { .. })));
        let err = store
            .schema_at(&addr(&["events", "0", "title", "x"]))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Address(AddressError::NotAContainer { found: "string", .. })
        ));
    }

    #[test]
    fn is_container_at_inspects_stored_value() {
        let store = validated_store();
        assert!(store.is_container_at(&addr(&["events"])).unwrap());
        assert!(store.is_container_at(&addr(&["events", "0"])).unwrap());
        assert!(!store.is_container_at(&addr(&["events", "0", "title"])).unwrap());
        assert!(store.is_container_at(&addr(&["missing"])).is_err());
    }

    #[test]
    fn root_write_replaces_value() {
        let store = validated_store();
        store.write(&Address::root(), json!({"events": []}).into()).unwrap();
        assert_eq!(store.value(), json!({"events": []}));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn validate_rechecks_whole_value() {
        let store = validated_store();
        assert!(store.validate().is_ok());
        assert_eq!(store.into_value(), history());
    }
}
