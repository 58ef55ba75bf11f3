//! # Schema Emitter
//!
//! Turns field declarations into [`SchemaNode`] trees. Emission is pure:
//! the same declaration always yields a structurally identical tree.
//!
//! ## Emitted keys
//!
//! `type, title, description, default, optional, null, properties` are
//! always present (`null` when unset). `pattern, enum, minimum, maximum,
//! minLength, maxLength, format` appear only when the declaration defines
//! them. `items` appears only for array fields with declared content, as an
//! ordered sequence with one schema per position.
//!
//! ## Two renderings
//!
//! - [`SchemaNode::to_value`] is the emitted document described above.
//! - [`SchemaNode::to_json_schema`] is the Draft 7 form handed to the
//!   validation engine: unset keys dropped, `optional`/`null` folded into
//!   `required` lists and `type` unions.
//!
//! Neither rendering includes the node's metadata (`field`, `codec`).

use std::collections::BTreeMap;
use std::sync::Arc;

use jst_core::{Codec, Kind, Segment};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::field::{Bound, Content, FieldDeclaration, FieldType};

/// Document-level metadata of a document type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Type name used in diagnostics.
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl DocumentMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The `type` keyword: a single kind, or the kind unioned with `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Single(Kind),
    Nullable(Kind),
}

impl SchemaType {
    /// The declared kind, ignoring nullability.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Single(kind) | Self::Nullable(kind) => *kind,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }
}

impl Serialize for SchemaType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(kind) => kind.serialize(serializer),
            Self::Nullable(kind) => [kind.as_str(), "null"].serialize(serializer),
        }
    }
}

/// One node of an emitted schema tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub optional: bool,
    pub null: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_bound")]
    pub minimum: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_bound")]
    pub maximum: Option<Bound>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SchemaNode>>,
    /// Declaration this node was emitted from; `None` for a document root.
    #[serde(skip)]
    pub field: Option<Arc<FieldDeclaration>>,
    /// Fragment implementation used to encode writes at this node; `None`
    /// means the store default.
    #[serde(skip)]
    pub codec: Option<Codec>,
}

fn serialize_bound<S: serde::Serializer>(
    bound: &Option<Bound>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    bound.map(|b| b.to_value()).serialize(serializer)
}

/// Emit the schema of one field declaration, recursing into its content.
pub fn emit(field: &Arc<FieldDeclaration>) -> SchemaNode {
    let kind = field.kind();
    let mut node = SchemaNode {
        schema_type: if field.is_nullable() {
            SchemaType::Nullable(kind)
        } else {
            SchemaType::Single(kind)
        },
        title: field.title().map(str::to_string),
        description: field.description().map(str::to_string),
        default: field.default_value().cloned(),
        optional: field.is_optional(),
        null: field.is_nullable(),
        pattern: field.pattern().map(str::to_string),
        enum_values: field.enum_values().map(<[Value]>::to_vec),
        minimum: None,
        maximum: None,
        min_length: None,
        max_length: None,
        format: None,
        properties: BTreeMap::new(),
        items: None,
        field: Some(Arc::clone(field)),
        codec: field.codec().cloned(),
    };

    match field.field_type() {
        FieldType::Boolean => {}
        FieldType::Integer(range) | FieldType::Number(range) => {
            node.minimum = range.minimum;
            node.maximum = range.maximum;
        }
        FieldType::String(string) => {
            node.min_length = string.min_length;
            node.max_length = string.max_length;
            node.format = string.format.format_tag();
        }
        FieldType::Container(Content::Properties(properties)) => {
            node.properties = properties
                .iter()
                .map(|(name, child)| (name.clone(), emit(child)))
                .collect();
        }
        FieldType::Container(Content::Items(items)) => {
            if !items.is_empty() {
                node.items = Some(items.iter().map(emit).collect());
            }
        }
    }

    node
}

/// Emit the root schema of a document type: an object whose properties are
/// the emitted schemas of the registered fields.
pub fn emit_document<'a, I>(meta: &DocumentMeta, fields: I) -> SchemaNode
where
    I: IntoIterator<Item = (&'a String, &'a Arc<FieldDeclaration>)>,
{
    SchemaNode {
        schema_type: SchemaType::Single(Kind::Object),
        title: meta.title.clone(),
        description: meta.description.clone(),
        default: None,
        optional: false,
        null: false,
        pattern: None,
        enum_values: None,
        minimum: None,
        maximum: None,
        min_length: None,
        max_length: None,
        format: None,
        properties: fields
            .into_iter()
            .map(|(name, field)| (name.clone(), emit(field)))
            .collect(),
        items: None,
        field: None,
        codec: None,
    }
}

impl SchemaNode {
    pub fn kind(&self) -> Kind {
        self.schema_type.kind()
    }

    /// Schema of the direct child addressed by `segment`.
    ///
    /// Returns `None` when the child is unconstrained: an undeclared
    /// property, a position beyond the declared items, or a segment that
    /// does not match this node's kind.
    pub fn child(&self, segment: &Segment) -> Option<&SchemaNode> {
        match (self.kind(), segment) {
            (Kind::Object, Segment::Key(key)) => self.properties.get(key),
            (Kind::Array, Segment::Index(index)) => {
                self.items.as_ref().and_then(|items| items.get(*index))
            }
            _ => None,
        }
    }

    /// The emitted schema document.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Draft 7 JSON Schema equivalent of this node, for the validation
    /// engine.
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "type".into(),
            serde_json::to_value(self.schema_type).unwrap_or(Value::Null),
        );
        if let Some(title) = &self.title {
            out.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(default) = &self.default {
            out.insert("default".into(), default.clone());
        }
        if let Some(pattern) = &self.pattern {
            out.insert("pattern".into(), Value::String(pattern.clone()));
        }
        if let Some(values) = &self.enum_values {
            let mut values = values.clone();
            if self.null && !values.contains(&Value::Null) {
                values.push(Value::Null);
            }
            out.insert("enum".into(), Value::Array(values));
        }
        if let Some(minimum) = self.minimum {
            out.insert("minimum".into(), minimum.to_value());
        }
        if let Some(maximum) = self.maximum {
            out.insert("maximum".into(), maximum.to_value());
        }
        if let Some(min_length) = self.min_length {
            out.insert("minLength".into(), Value::from(min_length));
        }
        if let Some(max_length) = self.max_length {
            out.insert("maxLength".into(), Value::from(max_length));
        }
        if let Some(format) = self.format {
            out.insert("format".into(), Value::String(format.to_string()));
        }
        if self.kind() == Kind::Object {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, child)| (name.clone(), child.to_json_schema()))
                .collect();
            let required: Vec<Value> = self
                .properties
                .iter()
                .filter(|(_, child)| !child.optional)
                .map(|(name, _)| Value::String(name.clone()))
                .collect();
            out.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                out.insert("required".into(), Value::Array(required));
            }
        }
        if let Some(items) = &self.items {
            out.insert(
                "items".into(),
                Value::Array(items.iter().map(SchemaNode::to_json_schema).collect()),
            );
        }
        Value::Object(out)
    }
}
