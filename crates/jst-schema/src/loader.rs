//! # Declaration Files
//!
//! Document types can be declared in YAML or JSON instead of code:
//!
//! ```yaml
//! name: history
//! title: history
//! description: a collection of historical events
//! fields:
//!   events:
//!     type: list
//!     title: events
//!     content:
//!       - type: object
//!         title: event
//!         content:
//!           title: { type: string, title: event title }
//!           importance: { type: integer, minimum: 0 }
//! ```
//!
//! Code-built declarations cannot put a constraint on the wrong kind; files
//! can, so the loader checks what the builders enforce by construction and
//! names the offending field in the error. Each field is decoded on its own,
//! so a misspelled key or a wrongly typed attribute is reported with the
//! path of the field it belongs to.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use jst_core::kind::json_type_name;
use jst_core::{Address, Kind};
use serde::Deserialize;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::emit::DocumentMeta;
use crate::field::{Bound, FieldDeclaration, IpProtocol, StringFormat};

/// Error loading a declaration file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read declaration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid declaration syntax: {0}")]
    Syntax(String),

    #[error("field '{path}': {reason}")]
    InvalidField { path: Address, reason: String },

    #[error("field '{path}': unknown type '{type_name}'")]
    UnknownType { path: Address, type_name: String },

    #[error("field '{path}': {kind} fields cannot declare {content} content")]
    ContentMismatch {
        path: Address,
        kind: String,
        content: &'static str,
    },

    #[error("field '{path}': '{constraint}' does not apply to {kind} fields")]
    ConstraintMismatch {
        path: Address,
        constraint: &'static str,
        kind: Kind,
    },

    #[error("field '{path}': unknown IP protocol '{protocol}' (expected ipv4 or ipv6)")]
    UnknownProtocol { path: Address, protocol: String },

    #[error("field '{path}': bound {value} is not representable")]
    InvalidBound { path: Address, value: Number },
}

/// A document type read from a declaration file.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationFile {
    pub meta: DocumentMeta,
    pub fields: BTreeMap<String, Arc<FieldDeclaration>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    #[serde(rename = "type")]
    type_name: String,
    title: Option<String>,
    description: Option<String>,
    default: Option<Value>,
    #[serde(default)]
    optional: bool,
    #[serde(default, alias = "nullable")]
    null: bool,
    pattern: Option<String>,
    #[serde(rename = "enum")]
    enum_values: Option<Vec<Value>>,
    minimum: Option<Number>,
    maximum: Option<Number>,
    #[serde(alias = "minLength")]
    min_length: Option<u64>,
    #[serde(alias = "maxLength")]
    max_length: Option<u64>,
    protocol: Option<String>,
    content: Option<Value>,
}

/// Parse a YAML declaration.
pub fn from_yaml_str(source: &str) -> Result<DeclarationFile, LoadError> {
    let raw: RawDocument =
        serde_yaml::from_str(source).map_err(|e| LoadError::Syntax(e.to_string()))?;
    convert_document(raw)
}

/// Parse a JSON declaration.
pub fn from_json_str(source: &str) -> Result<DeclarationFile, LoadError> {
    let raw: RawDocument =
        serde_json::from_str(source).map_err(|e| LoadError::Syntax(e.to_string()))?;
    convert_document(raw)
}

/// Load a declaration file; `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn load(path: &Path) -> Result<DeclarationFile, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let mut file = if is_json {
        from_json_str(&source)?
    } else {
        from_yaml_str(&source)?
    };
    if file.meta.name.is_empty() {
        file.meta.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();
    }
    tracing::debug!(
        path = %path.display(),
        document = %file.meta.name,
        fields = file.fields.len(),
        "loaded declaration"
    );
    Ok(file)
}

fn convert_document(raw: RawDocument) -> Result<DeclarationFile, LoadError> {
    let mut fields = BTreeMap::new();
    for (name, raw_field) in raw.fields {
        let path = Address::root().child(name.as_str());
        fields.insert(name, Arc::new(convert_field(parse_field(raw_field, &path)?, &path)?));
    }
    Ok(DeclarationFile {
        meta: DocumentMeta {
            name: raw.name.unwrap_or_default(),
            title: raw.title,
            description: raw.description,
        },
        fields,
    })
}

fn parse_field(value: Value, path: &Address) -> Result<RawField, LoadError> {
    serde_json::from_value(value).map_err(|e| LoadError::InvalidField {
        path: path.clone(),
        reason: e.to_string(),
    })
}

fn convert_child(value: Value, path: &Address) -> Result<FieldDeclaration, LoadError> {
    convert_field(parse_field(value, path)?, path)
}

fn convert_field(raw: RawField, path: &Address) -> Result<FieldDeclaration, LoadError> {
    let type_name = raw.type_name;
    let content = raw.content;
    let has_content = content.is_some();
    let mut field = match type_name.as_str() {
        "boolean" => FieldDeclaration::boolean(),
        "integer" => FieldDeclaration::integer(),
        "number" | "decimal" => FieldDeclaration::number(),
        "string" => FieldDeclaration::string(),
        "date" => FieldDeclaration::string_with_format(StringFormat::Date),
        "time" => FieldDeclaration::string_with_format(StringFormat::Time),
        "datetime" | "date-time" => FieldDeclaration::string_with_format(StringFormat::DateTime),
        "duration" | "timedelta" => FieldDeclaration::string_with_format(StringFormat::Duration),
        "email" => FieldDeclaration::string_with_format(StringFormat::Email),
        "ip" | "ip-address" => {
            let protocol = match raw.protocol.as_deref() {
                None | Some("ipv4") => IpProtocol::V4,
                Some("ipv6") => IpProtocol::V6,
                Some(other) => {
                    return Err(LoadError::UnknownProtocol {
                        path: path.clone(),
                        protocol: other.to_string(),
                    })
                }
            };
            FieldDeclaration::string_with_format(StringFormat::IpAddress(protocol))
        }
        "slug" => FieldDeclaration::string_with_format(StringFormat::Slug),
        "url" => FieldDeclaration::string_with_format(StringFormat::Url),
        "object" => match content {
            None => FieldDeclaration::object(Vec::<(String, FieldDeclaration)>::new()),
            Some(Value::Object(props)) => {
                let mut children = Vec::with_capacity(props.len());
                for (name, child) in props {
                    let child_path = path.child(name.as_str());
                    children.push((name, convert_child(child, &child_path)?));
                }
                FieldDeclaration::object(children)
            }
            Some(Value::Array(_)) => {
                return Err(LoadError::ContentMismatch {
                    path: path.clone(),
                    kind: type_name.clone(),
                    content: "list",
                })
            }
            Some(other) => return Err(content_shape(path, "a map of fields", &other)),
        },
        "list" | "array" => match content {
            None => FieldDeclaration::list(Vec::new()),
            Some(Value::Array(items)) => {
                let mut children = Vec::with_capacity(items.len());
                for (index, child) in items.into_iter().enumerate() {
                    children.push(convert_child(child, &path.child(index))?);
                }
                FieldDeclaration::list(children)
            }
            Some(Value::Object(_)) => {
                return Err(LoadError::ContentMismatch {
                    path: path.clone(),
                    kind: type_name.clone(),
                    content: "property",
                })
            }
            Some(other) => return Err(content_shape(path, "a list of fields", &other)),
        },
        other => {
            return Err(LoadError::UnknownType {
                path: path.clone(),
                type_name: other.to_string(),
            })
        }
    };

    let kind = field.kind();
    let check = |applies: bool, constraint: &'static str| {
        if applies {
            Ok(())
        } else {
            Err(LoadError::ConstraintMismatch {
                path: path.clone(),
                constraint,
                kind,
            })
        }
    };

    if has_content && !kind.is_container() {
        return Err(LoadError::ContentMismatch {
            path: path.clone(),
            kind: type_name.clone(),
            content: "nested",
        });
    }
    if raw.protocol.is_some() && !matches!(type_name.as_str(), "ip" | "ip-address") {
        check(false, "protocol")?;
    }
    if let Some(minimum) = raw.minimum {
        check(kind.is_numeric(), "minimum")?;
        field = field.with_minimum(to_bound(minimum, path)?);
    }
    if let Some(maximum) = raw.maximum {
        check(kind.is_numeric(), "maximum")?;
        field = field.with_maximum(to_bound(maximum, path)?);
    }
    if let Some(min_length) = raw.min_length {
        check(kind == Kind::String, "minLength")?;
        field = field.with_min_length(min_length);
    }
    if let Some(max_length) = raw.max_length {
        check(kind == Kind::String, "maxLength")?;
        field = field.with_max_length(max_length);
    }

    if let Some(title) = raw.title {
        field = field.with_title(title);
    }
    if let Some(description) = raw.description {
        field = field.with_description(description);
    }
    if let Some(default) = raw.default {
        field = field.with_default(default);
    }
    if let Some(pattern) = raw.pattern {
        field = field.with_pattern(pattern);
    }
    if let Some(values) = raw.enum_values {
        field = field.with_enum(values);
    }
    Ok(field.with_optional(raw.optional).with_nullable(raw.null))
}

fn content_shape(path: &Address, expected: &str, found: &Value) -> LoadError {
    LoadError::InvalidField {
        path: path.clone(),
        reason: format!("content must be {expected}, found {}", json_type_name(found)),
    }
}

fn to_bound(value: Number, path: &Address) -> Result<Bound, LoadError> {
    if let Some(i) = value.as_i64() {
        Ok(Bound::Int(i))
    } else if let Some(f) = value.as_f64() {
        Ok(Bound::Float(f))
    } else {
        Err(LoadError::InvalidBound {
            path: path.clone(),
            value,
        })
    }
}
