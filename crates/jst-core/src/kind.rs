//! # JSON Kinds
//!
//! The primitive types a declared field can take. Specialized string
//! subtypes (date, email, url, ...) are all `Kind::String` here; their
//! extra semantics live on the field declaration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Boolean,
    Integer,
    Number,
    String,
    Object,
    Array,
}

impl Kind {
    /// The JSON Schema `type` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Whether fragments of this kind are navigated through a proxy
    /// rather than returned as a plain value.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Whether `minimum`/`maximum` apply.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON type name of a value, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_names_match_json_schema_keywords() {
        assert_eq!(Kind::Boolean.as_str(), "boolean");
        assert_eq!(Kind::Integer.as_str(), "integer");
        assert_eq!(Kind::Number.as_str(), "number");
        assert_eq!(Kind::String.as_str(), "string");
        assert_eq!(Kind::Object.as_str(), "object");
        assert_eq!(Kind::Array.as_str(), "array");
    }

    #[test]
    fn kind_serde_is_lowercase() {
        assert_eq!(serde_json::to_value(Kind::Integer).unwrap(), json!("integer"));
        let k: Kind = serde_json::from_value(json!("array")).unwrap();
        assert_eq!(k, Kind::Array);
    }

    #[test]
    fn only_objects_and_arrays_are_containers() {
        assert!(Kind::Object.is_container());
        assert!(Kind::Array.is_container());
        assert!(!Kind::String.is_container());
        assert!(!Kind::Integer.is_container());
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(3)), "integer");
        assert_eq!(json_type_name(&json!(3.5)), "number");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
