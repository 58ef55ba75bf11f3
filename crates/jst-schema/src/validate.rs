//! # Schema Validation
//!
//! Checks JSON values against emitted [`SchemaNode`]s. The [`Validate`]
//! trait is the seam a value store calls through; [`SchemaValidator`] is
//! the implementation backed by the `jsonschema` crate.
//!
//! ## Draft
//!
//! Emitted schemas describe arrays with positional `items` sequences (tuple
//! validation), which Draft 7 supports natively and Draft 2020-12 does not.
//! Validation therefore compiles [`SchemaNode::to_json_schema`] under
//! Draft 7.
//!
//! ## Errors
//!
//! Failures carry every violation with its instance path, schema path and
//! message. A store validating a write at some address re-roots the
//! instance paths with [`SchemaValidationError::at`], so paths always read
//! from the document root.

use std::fmt;

use jsonschema::Validator;
use jst_core::Address;
use serde_json::Value;
use thiserror::Error;

use crate::emit::SchemaNode;

/// Error during schema validation.
#[derive(Error, Debug, Clone)]
pub enum SchemaValidationError {
    /// The value did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Title of the schema validated against, or `(untitled)`.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The emitted schema could not be compiled (e.g. an invalid pattern).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Title of the schema, or `(untitled)`.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },
}

impl SchemaValidationError {
    /// Prefix every violation's instance path with `address`.
    pub fn at(self, address: &Address) -> Self {
        match self {
            Self::ValidationFailed {
                schema_name,
                violations,
            } => Self::ValidationFailed {
                schema_name,
                violations: ValidationViolations {
                    violations: violations
                        .violations
                        .into_iter()
                        .map(|v| Violation {
                            instance_path: format!("{address}{}", v.instance_path),
                            ..v
                        })
                        .collect(),
                },
            },
            other => other,
        }
    }

    /// The violations, if this is a validation failure.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations),
            Self::ValidatorBuildError { .. } => None,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating value.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Checks a value against a schema node.
pub trait Validate {
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` listing every
    /// violation when `instance` does not conform to `schema`.
    fn validate(&self, schema: &SchemaNode, instance: &Value) -> Result<(), SchemaValidationError>;
}

/// `jsonschema`-backed validator for emitted schemas.
///
/// Stateless; each call compiles the node it is given. Nodes are small
/// (one field's subtree on writes), and the store never validates the same
/// node twice for one write.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Compile a schema node into a `jsonschema` validator.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuildError` if the rendered
    /// schema is rejected, e.g. because a declared pattern is not a valid
    /// regular expression.
    pub fn build_validator(&self, schema: &SchemaNode) -> Result<Validator, SchemaValidationError> {
        let rendered = schema.to_json_schema();
        tracing::trace!(schema = %rendered, "compiling validator");

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft7);
        opts.build(&rendered)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name(schema),
                reason: e.to_string(),
            })
    }
}

impl Validate for SchemaValidator {
    fn validate(&self, schema: &SchemaNode, instance: &Value) -> Result<(), SchemaValidationError> {
        let validator = self.build_validator(schema)?;

        let errors: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                schema = %schema_name(schema),
                violations = errors.len(),
                "value rejected by schema"
            );
            Err(SchemaValidationError::ValidationFailed {
                schema_name: schema_name(schema),
                violations: ValidationViolations { violations: errors },
            })
        }
    }
}

fn schema_name(schema: &SchemaNode) -> String {
    schema.title.clone().unwrap_or_else(|| "(untitled)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{emit, emit_document, DocumentMeta};
    use crate::field::FieldDeclaration;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn node(field: FieldDeclaration) -> SchemaNode {
        emit(&Arc::new(field))
    }

    fn history() -> SchemaNode {
        let mut fields = BTreeMap::new();
        fields.insert(
            "events".to_string(),
            Arc::new(FieldDeclaration::list([FieldDeclaration::object([
                ("title", FieldDeclaration::string()),
                ("importance", FieldDeclaration::integer().with_minimum(0)),
            ])])),
        );
        emit_document(&DocumentMeta::new("history").with_title("history"), &fields)
    }

    #[test]
    fn valid_scalar_passes() {
        let schema = node(FieldDeclaration::integer().with_minimum(0).with_maximum(100));
        SchemaValidator::new().validate(&schema, &json!(42)).unwrap();
    }

    #[test]
    fn out_of_range_integer_rejected() {
        let schema = node(FieldDeclaration::integer().with_maximum(10).with_title("small"));
        let err = SchemaValidator::new().validate(&schema, &json!(11)).unwrap_err();
        match &err {
            SchemaValidationError::ValidationFailed { schema_name, violations } => {
                assert_eq!(schema_name, "small");
                assert_eq!(violations.len(), 1);
                assert!(violations.violations()[0].schema_path.contains("maximum"));
            }
            other => panic!("Expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn wrong_type_rejected() {
        let schema = node(FieldDeclaration::string());
        assert!(SchemaValidator::new().validate(&schema, &json!(3)).is_err());
    }

    #[test]
    fn nullable_accepts_null() {
        let validator = SchemaValidator::new();
        assert!(validator.validate(&node(FieldDeclaration::string()), &json!(null)).is_err());
        validator
            .validate(&node(FieldDeclaration::string().with_nullable(true)), &json!(null))
            .unwrap();
    }

    #[test]
    fn enum_restricts_values() {
        let schema = node(FieldDeclaration::string().with_enum(["low", "high"]));
        let validator = SchemaValidator::new();
        validator.validate(&schema, &json!("low")).unwrap();
        assert!(validator.validate(&schema, &json!("medium")).is_err());
    }

    #[test]
    fn builtin_patterns_compile_and_match() {
        let validator = SchemaValidator::new();
        let date = node(FieldDeclaration::date());
        validator.validate(&date, &json!("2013-05-01")).unwrap();
        validator.validate(&date, &json!("05/01/2013")).unwrap();
        assert!(validator.validate(&date, &json!("May 1st")).is_err());

        let duration = node(FieldDeclaration::duration());
        validator.validate(&duration, &json!("3d 7200s 500us")).unwrap();
        assert!(validator.validate(&duration, &json!("3 days")).is_err());

        let slug = node(FieldDeclaration::slug());
        validator.validate(&slug, &json!("sinking-of-atlantis")).unwrap();
        assert!(validator.validate(&slug, &json!("Sinking of Atlantis")).is_err());

        let url = node(FieldDeclaration::url());
        validator.validate(&url, &json!("https://www.petrounias.org/")).unwrap();
        validator.validate(&url, &json!("http://localhost:8000/path?q=1")).unwrap();
        assert!(validator.validate(&url, &json!("not a url")).is_err());

        let time = node(FieldDeclaration::time());
        validator.validate(&time, &json!("23:59")).unwrap();
        validator.validate(&time, &json!("23:59:59")).unwrap();
        assert!(validator.validate(&time, &json!("24:00")).is_err());
    }

    #[test]
    fn missing_required_property_rejected() {
        let validator = SchemaValidator::new();
        let err = validator
            .validate(&history(), &json!({ "events": [{ "importance": 3 }] }))
            .unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.violations().iter().any(|v| v.message.contains("title")));
    }

    #[test]
    fn optional_property_may_be_absent() {
        let schema = node(FieldDeclaration::object([
            ("title", FieldDeclaration::string()),
            ("note", FieldDeclaration::string().with_optional(true)),
        ]));
        SchemaValidator::new().validate(&schema, &json!({ "title": "x" })).unwrap();
    }

    #[test]
    fn tuple_items_leave_extra_positions_unconstrained() {
        let schema = node(FieldDeclaration::list([FieldDeclaration::string()]));
        let validator = SchemaValidator::new();
        validator
            .validate(&schema, &json!(["Sinking of Atlantis", "Discovery of Atlantis", 3]))
            .unwrap();
        assert!(validator.validate(&schema, &json!([3])).is_err());
    }

    #[test]
    fn nested_violation_reports_instance_path() {
        let err = SchemaValidator::new()
            .validate(
                &history(),
                &json!({ "events": [{ "title": "Sinking of Atlantis", "importance": -1 }] }),
            )
            .unwrap_err();
        let v = &err.violations().unwrap().violations()[0];
        assert_eq!(v.instance_path, "/events/0/importance");
    }

    #[test]
    fn at_reroots_instance_paths() {
        let schema = node(FieldDeclaration::integer().with_minimum(0));
        let err = SchemaValidator::new()
            .validate(&schema, &json!(-5))
            .unwrap_err()
            .at(&Address::root().child("events").child(0).child("importance"));
        let v = &err.violations().unwrap().violations()[0];
        assert_eq!(v.instance_path, "/events/0/importance");
    }

    #[test]
    fn non_finite_bound_does_not_break_validator() {
        let schema = node(FieldDeclaration::number().with_minimum(f64::NAN).with_maximum(2.0));
        let validator = SchemaValidator::new();
        validator.validate(&schema, &json!(-1.5)).unwrap();
        assert!(validator.validate(&schema, &json!(2.5)).is_err());
    }

    #[test]
    fn invalid_pattern_fails_to_build() {
        let schema = node(FieldDeclaration::string().with_pattern("(unclosed"));
        let err = SchemaValidator::new().build_validator(&schema).unwrap_err();
        assert!(matches!(err, SchemaValidationError::ValidatorBuildError { .. }));
    }

    #[test]
    fn violation_display_format() {
        let v = Violation {
            instance_path: "/events/0/importance".to_string(),
            schema_path: "/properties/events/items/0/properties/importance/minimum".to_string(),
            message: "-1 is less than the minimum of 0".to_string(),
        };
        assert_eq!(v.to_string(), "  /events/0/importance: -1 is less than the minimum of 0");
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""events" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }
}
