//! # jst-schema — Field Declarations & Schema Emission
//!
//! Describes the shape of a document and turns that description into
//! JSON Schema.
//!
//! ## Declarations (`field`)
//!
//! [`FieldDeclaration`] is an immutable description of one field: its
//! [`FieldType`] plus title, description, default, optionality,
//! nullability, pattern and enumeration. Specialized string kinds (date,
//! time, date-time, duration, email, IP address, slug, URL) are string
//! fields preloaded with a built-in pattern. Containers own their children
//! through `Arc`, so declarations nest into trees without cycles.
//!
//! ## Emission (`emit`)
//!
//! [`emit`] walks a declaration recursively and produces a [`SchemaNode`].
//! [`emit_document`] wraps a set of named fields into the top-level object
//! schema of a document type. Emission is deterministic: properties are
//! ordered by name, items keep declaration order.
//!
//! ## Declaration Files (`loader`)
//!
//! YAML or JSON files describing a document type, for use without writing
//! Rust. See [`loader`] for the format.
//!
//! ## Validation (`validate`)
//!
//! [`SchemaValidator`] compiles an emitted schema with `jsonschema` and
//! reports every violation with its instance path.
//!
//! ## Crate Policy
//!
//! - Depends only on `jst-core` internally.
//! - Declarations are immutable once built; builders consume and return.

pub mod emit;
pub mod field;
pub mod loader;
pub mod validate;

pub use emit::{emit, emit_document, DocumentMeta, SchemaNode, SchemaType};
pub use field::{
    Bound, Content, FieldDeclaration, FieldType, IpProtocol, NumericRange, StringFormat,
    StringType,
};
pub use loader::{DeclarationFile, LoadError};
pub use validate::{
    SchemaValidationError, SchemaValidator, Validate, ValidationViolations, Violation,
};
