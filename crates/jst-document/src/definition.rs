//! # Document Types
//!
//! A document type is a named set of field declarations plus document-level
//! metadata. It is registered once, statically, through [`DocumentType`]
//! (usually via [`document_type!`](crate::document_type)), or loaded from a
//! declaration file. Either way the result is a [`DocumentDefinition`]
//! holding the field registry and the root schema emitted from it.
//!
//! Definitions are immutable and shared behind `Arc`; every document of a
//! type points at the same one.

use std::collections::BTreeMap;
use std::sync::Arc;

use jst_schema::{emit_document, DeclarationFile, DocumentMeta, FieldDeclaration, SchemaNode};
use serde_json::Value;

use crate::error::DocumentError;
use crate::model::Document;

/// Name → declaration map of a document type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    fields: BTreeMap<String, Arc<FieldDeclaration>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field. A second registration under the same name
    /// replaces the first.
    pub fn register(&mut self, name: impl Into<String>, field: FieldDeclaration) -> &mut Self {
        self.register_shared(name, Arc::new(field))
    }

    /// Register an already shared declaration.
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        field: Arc<FieldDeclaration>,
    ) -> &mut Self {
        let name = name.into();
        if self.fields.insert(name.clone(), field).is_some() {
            tracing::warn!(field = %name, "field registered twice; keeping the later declaration");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FieldDeclaration>> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in schema property order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<FieldDeclaration>)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Arc<FieldDeclaration>)> for FieldRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Arc<FieldDeclaration>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A registered document type: metadata, fields, and the root schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDefinition {
    meta: DocumentMeta,
    fields: FieldRegistry,
    schema: Arc<SchemaNode>,
}

impl DocumentDefinition {
    /// Build a definition, emitting the root schema.
    pub fn new(meta: DocumentMeta, fields: FieldRegistry) -> Self {
        let schema = Arc::new(emit_document(&meta, fields.iter()));
        tracing::debug!(
            document = %meta.name,
            fields = fields.len(),
            "document type defined"
        );
        Self {
            meta,
            fields,
            schema,
        }
    }

    /// Build the definition of a statically registered type.
    pub fn of<T: DocumentType>() -> Self {
        let mut fields = FieldRegistry::new();
        T::register(&mut fields);
        Self::new(T::meta(), fields)
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    /// Look up a registered field.
    ///
    /// # Errors
    ///
    /// `DocumentError::UnknownField` if `name` is not registered.
    pub fn field(&self, name: &str) -> Result<&Arc<FieldDeclaration>, DocumentError> {
        self.fields
            .get(name)
            .ok_or_else(|| DocumentError::UnknownField {
                document: self.meta.name.clone(),
                name: name.to_string(),
            })
    }
}

impl From<DeclarationFile> for DocumentDefinition {
    fn from(file: DeclarationFile) -> Self {
        Self::new(file.meta, file.fields.into_iter().collect())
    }
}

/// A statically registered document type.
///
/// Implementors supply metadata, a registration function, and a memoized
/// definition; [`document_type!`](crate::document_type) generates all
/// three.
pub trait DocumentType {
    /// Document-level name, title and description.
    fn meta() -> DocumentMeta;

    /// Register this type's fields.
    fn register(fields: &mut FieldRegistry);

    /// The type's definition, built on first use and shared afterwards.
    fn definition() -> Arc<DocumentDefinition>;

    /// Bind `value` to this type without validation.
    fn open(value: Value) -> Document {
        Document::open(Self::definition(), value)
    }

    /// Bind `value` to this type, validating it and every later write.
    ///
    /// # Errors
    ///
    /// The validation error if `value` does not conform.
    fn open_validated(value: Value) -> Result<Document, DocumentError> {
        Document::open_validated(Self::definition(), value)
    }

    /// The emitted root schema.
    fn schema() -> Value {
        Self::definition().schema().to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FieldRegistry {
        let mut fields = FieldRegistry::new();
        fields
            .register("answer", FieldDeclaration::integer())
            .register("question", FieldDeclaration::string().with_optional(true));
        fields
    }

    #[test]
    fn registry_lookups_by_name() {
        let fields = registry();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains("answer"));
        assert!(fields.get("missing").is_none());
        assert_eq!(fields.names().collect::<Vec<_>>(), ["answer", "question"]);
    }

    #[test]
    fn later_registration_replaces() {
        let mut fields = registry();
        fields.register("answer", FieldDeclaration::string());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("answer").unwrap().kind(), jst_core::Kind::String);
    }

    #[test]
    fn definition_emits_root_schema() {
        let meta = DocumentMeta::new("simple")
            .with_title("a title")
            .with_description("a description");
        let definition = DocumentDefinition::new(meta, registry());
        let schema = definition.schema().to_value();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["title"], "a title");
        assert_eq!(schema["description"], "a description");
        assert_eq!(schema["properties"]["answer"]["type"], "integer");
        assert_eq!(schema["properties"]["question"]["optional"], json!(true));
    }

    #[test]
    fn unknown_field_names_document() {
        let definition = DocumentDefinition::new(DocumentMeta::new("simple"), registry());
        let err = definition.field("colour").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'colour' is not a field of document type 'simple'"
        );
    }

    #[test]
    fn definition_from_declaration_file() {
        let file = jst_schema::loader::from_yaml_str(
            "name: simple\nfields:\n  answer: { type: integer }\n",
        )
        .unwrap();
        let definition = DocumentDefinition::from(file);
        assert_eq!(definition.name(), "simple");
        assert!(definition.field("answer").is_ok());
    }
}
