//! # Declaration and Document Files
//!
//! Document files are JSON when their extension is `.json` and YAML
//! otherwise.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use jst_document::DocumentDefinition;
use jst_schema::loader;
use serde_json::Value;

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Load a declaration file into a document definition.
pub fn load_definition(path: &Path) -> Result<Arc<DocumentDefinition>> {
    let file = loader::load(path)
        .with_context(|| format!("loading declaration: {}", path.display()))?;
    Ok(Arc::new(DocumentDefinition::from(file)))
}

/// Read a JSON or YAML document.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading document: {}", path.display()))?;
    let value = if is_json(path) {
        serde_json::from_str(&content)
            .with_context(|| format!("parsing JSON document: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("parsing YAML document: {}", path.display()))?
    };
    tracing::debug!(path = %path.display(), "read document");
    Ok(value)
}

/// Write a document in the format its extension selects.
pub fn write_document(path: &Path, value: &Value) -> Result<()> {
    let content = if is_json(path) {
        let mut content = serde_json::to_string_pretty(value)?;
        content.push('\n');
        content
    } else {
        serde_yaml::to_string(value)?
    };
    std::fs::write(path, content)
        .with_context(|| format!("writing document: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yaml_and_json_documents_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let value = json!({"events": [{"title": "Sinking of Atlantis", "importance": 1}]});
        for name in ["doc.json", "doc.yaml"] {
            let path = dir.path().join(name);
            write_document(&path, &value).unwrap();
            assert_eq!(read_document(&path).unwrap(), value);
        }
    }

    #[test]
    fn unreadable_document_names_path() {
        let err = read_document(Path::new("/nonexistent/doc.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/doc.json"));
    }

    #[test]
    fn malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(read_document(&path).is_err());
    }
}
