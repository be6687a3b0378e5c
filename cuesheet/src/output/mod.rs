//! Document validation and persistence.
//!
//! # Embedded Schema
//!
//! Documents are checked against `schemas/entity-envelope.json` (JSON Schema
//! Draft 7), embedded at compile time. It only covers the envelope every
//! entity shares (`@id`, `@type`, `annal:*`, labels); entity-specific fields
//! are not constrained.
//!
//! # Layout
//!
//! A document `type_id/entity_id` is written to
//! `<root>/<type_id>/<entity_id>/entity_data.jsonld`, keys sorted, two-space
//! indentation.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{OutputError, OutputResult};
use crate::meld::EntityDocument;

/// File name of every entity document.
pub const ENTITY_FILE: &str = "entity_data.jsonld";

const ENVELOPE_SCHEMA: &str = include_str!("../../schemas/entity-envelope.json");

/// Validates documents against the embedded envelope schema.
pub struct DocumentValidator {
    validator: jsonschema::Validator,
}

impl DocumentValidator {
    pub fn new() -> OutputResult<Self> {
        let schema: Value = serde_json::from_str(ENVELOPE_SCHEMA)?;
        let validator =
            jsonschema::draft7::new(&schema).map_err(|e| OutputError::Schema(e.to_string()))?;
        Ok(Self { validator })
    }

    /// All schema violations of a document body.
    pub fn errors(&self, body: &Value) -> Vec<String> {
        self.validator
            .iter_errors(body)
            .map(|e| e.to_string())
            .collect()
    }

    pub fn validate(&self, doc: &EntityDocument) -> OutputResult<()> {
        let errors = self.errors(&doc.body);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(OutputError::Invalid { id: doc.reference(), errors })
        }
    }
}

/// Recursively rebuild objects with keys in sorted order.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> =
                entries.into_iter().map(|(k, v)| (k.clone(), sort_keys(v))).collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Writes documents below a root directory.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    root: PathBuf,
}

impl DocumentWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Target file of a document. The reference must be two plain path
    /// segments; `.` and `..` are refused.
    pub fn path_for(&self, doc: &EntityDocument) -> OutputResult<PathBuf> {
        let reference = doc.reference();
        let segments: Vec<&str> = reference.split('/').collect();
        let plain = |s: &&str| !s.is_empty() && *s != "." && *s != "..";
        if segments.len() != 2 || !segments.iter().all(plain) {
            return Err(OutputError::UnsafePath(reference));
        }
        let mut path = self.root.clone();
        path.extend(segments);
        path.push(ENTITY_FILE);
        Ok(path)
    }

    /// Write one document, creating directories. Returns the file written.
    pub fn write(&self, doc: &EntityDocument) -> OutputResult<PathBuf> {
        let path = self.path_for(doc)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&sort_keys(&doc.body))?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "document written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meld::documents;
    use crate::models::ActionFields;
    use serde_json::json;

    fn actions_doc() -> EntityDocument {
        documents::actions("S1_auto", "Stage S1 auto actions", &ActionFields::default())
    }

    #[test]
    fn test_generated_document_is_valid() {
        let validator = DocumentValidator::new().unwrap();
        assert!(validator.validate(&actions_doc()).is_ok());
    }

    #[test]
    fn test_envelope_violations() {
        let validator = DocumentValidator::new().unwrap();
        let doc = EntityDocument::new(
            "climb_Actions",
            "S1_auto",
            json!({ "@id": "climb_Actions/S1_auto", "@type": ["climb:Actions"] }),
        );
        match validator.validate(&doc) {
            Err(OutputError::Invalid { id, errors }) => {
                assert_eq!(id, "climb_Actions/S1_auto");
                assert!(errors.len() >= 2);
            }
            other => panic!("expected invalid document, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let validator = DocumentValidator::new().unwrap();
        let mut body = actions_doc().body;
        body["@id"] = json!("");
        assert!(!validator.errors(&body).is_empty());
    }

    #[test]
    fn test_dot_segments_rejected() {
        let validator = DocumentValidator::new().unwrap();
        let writer = DocumentWriter::new("d");
        for name in ["..", ".", "a/b"] {
            let doc = documents::actions(name, "escape", &ActionFields::default());
            assert!(!validator.errors(&doc.body).is_empty(), "{name} passed validation");
            assert!(matches!(writer.path_for(&doc), Err(OutputError::UnsafePath(_))));
        }
        for name in ["..wolf", ".hidden", "S1_mc2:"] {
            let doc = documents::actions(name, "plain", &ActionFields::default());
            assert!(validator.validate(&doc).is_ok(), "{name} failed validation");
            assert!(writer.path_for(&doc).is_ok());
        }
    }

    #[test]
    fn test_unsafe_path_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("d");
        let writer = DocumentWriter::new(&root);
        let doc = documents::actions("..", "escape", &ActionFields::default());
        assert!(matches!(writer.write(&doc), Err(OutputError::UnsafePath(_))));
        assert!(!root.exists());
    }

    #[test]
    fn test_sort_keys_recursive() {
        let value = json!({ "b": 1, "a": { "z": [ { "y": 1, "x": 2 } ], "c": null } });
        let sorted = serde_json::to_string(&sort_keys(&value)).unwrap();
        assert_eq!(sorted, r#"{"a":{"c":null,"z":[{"x":2,"y":1}]},"b":1}"#);
    }

    #[test]
    fn test_write_layout() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(dir.path());
        let path = writer.write(&actions_doc()).unwrap();
        assert_eq!(path, dir.path().join("climb_Actions").join("S1_auto").join(ENTITY_FILE));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n  \"@context\": ["));
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["annal:type_id"], "climb_Actions");
        assert!(content.find("\"@id\"").unwrap() < content.find("\"annal:id\"").unwrap());
        assert!(content.find("\"climb:action_app_message\"").unwrap() < content.find("\"rdfs:label\"").unwrap());
    }
}
