//! Auxiliary enrichment data keyed by stage and code name.
//!
//! The file is a JSON array of [`StageEnrichment`]:
//!
//! ```json
//! [{ "stage": "S1", "mcs": [{ "name": "wolf", "type": "choice", "meielements": ["#m1"] }] }]
//! ```

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::error::{EnrichmentError, EnrichmentResult};
use crate::models::{CodeEnrichment, StageEnrichment};

/// Code enrichment by code name.
pub type CodeIndex = HashMap<String, CodeEnrichment>;

/// Enrichment data by stage id.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentIndex {
    stages: HashMap<String, CodeIndex>,
}

impl EnrichmentIndex {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> EnrichmentResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let index = Self::from_json(&content)?;
        info!(path = %path.display(), stages = index.len(), "enrichment data loaded");
        Ok(index)
    }

    pub fn from_json(content: &str) -> EnrichmentResult<Self> {
        let stages: Vec<StageEnrichment> = serde_json::from_str(content)?;
        Self::from_stages(stages)
    }

    /// Index stage entries. A stage listed twice is an error; a code name
    /// repeated within a stage keeps the last entry.
    pub fn from_stages(stages: Vec<StageEnrichment>) -> EnrichmentResult<Self> {
        let mut index = HashMap::with_capacity(stages.len());
        for entry in stages {
            if index.contains_key(&entry.stage) {
                return Err(EnrichmentError::DuplicateStage(entry.stage));
            }
            let codes: CodeIndex = entry.mcs.into_iter().map(|code| (code.name.clone(), code)).collect();
            index.insert(entry.stage, codes);
        }
        Ok(Self { stages: index })
    }

    /// Codes of a stage, `None` when the stage is not listed.
    pub fn for_stage(&self, stage: &str) -> Option<&CodeIndex> {
        self.stages.get(stage)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r##"[
        { "stage": "S1", "mcs": [
            { "name": "wolf", "type": "choice", "app": "Howl", "meielements": ["#m1", "#m2"] },
            { "name": "owl", "type": "exact" }
        ] },
        { "stage": "S2", "mcs": [] }
    ]"##;

    #[test]
    fn test_index_by_stage_and_name() {
        let index = EnrichmentIndex::from_json(SAMPLE).unwrap();
        assert_eq!(index.len(), 2);
        let s1 = index.for_stage("S1").unwrap();
        assert_eq!(s1["wolf"].app.as_deref(), Some("Howl"));
        assert_eq!(s1["wolf"].meielements, vec!["#m1", "#m2"]);
        assert_eq!(s1["owl"].kind.as_deref(), Some("exact"));
        assert!(index.for_stage("S2").unwrap().is_empty());
        assert!(index.for_stage("S3").is_none());
    }

    #[test]
    fn test_duplicate_stage() {
        let err = EnrichmentIndex::from_json(r#"[{"stage": "S1"}, {"stage": "S1"}]"#).unwrap_err();
        assert!(matches!(err, EnrichmentError::DuplicateStage(ref s) if s == "S1"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EnrichmentIndex::from_json(r#"{"stage": "S1"}"#),
            Err(EnrichmentError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let index = EnrichmentIndex::load(file.path()).unwrap();
        assert!(!index.is_empty());
        assert!(matches!(
            EnrichmentIndex::load(Path::new("/nonexistent/enrichment.json")),
            Err(EnrichmentError::Io(_))
        ));
    }
}
