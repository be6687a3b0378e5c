//! Linked-data document generation from stage records.
//!
//! ```text
//! StageRecord ──┬─▶ climb_Actions/<stage>_auto
//!               ├─▶ per named code action:
//!               │     climb_Muzicode/<name>
//!               │     meld_Manifestation_Bag/<name>   (enriched codes only)
//!               │     climb_Actions/<name>
//!               │     climb_Annotation/<name>
//!               ├─▶ climb_Stage_Score/<stage>
//!               └─▶ climb_Stage_Published_Score/<stage>_published
//! ```
//!
//! A code action is named by its `name` cell. Without one, an action with a
//! primary MIDI trigger is named `<stage>_<marker label>`; any other action
//! produces nothing.

pub mod documents;
pub mod enrichment;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::grid::is_blank;
use crate::models::{CodeActionRecord, StageRecord};

pub use enrichment::{CodeIndex, EnrichmentIndex};

/// Code type when enrichment data does not give one.
pub const DEFAULT_CODE_TYPE: &str = "CHOICE";

/// `type_id/entity_id`, or the empty string without an entity id.
pub fn make_id(type_id: &str, entity_id: Option<&str>) -> String {
    match entity_id {
        Some(id) if !id.is_empty() => format!("{type_id}/{id}"),
        _ => String::new(),
    }
}

/// One generated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDocument {
    pub type_id: String,
    pub entity_id: String,
    pub body: Value,
}

impl EntityDocument {
    pub fn new(type_id: &str, entity_id: &str, body: Value) -> Self {
        Self {
            type_id: type_id.to_string(),
            entity_id: entity_id.to_string(),
            body,
        }
    }

    /// `type_id/entity_id`.
    pub fn reference(&self) -> String {
        make_id(&self.type_id, Some(self.entity_id.as_str()))
    }
}

/// A named code action, resolved against enrichment data.
#[derive(Debug, Clone, PartialEq)]
pub struct Muzicode<'a> {
    pub id: String,
    pub label: String,
    /// Uppercased code type.
    pub kind: String,
    /// Stage cued by the code.
    pub cue: Option<&'a str>,
    /// Score elements; empty without enrichment.
    pub elements: &'a [String],
    /// Whether enrichment data exists for the code.
    pub enriched: bool,
}

impl<'a> Muzicode<'a> {
    /// Name and describe a code action, or `None` when it is unnamed.
    pub fn resolve(stage: &str, action: &'a CodeActionRecord, codes: Option<&'a CodeIndex>) -> Option<Self> {
        let id = match &action.name {
            name if !is_blank(name) => name.clone().unwrap_or_default(),
            _ if !is_blank(&action.actions.midi) => {
                format!("{stage}_{}", action.header.as_deref().unwrap_or_default())
            }
            _ => return None,
        };

        let cue = action.actions.cue.as_deref();
        let Some(code) = codes.and_then(|codes| codes.get(&id)) else {
            return Some(Self {
                label: format!("{stage}: Muzicode {id}"),
                id,
                kind: DEFAULT_CODE_TYPE.to_string(),
                cue,
                elements: &[],
                enriched: false,
            });
        };

        let label = match &code.app {
            Some(app) => app.clone(),
            None => format!("Muzicode {id} ({DEFAULT_CODE_TYPE})"),
        };
        let kind = code
            .kind
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| DEFAULT_CODE_TYPE.to_string());
        Some(Self {
            label: format!("{stage}: {label}"),
            id,
            kind,
            cue,
            elements: &code.meielements,
            enriched: true,
        })
    }

    pub fn reference(&self) -> String {
        make_id(documents::MUZICODE, Some(self.id.as_str()))
    }

    pub fn type_ref(&self) -> String {
        make_id(documents::MUZICODE_TYPE, Some(self.kind.as_str()))
    }

    /// Reference of the manifestation bag, for enriched codes.
    pub fn bag_ref(&self) -> Option<String> {
        self.enriched
            .then(|| make_id(documents::MANIFESTATION_BAG, Some(self.id.as_str())))
    }
}

/// Generate every document for a table, stage by stage.
pub fn generate_documents(records: &[StageRecord], enrichment: &EnrichmentIndex) -> Vec<EntityDocument> {
    let mut docs = Vec::new();
    for record in records {
        docs.extend(stage_documents(record, enrichment));
    }
    docs
}

/// Documents for one stage.
pub fn stage_documents(record: &StageRecord, enrichment: &EnrichmentIndex) -> Vec<EntityDocument> {
    let stage = record.stage.as_str();
    let codes = enrichment.for_stage(stage);
    if codes.is_none() && !enrichment.is_empty() {
        warn!(%stage, "no enrichment data for stage");
    }

    let mut docs = vec![documents::actions(
        &documents::auto_id(stage),
        &format!("Stage {stage} auto actions"),
        &record.auto_actions.actions,
    )];

    let mut parts = Vec::new();
    for action in &record.code_actions {
        let Some(code) = Muzicode::resolve(stage, action, codes) else {
            continue;
        };
        debug!(%stage, code = %code.id, kind = %code.kind, enriched = code.enriched, "code action");
        docs.push(documents::muzicode(&code));
        if code.enriched {
            docs.push(documents::manifestation_bag(&code, record.meifile.as_deref().unwrap_or_default()));
        }
        docs.push(documents::actions(&code.id, &code.label, &action.actions));
        docs.push(documents::annotation(&code));
        parts.push(code.reference());
    }

    docs.push(documents::stage_score(record, &parts));
    docs.push(documents::published_score(record));
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionFields, AutoActionRecord, ColumnZone, StageEffects};

    fn code(group: usize, name: Option<&str>, midi: Option<&str>) -> CodeActionRecord {
        CodeActionRecord {
            group,
            header: Some(format!("mc{group}:")),
            trigger: Some("X".into()),
            name: name.map(String::from),
            zone: Some(ColumnZone::new(19, 26)),
            actions: ActionFields {
                cue: Some("S2".into()),
                midi: midi.map(String::from),
                ..Default::default()
            },
        }
    }

    fn record(code_actions: Vec<CodeActionRecord>) -> StageRecord {
        StageRecord {
            stage: "S1".into(),
            next: Some("S2".into()),
            meifile: Some("s1.mei".into()),
            default_cue: Some("S1".into()),
            effects: StageEffects::default(),
            auto_actions: AutoActionRecord {
                zone: ColumnZone::new(10, 18),
                actions: ActionFields::default(),
            },
            code_actions,
        }
    }

    fn enrichment() -> EnrichmentIndex {
        EnrichmentIndex::from_json(
            r##"[{ "stage": "S1", "mcs": [
                { "name": "wolf", "type": "exact", "meielements": ["#m1"] },
                { "name": "S1_mc2:", "type": "choice", "app": "Owl call" }
            ] }]"##,
        )
        .unwrap()
    }

    fn references(docs: &[EntityDocument]) -> Vec<String> {
        docs.iter().map(EntityDocument::reference).collect()
    }

    #[test]
    fn test_make_id() {
        assert_eq!(make_id("climb_Stage_Score", Some("S1")), "climb_Stage_Score/S1");
        assert_eq!(make_id("climb_Stage_Score", Some("")), "");
        assert_eq!(make_id("climb_Stage_Score", None), "");
    }

    #[test]
    fn test_stage_without_codes() {
        let docs = stage_documents(&record(vec![CodeActionRecord::unmapped(1)]), &EnrichmentIndex::default());
        assert_eq!(
            references(&docs),
            vec![
                "climb_Actions/S1_auto",
                "climb_Stage_Score/S1",
                "climb_Stage_Published_Score/S1_published",
            ]
        );
        assert_eq!(docs[1].body["frbr:part"], serde_json::json!([]));
    }

    #[test]
    fn test_code_naming() {
        let docs = stage_documents(
            &record(vec![
                code(1, Some("wolf"), None),
                code(2, None, Some("60")),
                code(3, None, None),
                code(4, Some(""), None),
            ]),
            &enrichment(),
        );
        assert_eq!(
            references(&docs),
            vec![
                "climb_Actions/S1_auto",
                "climb_Muzicode/wolf",
                "meld_Manifestation_Bag/wolf",
                "climb_Actions/wolf",
                "climb_Annotation/wolf",
                "climb_Muzicode/S1_mc2:",
                "meld_Manifestation_Bag/S1_mc2:",
                "climb_Actions/S1_mc2:",
                "climb_Annotation/S1_mc2:",
                "climb_Stage_Score/S1",
                "climb_Stage_Published_Score/S1_published",
            ]
        );
        let score = &docs[9];
        assert_eq!(
            score.body["frbr:part"],
            serde_json::json!([{ "@id": "climb_Muzicode/wolf" }, { "@id": "climb_Muzicode/S1_mc2:" }])
        );
    }

    #[test]
    fn test_enrichment_label_and_type() {
        let enrichment = enrichment();
        let codes = enrichment.for_stage("S1");

        let wolf = code(1, Some("wolf"), None);
        let resolved = Muzicode::resolve("S1", &wolf, codes).unwrap();
        assert_eq!(resolved.label, "S1: Muzicode wolf (CHOICE)");
        assert_eq!(resolved.kind, "EXACT");
        assert_eq!(resolved.type_ref(), "climb_Muzicode_Type/EXACT");
        assert_eq!(resolved.bag_ref().as_deref(), Some("meld_Manifestation_Bag/wolf"));

        let owl = code(2, None, Some("60"));
        let resolved = Muzicode::resolve("S1", &owl, codes).unwrap();
        assert_eq!(resolved.label, "S1: Owl call");
        assert_eq!(resolved.kind, "CHOICE");
        assert!(resolved.elements.is_empty());
    }

    #[test]
    fn test_code_without_enrichment() {
        let fox = code(1, Some("fox"), None);
        let resolved = Muzicode::resolve("S1", &fox, None).unwrap();
        assert_eq!(resolved.label, "S1: Muzicode fox");
        assert_eq!(resolved.kind, DEFAULT_CODE_TYPE);
        assert!(!resolved.enriched);
        assert_eq!(resolved.bag_ref(), None);

        let doc = documents::muzicode(&resolved);
        assert_eq!(doc.body["frbr:embodiment"], Value::Null);
        assert_eq!(doc.body["climb:cue_stage"], "climb_Stage_Score/S2");
    }

    #[test]
    fn test_code_action_keeps_background_visual() {
        let mut wolf = code(1, Some("wolf"), None);
        wolf.actions.background = Some("forest.png".into());
        let docs = stage_documents(&record(vec![wolf]), &EnrichmentIndex::default());
        let actions = docs
            .iter()
            .find(|doc| doc.reference() == "climb_Actions/wolf")
            .unwrap();
        assert_eq!(actions.body["climb:action_background_visual"], "forest.png");
        assert_eq!(actions.body["climb:action_midi2_delayed"], Value::Null);
    }

    #[test]
    fn test_missing_stage_enrichment_is_not_fatal() {
        let mut other = record(vec![code(1, Some("wolf"), None)]);
        other.stage = "S9".into();
        let docs = generate_documents(&[other], &enrichment());
        assert!(references(&docs).contains(&"climb_Muzicode/wolf".to_string()));
        assert!(!references(&docs).contains(&"meld_Manifestation_Bag/wolf".to_string()));
    }
}
