//! Builders for the individual entity documents.
//!
//! Every document carries the collection context, an `@id` of the form
//! `type_id/entity_id`, an `@type` list and the `annal:` envelope fields.

use serde_json::{json, Map, Value};

use super::{make_id, EntityDocument, Muzicode};
use crate::models::{ActionFields, StageRecord};

pub const STAGE_SCORE: &str = "climb_Stage_Score";
pub const PUBLISHED_SCORE: &str = "climb_Stage_Published_Score";
pub const ACTIONS: &str = "climb_Actions";
pub const MUZICODE: &str = "climb_Muzicode";
pub const MUZICODE_TYPE: &str = "climb_Muzicode_Type";
pub const MANIFESTATION_BAG: &str = "meld_Manifestation_Bag";
pub const ANNOTATION: &str = "climb_Annotation";

/// Shared `@context` of every document.
pub fn context() -> Value {
    json!([{ "@base": "../../" }, "../../coll_context.jsonld"])
}

/// Start a document body with the envelope fields.
fn envelope(type_id: &str, entity_id: &str, annal_type: &str, types: &[&str]) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("@context".into(), context());
    body.insert("@id".into(), json!(make_id(type_id, Some(entity_id))));
    body.insert("@type".into(), json!(types));
    body.insert("annal:id".into(), json!(entity_id));
    body.insert("annal:type".into(), json!(annal_type));
    body.insert("annal:type_id".into(), json!(type_id));
    body
}

fn document(type_id: &str, entity_id: &str, body: Map<String, Value>) -> EntityDocument {
    EntityDocument::new(type_id, entity_id, Value::Object(body))
}

/// `climb_Stage_Score/<stage>`, linking to its code actions through `parts`.
pub fn stage_score(record: &StageRecord, parts: &[String]) -> EntityDocument {
    let stage = record.stage.as_str();
    let mut body = envelope(
        STAGE_SCORE,
        stage,
        "climb:Stage_Score",
        &[
            "climb:Stage_Score",
            "frbr:Group_1_entity",
            "mo:MusicalExpression",
            "mo:Score",
            "frbr:Expression",
            "annal:EntityData",
        ],
    );
    let effects = &record.effects;
    let fields = json!({
        "rdfs:comment": format!("# Climb! {stage}\r\n\r\nStage {stage} of a Climb! performance."),
        "rdfs:label": format!("Climb! {stage}"),
        "mo:published_as": make_id(PUBLISHED_SCORE, Some(published_id(stage).as_str())),
        "climb:next_stage": make_id(STAGE_SCORE, record.next.as_deref()),
        "climb:default_cue_stage": make_id(STAGE_SCORE, record.default_cue.as_deref()),
        "climb:no_effect": effects.none,
        "climb:rain_effect": effects.rain,
        "climb:snow_effect": effects.snow,
        "climb:wind_effect": effects.wind,
        "climb:storm_effect": effects.storm,
        "climb:sun_effect": effects.sun,
        "climb:auto": auto_id(stage),
        "frbr:part": parts.iter().map(|part| json!({ "@id": part })).collect::<Vec<_>>(),
    });
    extend(&mut body, fields);
    document(STAGE_SCORE, stage, body)
}

pub fn published_id(stage: &str) -> String {
    format!("{stage}_published")
}

pub fn auto_id(stage: &str) -> String {
    format!("{stage}_auto")
}

/// `climb_Stage_Published_Score/<stage>_published`.
pub fn published_score(record: &StageRecord) -> EntityDocument {
    let id = published_id(&record.stage);
    let label = format!("Published score for \"{}\"", record.stage);
    let mut body = envelope(
        PUBLISHED_SCORE,
        &id,
        "climb:Stage_Published_Score",
        &[
            "meld:Published_Score_MEI",
            "mo:MusicalManifestation",
            "frbr:Manifestation_MEI",
            "frbr:Manifestation",
            "meld:Manifestation_MEI",
            "mo:PublishedScore",
            "frbr:Group_1_entity",
            "meld:Manifestation",
            "annal:EntityData",
        ],
    );
    extend(
        &mut body,
        json!({
            "rdfs:label": label,
            "rdfs:comment": format!("# {label}\r\n\r\n"),
            "frbr:url": format!("climbstage:{}", record.meifile.as_deref().unwrap_or_default()),
        }),
    );
    document(PUBLISHED_SCORE, &id, body)
}

/// `climb_Actions/<id>`.
///
/// The single `delay` value fills both the secondary MIDI delay and the
/// animation delay slots.
pub fn actions(id: &str, label: &str, fields: &ActionFields) -> EntityDocument {
    let mut body = envelope(ACTIONS, id, "climb:Actions", &["climb:Actions", "annal:EntityData"]);
    extend(
        &mut body,
        json!({
            "rdfs:comment": format!("# {label}"),
            "rdfs:label": label,
            "climb:cue_stage": fields.cue,
            "climb:action_midi": fields.midi,
            "climb:action_midi2_delayed": fields.midi2,
            "climb:action_midi2_delay_value": fields.delay,
            "climb:action_monitor_visual": fields.monitor,
            "climb:action_background_visual": fields.background,
            "climb:action_animation": fields.animate,
            "climb:action_animation_delay_value": fields.delay,
            "climb:action_mc_visual": fields.code_visual,
            "climb:action_mc_delay": fields.code_visual_delay,
            "climb:action_app_message": fields.app,
        }),
    );
    document(ACTIONS, id, body)
}

/// `climb_Muzicode/<name>`.
pub fn muzicode(code: &Muzicode<'_>) -> EntityDocument {
    let mut body = envelope(
        MUZICODE,
        &code.id,
        "climb:Muzicode",
        &[
            "climb:Muzicode",
            "mo:MusicalExpression",
            "meld:Muzicode",
            "frbr:Group_1_entity",
            "meld:Expression",
            "frbr:Expression",
            "annal:EntityData",
        ],
    );
    extend(
        &mut body,
        json!({
            "rdfs:label": code.label,
            "rdfs:comment": format!("# {}\r\n\r\n\r\n\r\n", code.label),
            "climb:cue_stage": make_id(STAGE_SCORE, code.cue),
            "frbr:embodiment": code.bag_ref(),
            "mc:type": code.type_ref(),
        }),
    );
    document(MUZICODE, &code.id, body)
}

/// `meld_Manifestation_Bag/<name>`: the score elements of an enriched code.
pub fn manifestation_bag(code: &Muzicode<'_>, meifile: &str) -> EntityDocument {
    let mut body = envelope(
        MANIFESTATION_BAG,
        &code.id,
        "meld:Manifestation_Bag",
        &["meld:Manifestation_Bag", "frbr:Manifestation", "frbr:Group_1_entity", "annal:EntityData"],
    );
    let members: Vec<Value> = code
        .elements
        .iter()
        .map(|element| json!({ "@id": format!("{meifile}{element}") }))
        .collect();
    extend(
        &mut body,
        json!({
            "rdfs:label": code.label,
            "rdfs:comment": format!("# {}\r\n\r\n", code.label),
            "rdfs:member": members,
        }),
    );
    document(MANIFESTATION_BAG, &code.id, body)
}

/// `climb_Annotation/<name>`: event template tying a code to its actions.
pub fn annotation(code: &Muzicode<'_>) -> EntityDocument {
    let mut body = envelope(
        ANNOTATION,
        &code.id,
        "climb:Annotation",
        &["climb:Annotation", "ao:Annotation", "meld:Annotation", "annal:EntityData"],
    );
    extend(
        &mut body,
        json!({
            "rdfs:label": code.label,
            "rdfs:comment": format!("# {}\r\n\r\n\r\n\r\n", code.label),
            "ao:hasBody": make_id(ACTIONS, Some(code.id.as_str())),
            "ao:hasTarget": make_id(MUZICODE, Some(code.id.as_str())),
            "ao:motivation": code.type_ref(),
        }),
    );
    document(ANNOTATION, &code.id, body)
}

fn extend(body: &mut Map<String, Value>, fields: Value) {
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
}
