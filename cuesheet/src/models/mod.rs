//! Domain models for the cue-sheet conversion pipeline.
//!
//! This module contains the records extracted from a cue table and the
//! auxiliary enrichment records that accompany it:
//!
//! - [`StageRecord`] - One stage row with its effects and actions
//! - [`AutoActionRecord`] - Actions fired on entering a stage
//! - [`CodeActionRecord`] - Actions fired by one code group
//! - [`ActionFields`] - The action field set shared by both
//! - [`ColumnZone`] - Half-open column range of a header section
//! - [`StageEnrichment`] / [`CodeEnrichment`] - Data not present in the table
//!
//! Records are detached copies: nothing here borrows from a table source.

use serde::{Deserialize, Serialize};

use crate::grid::CellValue;

// =============================================================================
// Column Zones
// =============================================================================

/// A contiguous half-open column range `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnZone {
    pub begin: usize,
    pub end: usize,
}

impl ColumnZone {
    /// The whole row.
    pub const ALL: ColumnZone = ColumnZone { begin: 0, end: usize::MAX };

    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn contains(&self, col: usize) -> bool {
        self.begin <= col && col < self.end
    }

    /// Number of columns, zero when `end <= begin`.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    /// Clamp the end to a row length.
    pub fn clamp(&self, len: usize) -> Self {
        Self { begin: self.begin.min(len), end: self.end.min(len) }
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Field names of an action set, in header-label form.
pub const ACTION_FIELDS: [&str; 10] = [
    "cue",
    "midi",
    "midi2",
    "delay",
    "monitor",
    "v.animate",
    "v.background",
    "v.mc",
    "v.mc.delay",
    "app",
];

/// The actions a trigger can fire.
///
/// Serialized with the header labels used in cue tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionFields {
    /// Stage to cue.
    pub cue: CellValue,
    /// Primary MIDI message.
    pub midi: CellValue,
    /// Secondary, delayed MIDI message.
    pub midi2: CellValue,
    /// Delay value. Used for both the secondary MIDI and the animation.
    pub delay: CellValue,
    pub monitor: CellValue,
    #[serde(rename = "v.animate")]
    pub animate: CellValue,
    #[serde(rename = "v.background")]
    pub background: CellValue,
    #[serde(rename = "v.mc")]
    pub code_visual: CellValue,
    #[serde(rename = "v.mc.delay")]
    pub code_visual_delay: CellValue,
    /// Message for the performer app.
    pub app: CellValue,
}

impl ActionFields {
    /// Build from a resolver called once per name in [`ACTION_FIELDS`].
    pub fn resolve(mut lookup: impl FnMut(&str) -> CellValue) -> Self {
        Self {
            cue: lookup("cue"),
            midi: lookup("midi"),
            midi2: lookup("midi2"),
            delay: lookup("delay"),
            monitor: lookup("monitor"),
            animate: lookup("v.animate"),
            background: lookup("v.background"),
            code_visual: lookup("v.mc"),
            code_visual_delay: lookup("v.mc.delay"),
            app: lookup("app"),
        }
    }

    /// True when no field holds a value.
    pub fn is_empty(&self) -> bool {
        [
            &self.cue,
            &self.midi,
            &self.midi2,
            &self.delay,
            &self.monitor,
            &self.animate,
            &self.background,
            &self.code_visual,
            &self.code_visual_delay,
            &self.app,
        ]
        .iter()
        .all(|value| value.is_none())
    }
}

/// Actions fired automatically on entering a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoActionRecord {
    /// Columns the fields were resolved in.
    pub zone: ColumnZone,
    #[serde(flatten)]
    pub actions: ActionFields,
}

/// Actions fired by one code group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeActionRecord {
    /// Group number, starting at 1.
    pub group: usize,
    /// Header label at the group marker column.
    #[serde(rename = "mc_hdr")]
    pub header: CellValue,
    /// Row value at the group marker column.
    #[serde(rename = "mc")]
    pub trigger: CellValue,
    pub name: CellValue,
    /// `None` when the header has no marker for this group.
    pub zone: Option<ColumnZone>,
    #[serde(flatten)]
    pub actions: ActionFields,
}

impl CodeActionRecord {
    /// A record for a group with no columns.
    pub fn unmapped(group: usize) -> Self {
        Self {
            group,
            header: None,
            trigger: None,
            name: None,
            zone: None,
            actions: ActionFields::default(),
        }
    }
}

// =============================================================================
// Stages
// =============================================================================

/// One-shot condition effects of a stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageEffects {
    #[serde(rename = "no_effect")]
    pub none: CellValue,
    #[serde(rename = "rain_effect")]
    pub rain: CellValue,
    #[serde(rename = "snow_effect")]
    pub snow: CellValue,
    #[serde(rename = "wind_effect")]
    pub wind: CellValue,
    #[serde(rename = "storm_effect")]
    pub storm: CellValue,
    #[serde(rename = "sun_effect")]
    pub sun: CellValue,
}

/// Header labels of the effect columns, in [`StageEffects`] field order.
pub const EFFECT_FIELDS: [&str; 6] = [
    "no_effect",
    "rain_effect",
    "snow_effect",
    "wind_effect",
    "storm_effect",
    "sun_effect",
];

/// One stage row of a cue table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage identifier; never empty.
    pub stage: String,
    /// Transition target.
    pub next: CellValue,
    /// Score file of the stage.
    pub meifile: CellValue,
    /// Stage cued when nothing else fires.
    pub default_cue: CellValue,
    #[serde(flatten)]
    pub effects: StageEffects,
    pub auto_actions: AutoActionRecord,
    /// One entry per code group, in group order.
    #[serde(rename = "mc_actions")]
    pub code_actions: Vec<CodeActionRecord>,
}

// =============================================================================
// Enrichment
// =============================================================================

/// Auxiliary data for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEnrichment {
    pub stage: String,
    #[serde(default)]
    pub mcs: Vec<CodeEnrichment>,
}

/// Auxiliary data for one named code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEnrichment {
    pub name: String,
    /// Code type, e.g. `choice`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Label override.
    #[serde(default)]
    pub app: Option<String>,
    /// Score element fragments, appended to the stage's score file.
    #[serde(default)]
    pub meielements: Vec<String>,
}
