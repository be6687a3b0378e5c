//! Column-zone carving.
//!
//! A cue table packs several sub-tables side by side: the stage columns, a
//! fixed "auto" block, then one block per code group. Code-group blocks
//! repeat the same field labels, so a label only means something inside its
//! zone. Zones are carved once per table from the header and reused for
//! every row.

use serde::Deserialize;
use tracing::{debug, warn};

use super::columns::HeaderRow;
use crate::models::ColumnZone;

/// Zero-based index of a spreadsheet column name (`A` is 0, `AA` is 26).
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(c as usize - 'A' as usize + 1)
    })
    .map(|n| n - 1)
}

/// Spreadsheet column name of a zero-based index.
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Where the auto block sits and how code groups are marked.
///
/// Loaded from JSON; missing keys keep their defaults:
///
/// ```json
/// { "auto_from": "K", "auto_to": "S", "group_markers": ["mc1:", "mc2:"] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoneLayout {
    /// First auto column, as a column name.
    pub auto_from: String,
    /// Column name one past the last auto column.
    pub auto_to: String,
    /// Header labels opening each code group, in group order.
    pub group_markers: Vec<String>,
}

impl Default for ZoneLayout {
    fn default() -> Self {
        Self {
            auto_from: "K".to_string(),
            auto_to: "S".to_string(),
            group_markers: (1..=5).map(|n| format!("mc{n}:")).collect(),
        }
    }
}

impl ZoneLayout {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// The auto block, or `None` when a column name is invalid.
    pub fn auto_zone(&self) -> Option<ColumnZone> {
        Some(ColumnZone::new(column_index(&self.auto_from)?, column_index(&self.auto_to)?))
    }
}

/// Columns of one code group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGroupZone {
    /// Group number, starting at 1.
    pub group: usize,
    pub marker: String,
    /// `None` when the marker is missing from the header.
    pub zone: Option<ColumnZone>,
}

/// All zones of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableZones {
    pub auto: ColumnZone,
    pub code_groups: Vec<CodeGroupZone>,
}

impl TableZones {
    /// Carve zones from the header.
    ///
    /// A group's zone runs from its marker to the nearest marker to its
    /// right, or to the end of the header.
    pub fn carve(header: &HeaderRow, layout: &ZoneLayout) -> Self {
        let auto = layout.auto_zone().unwrap_or_else(|| {
            warn!(from = %layout.auto_from, to = %layout.auto_to, "invalid auto columns, auto block disabled");
            ColumnZone::new(0, 0)
        });

        let starts: Vec<Option<usize>> = layout
            .group_markers
            .iter()
            .map(|marker| header.find(marker, ColumnZone::ALL))
            .collect();

        let code_groups = layout
            .group_markers
            .iter()
            .zip(&starts)
            .enumerate()
            .map(|(i, (marker, start))| {
                let zone = start.map(|begin| {
                    let end = starts
                        .iter()
                        .flatten()
                        .copied()
                        .filter(|&other| other > begin)
                        .min()
                        .unwrap_or(header.len());
                    ColumnZone::new(begin, end)
                });
                match zone {
                    Some(zone) => debug!(group = i + 1, %marker, begin = zone.begin, end = zone.end, "code group zone"),
                    None => debug!(group = i + 1, %marker, "code group marker not in header"),
                }
                CodeGroupZone { group: i + 1, marker: marker.clone(), zone }
            })
            .collect();

        Self { auto, code_groups }
    }
}
