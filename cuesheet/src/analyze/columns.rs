//! Header-driven column resolution.

use crate::grid::CellValue;
use crate::models::ColumnZone;

/// Row 0 of a table: column labels, not necessarily unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderRow {
    labels: Vec<CellValue>,
}

impl HeaderRow {
    pub fn new(labels: Vec<CellValue>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `col`, absent past the end.
    pub fn label(&self, col: usize) -> CellValue {
        self.labels.get(col).cloned().flatten()
    }

    /// First column in `zone` labelled exactly `name`.
    ///
    /// Case-sensitive, no trimming. Never returns a column outside the zone.
    pub fn find(&self, name: &str, zone: ColumnZone) -> Option<usize> {
        let zone = zone.clamp(self.labels.len());
        (zone.begin..zone.end).find(|&col| self.labels[col].as_deref() == Some(name))
    }

    /// Value of the `name` column of `row` within `zone`; absent on a miss.
    pub fn get(&self, row: &[CellValue], name: &str, zone: ColumnZone) -> CellValue {
        self.find(name, zone).and_then(|col| row.get(col).cloned().flatten())
    }
}
