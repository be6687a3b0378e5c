//! Uniform row/column access over heterogeneous table files.
//!
//! ```text
//! ┌──────────────┐
//! │  .csv / .tsv │──▶ DelimitedGrid ─┐
//! └──────────────┘   (sniffed)       │        ┌─────────┐     ┌──────┐
//!                                    ├─ Grid ─▶ GridRow ├────▶│ Rows │
//! ┌──────────────┐                   │        └─────────┘     └──────┘
//! │ .xlsx / .ods │──▶ WorkbookGrid ──┘
//! └──────────────┘   (first sheet)
//! ```
//!
//! Every source answers [`CellSource::cell`] with a [`CellValue`] (absent or
//! text) or the [`GridError::OutOfRange`](crate::error::GridError::OutOfRange)
//! sentinel, which row and table iteration absorb as "no more data".

pub mod cell;
pub mod delimited;
pub mod dialect;
pub mod row;
pub mod workbook;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{GridError, GridResult};

pub use cell::{is_blank, normalize, CellValue, NativeValue};
pub use delimited::DelimitedGrid;
pub use dialect::{sniff, Dialect};
pub use row::{GridRow, RowCells, Rows};
pub use workbook::WorkbookGrid;

/// A read-only 2-D grid of cells addressed by zero-based `(row, col)`.
pub trait CellSource {
    /// Resolve one cell, or out-of-range beyond the extent.
    fn cell(&self, row: usize, col: usize) -> GridResult<CellValue>;

    /// `(rows, cols)` within which [`cell`](Self::cell) succeeds.
    fn extent(&self) -> (usize, usize);

    /// View of row `row`.
    fn row(&self, row: usize) -> GridRow<'_, Self> {
        GridRow::new(self, row)
    }

    /// Rows from `from` until data runs out.
    fn rows(&self, from: usize) -> Rows<'_, Self> {
        Rows::new(self, from, None)
    }

    /// Rows in `from..to`, stopping early if data runs out.
    fn rows_between(&self, from: usize, to: usize) -> Rows<'_, Self> {
        Rows::new(self, from, Some(to))
    }
}

/// Table file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Tsv,
    Workbook,
}

impl SourceFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> GridResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods" => Ok(Self::Workbook),
            _ => Err(GridError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Delimiter favoured by the sniffer for this format.
    pub fn preferred_delimiter(&self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            Self::Csv | Self::Workbook => b',',
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Workbook => "workbook",
        };
        f.write_str(name)
    }
}

/// The closed set of table sources.
pub enum Grid {
    Delimited(DelimitedGrid),
    Workbook(WorkbookGrid),
}

impl Grid {
    pub fn format(&self) -> SourceFormat {
        match self {
            Grid::Delimited(grid) if grid.dialect().delimiter == b'\t' => SourceFormat::Tsv,
            Grid::Delimited(_) => SourceFormat::Csv,
            Grid::Workbook(_) => SourceFormat::Workbook,
        }
    }

    /// Dialect in use, for delimited sources.
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            Grid::Delimited(grid) => Some(grid.dialect()),
            Grid::Workbook(_) => None,
        }
    }
}

impl CellSource for Grid {
    fn cell(&self, row: usize, col: usize) -> GridResult<CellValue> {
        match self {
            Grid::Delimited(grid) => grid.cell(row, col),
            Grid::Workbook(grid) => grid.cell(row, col),
        }
    }

    fn extent(&self) -> (usize, usize) {
        match self {
            Grid::Delimited(grid) => grid.extent(),
            Grid::Workbook(grid) => grid.extent(),
        }
    }
}

/// Open a table file, choosing the source by extension.
///
/// `dialect` only applies to delimited files; when absent it is sniffed.
pub fn open_grid(path: &Path, dialect: Option<Dialect>) -> GridResult<Grid> {
    let format = SourceFormat::from_path(path)?;
    debug!(path = %path.display(), %format, "opening table");
    match format {
        SourceFormat::Csv | SourceFormat::Tsv => {
            Ok(Grid::Delimited(DelimitedGrid::open(path, format, dialect)?))
        }
        SourceFormat::Workbook => {
            if dialect.is_some() {
                debug!("dialect hint ignored for spreadsheet source");
            }
            Ok(Grid::Workbook(WorkbookGrid::open(path)?))
        }
    }
}
