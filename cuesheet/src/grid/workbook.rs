//! Spreadsheet table source backed by calamine.
//!
//! Only the first worksheet is read. The extent is the sheet's used range
//! measured from A1, so leading empty rows/columns stay addressable and read
//! as absent.

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::{debug, info};

use super::cell::{normalize, CellValue, NativeValue};
use super::CellSource;
use crate::error::{GridError, GridResult};

/// Largest magnitude at which every integral `f64` is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The first worksheet of a spreadsheet file, held in memory.
pub struct WorkbookGrid {
    range: Range<Data>,
    rows: usize,
    cols: usize,
    sheet: String,
}

impl WorkbookGrid {
    /// Open a workbook and load its first sheet.
    pub fn open(path: &Path) -> GridResult<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(GridError::EmptyWorkbook)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(GridError::EmptyWorkbook)??;
        let (rows, cols) = match range.end() {
            Some((row, col)) => (row as usize + 1, col as usize + 1),
            None => (0, 0),
        };
        info!(path = %path.display(), %sheet, rows, cols, "workbook sheet loaded");
        Ok(Self { range, rows, cols, sheet })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet
    }
}

/// Map a calamine cell onto the native-value union.
///
/// SpreadsheetML stores every number as a float; integral values are
/// reported as integers so `42` reads back as `"42"`.
fn native(data: &Data) -> NativeValue<'_> {
    match data {
        Data::Empty => NativeValue::Empty,
        Data::String(text) => NativeValue::Text(text),
        Data::Int(number) => NativeValue::Int(*number),
        Data::Float(number) if number.fract() == 0.0 && number.abs() < MAX_EXACT_INTEGER => {
            NativeValue::Int(*number as i64)
        }
        Data::Float(number) => NativeValue::Float(*number),
        Data::Bool(flag) => NativeValue::Bool(*flag),
        Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => NativeValue::Other("d"),
        Data::Error(_) => NativeValue::Other("e"),
        #[allow(unreachable_patterns)]
        _ => NativeValue::Other("?"),
    }
}

impl CellSource for WorkbookGrid {
    fn cell(&self, row: usize, col: usize) -> GridResult<CellValue> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let value = match self.range.get_value((row as u32, col as u32)) {
            Some(data) => normalize(native(data)),
            None => None,
        };
        if row < 10 {
            debug!(row, col, ?value, "workbook cell");
        }
        Ok(value)
    }

    fn extent(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}
