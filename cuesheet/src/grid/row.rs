//! Row views and table iteration over a [`CellSource`].
//!
//! Both levels stop on the out-of-range sentinel rather than on a stored
//! count: a row ends at the first column the source refuses, a table ends at
//! the first row whose column 0 it refuses.

use std::fmt;
use tracing::{info, warn};

use super::cell::CellValue;
use super::CellSource;
use crate::error::GridResult;

/// A lazily materialized view of one row.
pub struct GridRow<'a, S: ?Sized> {
    source: &'a S,
    row: usize,
}

impl<S: ?Sized> Clone for GridRow<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for GridRow<'_, S> {}

impl<'a, S: CellSource + ?Sized> GridRow<'a, S> {
    pub fn new(source: &'a S, row: usize) -> Self {
        Self { source, row }
    }

    /// Zero-based row number in the source.
    pub fn index(&self) -> usize {
        self.row
    }

    /// Cell at `col`; out-of-range past the source extent.
    pub fn get(&self, col: usize) -> GridResult<CellValue> {
        self.source.cell(self.row, col)
    }

    /// Cells from column 0 until the source reports out-of-range.
    pub fn cells(&self) -> RowCells<'a, S> {
        RowCells {
            source: self.source,
            row: self.row,
            col: 0,
            done: false,
        }
    }

    /// Detached copy of every cell in the row.
    ///
    /// Stops at the out-of-range sentinel; any other source error is returned.
    pub fn values(&self) -> GridResult<Vec<CellValue>> {
        let mut values = Vec::new();
        loop {
            match self.get(values.len()) {
                Ok(value) => values.push(value),
                Err(err) if err.is_out_of_range() => return Ok(values),
                Err(err) => return Err(err),
            }
        }
    }
}

impl<'a, S: CellSource + ?Sized> IntoIterator for GridRow<'a, S> {
    type Item = CellValue;
    type IntoIter = RowCells<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells()
    }
}

impl<'a, S: CellSource + ?Sized> IntoIterator for &GridRow<'a, S> {
    type Item = CellValue;
    type IntoIter = RowCells<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells()
    }
}

impl<S: CellSource + ?Sized> fmt::Debug for GridRow<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.cells().map(Option::unwrap_or_default).collect();
        write!(f, "GridRow({}: {})", self.row, cells.join(","))
    }
}

/// Column-ascending cells of one row.
///
/// A source error other than out-of-range ends the row with a warning; use
/// [`GridRow::values`] where such errors must propagate.
pub struct RowCells<'a, S: ?Sized> {
    source: &'a S,
    row: usize,
    col: usize,
    done: bool,
}

impl<S: CellSource + ?Sized> Iterator for RowCells<'_, S> {
    type Item = CellValue;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.cell(self.row, self.col) {
            Ok(value) => {
                self.col += 1;
                Some(value)
            }
            Err(err) => {
                if !err.is_out_of_range() {
                    warn!(row = self.row, col = self.col, %err, "row iteration stopped");
                }
                self.done = true;
                None
            }
        }
    }
}

/// Rows `from..to` of a source, ending at the first row that cannot be probed.
///
/// Errors other than out-of-range are yielded once and end the sequence.
pub struct Rows<'a, S: ?Sized> {
    source: &'a S,
    next: usize,
    to: Option<usize>,
    done: bool,
}

impl<'a, S: CellSource + ?Sized> Rows<'a, S> {
    pub fn new(source: &'a S, from: usize, to: Option<usize>) -> Self {
        Self {
            source,
            next: from,
            to,
            done: false,
        }
    }
}

impl<'a, S: CellSource + ?Sized> Iterator for Rows<'a, S> {
    type Item = GridResult<GridRow<'a, S>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.to.is_some_and(|to| self.next >= to) {
            return None;
        }
        let row = GridRow::new(self.source, self.next);
        match row.get(0) {
            Ok(_) => {
                self.next += 1;
                Some(Ok(row))
            }
            Err(err) if err.is_out_of_range() => {
                info!(row = self.next, "end of table data: {err}");
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
