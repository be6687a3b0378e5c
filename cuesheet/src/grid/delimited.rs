//! CSV / TSV table source.
//!
//! The whole file is decoded and parsed at construction. The extent is the
//! number of lines by the length of the longest record; shorter records
//! read as absent trailing cells. A blank line is kept as an empty row, so
//! its cells read as absent.

use std::path::Path;
use tracing::{info, trace};

use super::cell::CellValue;
use super::dialect::{sniff, Dialect};
use super::{CellSource, SourceFormat};
use crate::error::{GridError, GridResult};

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> GridResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Ok(text),
            Err(_) => {
                let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
                if had_errors {
                    Err(GridError::Encoding("content is not valid UTF-8".to_string()))
                } else {
                    Ok(text.into_owned())
                }
            }
        },
        "iso-8859-1" | "latin-1" | "latin1" => Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()),
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        _ => {
            // Fallback: try UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

fn is_line_break(byte: &u8) -> bool {
    matches!(byte, b'\r' | b'\n')
}

/// Line breaks in a run of `\r`/`\n` bytes, `\r\n` counting once.
fn line_breaks(run: &[u8]) -> usize {
    let mut count = 0;
    let mut bytes = run.iter().peekable();
    while let Some(&byte) = bytes.next() {
        if byte == b'\r' && bytes.peek() == Some(&&b'\n') {
            bytes.next();
        }
        count += 1;
    }
    count
}

/// Blank lines between the record that ended at byte `end` and the next one.
///
/// The csv reader skips empty lines. The break run around `end` holds the
/// previous record's terminator followed by one break per skipped line,
/// however much of it the reader has consumed.
fn blank_lines(bytes: &[u8], end: usize) -> usize {
    let end = end.min(bytes.len());
    let before = bytes[..end].iter().rev().take_while(|b| is_line_break(b)).count();
    let after = bytes[end..].iter().take_while(|b| is_line_break(b)).count();
    let breaks = line_breaks(&bytes[end - before..end + after]);
    if end == 0 {
        breaks
    } else {
        breaks.saturating_sub(1)
    }
}

/// An in-memory delimited text table.
#[derive(Debug, Clone)]
pub struct DelimitedGrid {
    rows: Vec<Vec<String>>,
    cols: usize,
    dialect: Dialect,
    encoding: String,
}

impl DelimitedGrid {
    /// Load a delimited file. Without a dialect the convention is sniffed
    /// from the first kilobyte; a failed sniff is a [`GridError::Dialect`].
    pub fn open(path: &Path, format: SourceFormat, dialect: Option<Dialect>) -> GridResult<Self> {
        let bytes = std::fs::read(path)?;
        info!(path = %path.display(), bytes = bytes.len(), "loading delimited table");
        Self::from_bytes(&bytes, format, dialect)
    }

    /// Parse delimited bytes with encoding detection.
    pub fn from_bytes(bytes: &[u8], format: SourceFormat, dialect: Option<Dialect>) -> GridResult<Self> {
        let encoding = detect_encoding(bytes);
        let decoded = decode_content(bytes, &encoding)?;
        let content = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);

        let dialect = match dialect {
            Some(dialect) => dialect,
            None => sniff(content, format.preferred_delimiter())?,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(dialect.delimiter)
            .quoting(dialect.quote.is_some())
            .quote(dialect.quote.unwrap_or(b'"'))
            .from_reader(content.as_bytes());

        let bytes = content.as_bytes();
        let mut rows = Vec::new();
        let mut cols = 0;
        let mut record = csv::StringRecord::new();
        let mut end = 0;
        while reader.read_record(&mut record)? {
            for _ in 0..blank_lines(bytes, end) {
                trace!(row = rows.len(), "blank line");
                rows.push(Vec::new());
            }
            let row: Vec<String> = record.iter().map(String::from).collect();
            trace!(row = rows.len(), ?row, "record");
            cols = cols.max(row.len());
            rows.push(row);
            end = usize::try_from(reader.position().byte()).unwrap_or(bytes.len());
        }

        info!(%encoding, %dialect, rows = rows.len(), cols, "delimited table loaded");
        Ok(Self { rows, cols, dialect, encoding })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl CellSource for DelimitedGrid {
    fn cell(&self, row: usize, col: usize) -> GridResult<CellValue> {
        if row < 10 {
            trace!(row, col, "delimited cell");
        }
        if row >= self.rows.len() || col >= self.cols {
            return Err(GridError::OutOfRange {
                row,
                col,
                rows: self.rows.len(),
                cols: self.cols,
            });
        }
        Ok(self.rows[row].get(col).cloned())
    }

    fn extent(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }
}
