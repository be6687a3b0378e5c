//! Error types for the cue-sheet conversion pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`GridError`] - Table source errors (loading, dialect sniffing, cell access)
//! - [`EnrichmentError`] - Auxiliary JSON loading errors
//! - [`OutputError`] - Document validation and persistence errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! [`GridError::OutOfRange`] is special: it is the "no more data" sentinel
//! returned by cell sources and is absorbed by row and table iteration.

use thiserror::Error;

// =============================================================================
// Table Source Errors
// =============================================================================

/// Errors raised by a table source.
#[derive(Debug, Error)]
pub enum GridError {
    /// Cell address outside the source extent.
    #[error("Cell ({row}, {col}) outside table extent ({rows} rows, {cols} columns)")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode file content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Delimiter/quoting convention could not be determined.
    #[error("Could not determine delimiter: {0}")]
    Dialect(String),

    /// Invalid delimited text.
    #[error("Invalid delimited text: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or parsed.
    #[error("Invalid spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    /// Spreadsheet has no worksheet.
    #[error("Spreadsheet contains no worksheet")]
    EmptyWorkbook,

    /// File extension not mapped to any source format.
    #[error("Unsupported table format: '{0}'")]
    UnsupportedFormat(String),
}

impl GridError {
    /// True for the end-of-data sentinel.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, GridError::OutOfRange { .. })
    }
}

// =============================================================================
// Enrichment Errors
// =============================================================================

/// Errors while loading auxiliary enrichment data.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// IO error.
    #[error("Enrichment IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Enrichment JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Same stage listed twice.
    #[error("Stage '{0}' appears more than once in enrichment data")]
    DuplicateStage(String),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while validating or writing documents.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Output JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Embedded schema could not be compiled.
    #[error("Invalid document schema: {0}")]
    Schema(String),

    /// Document reference does not map to a path below the output root.
    #[error("Document '{0}' has no safe output path")]
    UnsafePath(String),

    /// Document failed envelope validation.
    #[error("Document '{id}' is invalid: {errors:?}")]
    Invalid { id: String, errors: Vec<String> },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::pipeline::convert`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Table source error.
    #[error("Table error: {0}")]
    Grid(#[from] GridError),

    /// Enrichment error.
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Zone layout file unreadable or malformed.
    #[error("Layout error: {0}")]
    Layout(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for table source operations.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for enrichment loading.
pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
