//! # Cuesheet - performance cue tables to linked-data documents
//!
//! Cuesheet reads a cue table (CSV, TSV or a spreadsheet) describing the
//! stages of an interactive performance and the actions triggered in each,
//! and emits one JSON-LD entity document per stage, score, action bundle,
//! code and event template.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Table File  │────▶│    Grid     │────▶│   Analyze   │────▶│    Meld     │
//! │ (csv/xlsx)  │     │ (cells/rows)│     │  (zones)    │     │ (documents) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                          ┌─────────────┐           │
//!                                          │   Output    │◀──────────┘
//!                                          │ (validated) │
//!                                          └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cuesheet::{convert, ConvertOptions};
//!
//! let options = ConvertOptions { input: "cues.xlsx".into(), ..Default::default() };
//! let report = convert(&options).unwrap();
//! println!("Converted {} stages", report.stages);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`grid`] - Cell sources, row views and table iteration
//! - [`analyze`] - Column resolution, zone carving, stage extraction
//! - [`models`] - Stage, action and enrichment records
//! - [`meld`] - Document generation
//! - [`output`] - Document validation and writing
//! - [`pipeline`] - End-to-end conversion
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Table access
pub mod grid;

// Analysis
pub mod analyze;

// Documents
pub mod meld;
pub mod output;

// Orchestration
pub mod logs;
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    EnrichmentError, GridError, OutputError, PipelineError, PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ActionFields,
    AutoActionRecord,
    CodeActionRecord,
    ColumnZone,
    StageRecord,
};

// =============================================================================
// Re-exports - Grid
// =============================================================================

pub use grid::{
    open_grid,
    CellSource,
    CellValue,
    Dialect,
    Grid,
    GridRow,
    Rows,
    SourceFormat,
};

// =============================================================================
// Re-exports - Analysis
// =============================================================================

pub use analyze::{analyze_table, HeaderRow, TableAnalyzer, ZoneLayout};

// =============================================================================
// Re-exports - Documents
// =============================================================================

pub use meld::{generate_documents, make_id, EnrichmentIndex, EntityDocument};
pub use output::{DocumentValidator, DocumentWriter};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{convert, load_layout, load_stages, ConversionReport, ConvertOptions, SourceInfo};
