//! High-level pipeline API: cue table to entity documents.
//!
//! This module combines all steps: opening the table, analysis, enrichment
//! loading, document generation, validation and writing.
//!
//! # Example
//!
//! ```rust,ignore
//! use cuesheet::pipeline::{convert, ConvertOptions};
//!
//! let options = ConvertOptions {
//!     input: "cues.xlsx".into(),
//!     enrichment: Some("cues.json".into()),
//!     ..ConvertOptions::from_env()
//! };
//! let report = convert(&options)?;
//! println!("Wrote {} documents", report.documents_written);
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::analyze::{analyze_table, ZoneLayout};
use crate::error::{PipelineError, PipelineResult};
use crate::grid::{open_grid, CellSource, Dialect, SourceFormat};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_success_indent, log_warning};
use crate::meld::{generate_documents, EnrichmentIndex};
use crate::models::StageRecord;
use crate::output::{DocumentValidator, DocumentWriter};

/// Environment variable overriding the output directory.
pub const ENV_OUTPUT_DIR: &str = "CUESHEET_OUTPUT_DIR";
/// Environment variable naming the enrichment file.
pub const ENV_ENRICHMENT: &str = "CUESHEET_ENRICHMENT";
/// Environment variable giving the delimited-text dialect.
pub const ENV_DIALECT: &str = "CUESHEET_DIALECT";
/// Environment variable naming a zone layout JSON file.
pub const ENV_LAYOUT: &str = "CUESHEET_LAYOUT";

/// Options for a conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Table file
    pub input: PathBuf,

    /// Dialect of a delimited table (sniffed if not specified)
    pub dialect: Option<Dialect>,

    /// Enrichment JSON file
    pub enrichment: Option<PathBuf>,

    /// Root directory for documents
    pub output_dir: PathBuf,

    /// Column zone conventions of the table
    pub layout: ZoneLayout,

    /// Validate documents before writing
    pub validate: bool,

    /// Generate and validate without writing
    pub dry_run: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            dialect: None,
            enrichment: None,
            output_dir: PathBuf::from("d"),
            layout: ZoneLayout::default(),
            validate: true,
            dry_run: false,
        }
    }
}

impl ConvertOptions {
    /// Defaults overridden by `CUESHEET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `CUESHEET_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            options.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(ENV_ENRICHMENT).filter(|v| !v.is_empty()) {
            options.enrichment = Some(PathBuf::from(path));
        }
        if let Some(dialect) = lookup(ENV_DIALECT).filter(|v| !v.is_empty()) {
            match dialect.parse() {
                Ok(dialect) => options.dialect = Some(dialect),
                Err(e) => log_warning(format!("Ignoring {ENV_DIALECT}: {e}")),
            }
        }
        if let Some(path) = lookup(ENV_LAYOUT).filter(|v| !v.is_empty()) {
            match load_layout(Path::new(&path)) {
                Ok(layout) => options.layout = layout,
                Err(e) => log_warning(format!("Ignoring {ENV_LAYOUT}: {e}")),
            }
        }
        options
    }
}

/// Read a [`ZoneLayout`] from a JSON file.
pub fn load_layout(path: &Path) -> PipelineResult<ZoneLayout> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::Layout(format!("{}: {e}", path.display())))?;
    let layout = ZoneLayout::from_json(&content)
        .map_err(|e| PipelineError::Layout(format!("{}: {e}", path.display())))?;
    log_success(format!("Zone layout from {}", path.display()));
    Ok(layout)
}

/// Table source information
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub format: SourceFormat,
    /// Dialect used, for delimited tables
    pub dialect: Option<Dialect>,
    pub rows: usize,
    pub cols: usize,
}

/// Result of a conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source: SourceInfo,

    /// Number of stage records
    pub stages: usize,

    /// References of all generated documents, in generation order
    pub documents: Vec<String>,

    /// Number of files written (0 on a dry run)
    pub documents_written: usize,
}

/// Open a table and extract its stage records.
///
/// A table without any stage row yields no records and a warning.
pub fn load_stages(
    path: &Path,
    dialect: Option<Dialect>,
    layout: &ZoneLayout,
) -> PipelineResult<(SourceInfo, Vec<StageRecord>)> {
    log_info(format!("📖 Reading table {}", path.display()));
    let grid = open_grid(path, dialect)?;
    let (rows, cols) = grid.extent();
    let source = SourceInfo {
        path: path.to_path_buf(),
        format: grid.format(),
        dialect: grid.dialect(),
        rows,
        cols,
    };
    log_success(format!("Format: {}", source.format));
    if let Some(dialect) = source.dialect {
        log_success(format!("Dialect: {dialect}"));
    }
    log_success(format!("{rows} rows, {cols} columns"));

    log_info("🔍 Analyzing stages...");
    let stages = analyze_table(&grid, layout)?;
    if stages.is_empty() {
        log_warning("No stage rows found, nothing to convert");
    } else {
        log_success(format!("{} stages", stages.len()));
    }
    Ok((source, stages))
}

/// Run the full conversion.
pub fn convert(options: &ConvertOptions) -> PipelineResult<ConversionReport> {
    let (source, stages) = load_stages(&options.input, options.dialect, &options.layout)?;

    let enrichment = match &options.enrichment {
        Some(path) => {
            log_info(format!("📚 Loading enrichment data {}", path.display()));
            let index = EnrichmentIndex::load(path)?;
            log_success_indent(format!("{} stages enriched", index.len()), 1);
            index
        }
        None => {
            log_warning("No enrichment data, codes get default labels and types");
            EnrichmentIndex::default()
        }
    };

    log_info("⚙️  Generating documents...");
    let documents = generate_documents(&stages, &enrichment);
    log_success(format!("{} documents", documents.len()));

    if options.validate {
        log_info("✔️  Validating documents...");
        let validator = DocumentValidator::new()?;
        for doc in &documents {
            if let Err(e) = validator.validate(doc) {
                log_error(e.to_string());
                return Err(e.into());
            }
        }
        log_success("All documents valid");
    }

    let mut documents_written = 0;
    if options.dry_run {
        log_info("Dry run, nothing written");
    } else {
        log_info(format!("💾 Writing to {}", options.output_dir.display()));
        let writer = DocumentWriter::new(&options.output_dir);
        for doc in &documents {
            let path = writer.write(doc)?;
            log_info_indent(path.display().to_string(), 1);
            documents_written += 1;
        }
        log_success(format!("{documents_written} documents written"));
    }

    Ok(ConversionReport {
        source,
        stages: stages.len(),
        documents: documents.iter().map(|doc| doc.reference()).collect(),
        documents_written,
    })
}
