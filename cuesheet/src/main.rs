//! Cuesheet CLI - Convert performance cue tables to JSON-LD documents
//!
//! # Main Commands
//!
//! ```bash
//! cuesheet convert cues.xlsx --enrichment cues.json   # Write documents under d/
//! cuesheet convert cues.csv --dry-run                 # Generate and validate only
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! cuesheet dump cues.csv --from 0 --to 5   # Print raw rows as JSON
//! cuesheet analyze cues.tsv                # Print stage records as JSON
//! ```

use clap::{Parser, Subcommand};
use cuesheet::{convert, load_layout, load_stages, open_grid, CellSource, CellValue, ConvertOptions, Dialect};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "cuesheet")]
#[command(about = "Convert performance cue tables to linked-data documents", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print table rows as a JSON array of arrays
    Dump {
        /// Input table (.csv, .tsv, .xlsx, .ods, ...)
        input: PathBuf,

        /// Delimited-text dialect: excel, excel-tab, unix or one delimiter character (sniffed if not specified)
        #[arg(short, long, value_parser = parse_dialect)]
        dialect: Option<Dialect>,

        /// First row
        #[arg(long, default_value = "0")]
        from: usize,

        /// Row to stop before (default: end of data)
        #[arg(long)]
        to: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the stage records of a table as JSON
    Analyze {
        /// Input table
        input: PathBuf,

        /// Delimited-text dialect (sniffed if not specified)
        #[arg(short, long, value_parser = parse_dialect)]
        dialect: Option<Dialect>,

        /// Zone layout JSON file (default: K..S auto block, mc1:..mc5: markers, or CUESHEET_LAYOUT)
        #[arg(short, long)]
        layout: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full conversion: table → documents under the output directory
    Convert {
        /// Input table
        input: PathBuf,

        /// Delimited-text dialect (sniffed if not specified)
        #[arg(short, long, value_parser = parse_dialect)]
        dialect: Option<Dialect>,

        /// Enrichment JSON file
        #[arg(short, long)]
        enrichment: Option<PathBuf>,

        /// Zone layout JSON file
        #[arg(short, long)]
        layout: Option<PathBuf>,

        /// Output directory (default: d, or CUESHEET_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip validation
        #[arg(long)]
        no_validate: bool,

        /// Generate and validate without writing
        #[arg(long)]
        dry_run: bool,

        /// Write the conversion report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
}

fn parse_dialect(value: &str) -> Result<Dialect, String> {
    value.parse().map_err(|e: cuesheet::GridError| e.to_string())
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Dump {
            input,
            dialect,
            from,
            to,
            output,
        } => cmd_dump(&input, dialect, from, to, output.as_deref()),

        Commands::Analyze {
            input,
            dialect,
            layout,
            output,
        } => cmd_analyze(&input, dialect, layout.as_deref(), output.as_deref()),

        Commands::Convert {
            input,
            dialect,
            enrichment,
            layout,
            output_dir,
            no_validate,
            dry_run,
            report,
        } => cmd_convert(
            input,
            dialect,
            enrichment,
            layout.as_deref(),
            output_dir,
            no_validate,
            dry_run,
            report.as_deref(),
        ),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cuesheet={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

fn cmd_dump(
    input: &Path,
    dialect: Option<Dialect>,
    from: usize,
    to: Option<usize>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let grid = open_grid(input, dialect)?;
    let rows = match to {
        Some(to) => grid.rows_between(from, to),
        None => grid.rows(from),
    };

    let mut table: Vec<Vec<CellValue>> = Vec::new();
    for row in rows {
        table.push(row?.values()?);
    }
    eprintln!("📄 {} rows", table.len());

    let json = serde_json::to_string_pretty(&table)?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_analyze(
    input: &Path,
    dialect: Option<Dialect>,
    layout: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConvertOptions::from_env();
    let layout = match layout {
        Some(path) => load_layout(path)?,
        None => options.layout,
    };
    let (_, stages) = load_stages(input, dialect.or(options.dialect), &layout)?;

    let json = serde_json::to_string_pretty(&stages)?;
    write_output(&json, output)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_convert(
    input: PathBuf,
    dialect: Option<Dialect>,
    enrichment: Option<PathBuf>,
    layout: Option<&Path>,
    output_dir: Option<PathBuf>,
    no_validate: bool,
    dry_run: bool,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = ConvertOptions::from_env();
    let layout = match layout {
        Some(path) => load_layout(path)?,
        None => defaults.layout,
    };
    let options = ConvertOptions {
        input,
        dialect: dialect.or(defaults.dialect),
        enrichment: enrichment.or(defaults.enrichment),
        output_dir: output_dir.unwrap_or(defaults.output_dir),
        validate: !no_validate,
        dry_run,
        layout,
    };

    let report = convert(&options)?;

    eprintln!("\n📊 Results:");
    eprintln!("   Stages: {}", report.stages);
    eprintln!("   Documents: {}", report.documents.len());
    if options.dry_run {
        eprintln!("   (dry run, nothing written)");
    } else {
        eprintln!("   Written: {} under {}", report.documents_written, options.output_dir.display());
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        write_output(&json, Some(path))?;
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
