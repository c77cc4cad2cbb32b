//! kwbfetch - Download CBS Kerncijfers Wijken en Buurten (KWB) data
//!
//! Resolves each requested year to its KWB dataset, follows OData v4
//! pagination, and writes one CSV file per year. Per-year failures are
//! reported and do not stop the remaining years.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use kwbfetch_cbs::{Outcome, RunSummary, catalog};

mod config;

use config::FileConfig;

#[derive(Parser)]
#[command(name = "kwbfetch")]
#[command(about = "Download CBS Kerncijfers Wijken en Buurten data via the OData API")]
#[command(version)]
#[command(after_help = shortcut_help())]
struct Cli {
    /// Years to download (e.g. 2020 2021 2022); 'all' or none for every catalog year
    years: Vec<String>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Measure codes or shortcuts to filter by (e.g. M001642 woz koopwoningen)
    #[arg(short, long, num_args = 1..)]
    measures: Vec<String>,

    /// List available KWB tables and exit (no network access)
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Config file path (default: ./kwbfetch.toml or ~/.config/kwbfetch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn shortcut_help() -> String {
    format!(
        "Available measure shortcuts: {}",
        catalog::shortcut_names().collect::<Vec<_>>().join(", ")
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect), with the log bridge in TTY mode
    let progress = Arc::new(kwbfetch_core::ProgressContext::new());
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    kwbfetch_core::init_logging(cli.debug, multi);

    let file_config = if let Some(path) = &cli.config {
        FileConfig::from_file(path)?
    } else {
        FileConfig::load()?
    };

    if cli.list {
        print_catalog(&file_config.odata.base_url);
        return Ok(());
    }

    // Malformed year tokens fail fast, before any network activity
    let years = parse_years(&cli.years)?;

    let measures: Vec<String> = cli
        .measures
        .iter()
        .map(|m| catalog::resolve_measure(m).to_string())
        .collect();
    // Suffix keeps the tokens as typed, so `-m woz` lands in kwb-2020-woz.csv
    let suffix = if cli.measures.is_empty() {
        String::new()
    } else {
        format!("-{}", cli.measures.join("-"))
    };

    let fetch_config = kwbfetch_cbs::Config {
        base_url: file_config.odata.base_url,
        output_dir: cli
            .output_dir
            .unwrap_or(file_config.output.default_dir),
        measures,
        suffix,
    };

    let summary = kwbfetch_cbs::run(&fetch_config, &years, progress);
    print_summary(&summary);

    // Per-year failures are reported above; the process still completes
    Ok(())
}

/// Expand CLI year tokens to a concrete year list.
///
/// Empty input or the single literal `all` selects every catalog year.
fn parse_years(tokens: &[String]) -> Result<Vec<u16>> {
    if tokens.is_empty() || tokens == ["all"] {
        return Ok(catalog::years().collect());
    }
    tokens
        .iter()
        .map(|t| {
            t.parse::<u16>()
                .with_context(|| format!("invalid year: '{t}'"))
        })
        .collect()
}

/// Print the catalog as a table on stderr; no network access.
fn print_catalog(base_url: &str) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Year").fg(Color::Cyan),
            Cell::new("Table ID").fg(Color::Cyan),
            Cell::new("OData URL").fg(Color::Cyan),
        ]);
    for (year, table_id) in catalog::entries() {
        table.add_row(vec![
            year.to_string(),
            table_id.to_string(),
            format!("{}/{table_id}", base_url.trim_end_matches('/')),
        ]);
    }
    eprintln!("\n{table}");
}

/// Print the per-year outcome table on stderr.
fn print_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Year").fg(Color::Cyan),
            Cell::new("Result").fg(Color::Cyan),
        ]);
    for r in &summary.results {
        let result = match &r.result {
            Ok(Outcome::Written { path, rows, pages }) => format!(
                "{} rows ({} pages) -> {}",
                kwbfetch_core::fmt_num(*rows),
                pages,
                path.display()
            ),
            Ok(Outcome::AlreadyExists(path)) => format!("already exists: {}", path.display()),
            Ok(Outcome::NoRows { .. }) => "no rows returned".to_string(),
            Err(e) => format!("failed: {e}"),
        };
        table.add_row(vec![r.year.to_string(), result]);
    }
    eprintln!("\n{table}");
}
