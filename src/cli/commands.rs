use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::config::{ConfigError, PipelineConfig};
use crate::models::SourceInfo;
use crate::normalizer::{EntryNormalizer, detect_anomalies};
use crate::pipeline::{Pipeline, RunReport, exit_codes, new_run_id};
use crate::source::{JsonFileSource, RecordSource};
use crate::utils::{default_config_path, format_path_with_tilde};
use crate::window::build_window;

#[derive(Parser)]
#[command(name = "diary-insights")]
#[command(version = "0.1.0")]
#[command(about = "Turn diary form responses into a structured insight pack", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write an insight pack
    Run {
        /// Records file to read instead of `source.records_path`
        #[arg(long, value_name = "PATH")]
        records: Option<PathBuf>,
    },
    /// Normalize records and preview the analysis window without calling the model
    Inspect {
        /// Records file to read instead of `source.records_path`
        #[arg(long, value_name = "PATH")]
        records: Option<PathBuf>,
    },
}

/// Execute the parsed command and return the process exit code
pub fn execute(cli: &Cli) -> u8 {
    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if err.downcast_ref::<ConfigError>().is_some() {
                exit_codes::INVALID_CONFIG
            } else {
                exit_codes::RUNTIME_FAILURE
            }
        }
    }
}

fn dispatch(cli: &Cli) -> Result<u8> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Run { records } => run_pipeline(&config, records.as_deref()),
        Commands::Inspect { records } => inspect(&config, records.as_deref()),
    }
}

/// Resolve configuration: explicit path, then the platform default if present, then defaults
fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let config = match explicit {
        Some(path) => PipelineConfig::load(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => PipelineConfig::load(&path)?,
            _ => PipelineConfig::default(),
        },
    };
    config.validate()?;
    Ok(config)
}

fn record_source(config: &PipelineConfig, records: Option<&Path>) -> JsonFileSource {
    let path = records.unwrap_or(config.source.records_path.as_path());
    let info = SourceInfo {
        sheet_id: config.source.sheet_id.clone(),
        tab_name: config.source.tab_name.clone(),
    };
    JsonFileSource::new(path, info)
}

fn run_pipeline(config: &PipelineConfig, records: Option<&Path>) -> Result<u8> {
    let source = record_source(config, records);
    let pipeline = Pipeline::from_config(config, &source)?;
    let rows = source.fetch()?;

    let run_id = new_run_id(Utc::now());
    let report = pipeline.run(&rows, &run_id)?;
    print_report(&report);

    Ok(report.status.exit_code())
}

fn print_report(report: &RunReport) {
    println!("Run {}: {:?}", report.run_id, report.status);
    println!("Valid entries: {} (skipped: {})", report.valid_entries, report.skipped.total());
    println!("Window: {} entries, {} chars", report.window_entries, report.window_chars);
    println!("Snapshot: {}", report.snapshot.file);
    println!("Entries audit: {}", format_path_with_tilde(&report.entries_path));
    println!("Insight pack: {}", format_path_with_tilde(&report.pack_path));
}

fn inspect(config: &PipelineConfig, records: Option<&Path>) -> Result<u8> {
    let source = record_source(config, records);
    let rows = source.fetch()?;

    let normalized = EntryNormalizer::new(config.normalizer.clone())?.normalize(&rows);
    let entries = &normalized.entries;
    let window = build_window(entries, config.window.char_budget, config.window.entry_overhead);
    let anomalies = detect_anomalies(entries);

    println!("Diary Records Inspection");
    println!("========================");
    println!("Records file: {}", format_path_with_tilde(source.path()));
    println!("Rows read: {}", rows.len());
    println!("Valid entries: {}", entries.len());
    println!("  Skipped (missing field): {}", normalized.skipped.missing_field);
    println!("  Skipped (too short): {}", normalized.skipped.too_short);
    println!("  Skipped (bad timestamp): {}", normalized.skipped.bad_timestamp);
    println!();
    println!(
        "Window: {} entries, {} of {} chars",
        window.entries.len(),
        window.total_chars,
        config.window.char_budget
    );
    if let (Some(first), Some(last)) = (window.entries.first(), window.entries.last()) {
        println!("Window dates: {} to {}", first.logical_date(), last.logical_date());
    }
    println!("Anomalies: {}", anomalies.len());
    for anomaly in &anomalies {
        println!("  - {}", anomaly);
    }

    if entries.is_empty() { Ok(exit_codes::NO_VALID_ENTRIES) } else { Ok(exit_codes::SUCCESS) }
}
