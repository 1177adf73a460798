//! Run outputs: insight pack JSON, latest themes CSV, entries audit

use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::models::{CanonicalEntry, InsightPack};
use crate::utils::write_atomic;

const THEMES_CSV_FILENAME: &str = "latest_themes.csv";
const THEMES_CSV_HEADER: &str = "Theme,Support,Run ID,Generated At";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntriesAudit<'a> {
    run_id: &'a str,
    entry_count: usize,
    entries: Vec<EntryAuditRecord<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryAuditRecord<'a> {
    entry_id: &'a str,
    logical_date: String,
    raw_timestamp: &'a str,
    length: usize,
    is_early_morning: bool,
}

/// Writes per-run artifacts into the output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn pack_path(&self, run_id: &str) -> PathBuf {
        self.output_dir.join(format!("insights_{}.json", run_id))
    }

    pub fn entries_path(&self, run_id: &str) -> PathBuf {
        self.output_dir.join(format!("entries_{}.json", run_id))
    }

    pub fn themes_csv_path(&self) -> PathBuf {
        self.output_dir.join(THEMES_CSV_FILENAME)
    }

    /// Write the pack as pretty JSON and, when it has themes, overwrite the latest themes CSV
    pub fn persist(&self, pack: &InsightPack, run_id: &str) -> Result<PathBuf> {
        let path = self.pack_path(run_id);
        let json = serde_json::to_vec_pretty(pack).context("Failed to serialize insight pack")?;
        write_atomic(&path, &json)?;
        info!(path = %path.display(), fallback = pack.is_fallback(), "Wrote insight pack");

        if !pack.themes.is_empty() {
            let csv_path = self.themes_csv_path();
            write_atomic(&csv_path, render_themes_csv(pack, run_id).as_bytes())?;
            info!(path = %csv_path.display(), themes = pack.themes.len(), "Wrote latest themes");
        }

        Ok(path)
    }

    /// Write a per-entry audit record of what this run saw
    pub fn save_entries_snapshot(&self, entries: &[CanonicalEntry], run_id: &str) -> Result<PathBuf> {
        let audit = EntriesAudit {
            run_id,
            entry_count: entries.len(),
            entries: entries
                .iter()
                .map(|entry| EntryAuditRecord {
                    entry_id: entry.id(),
                    logical_date: entry.logical_date().format("%Y-%m-%d").to_string(),
                    raw_timestamp: entry.raw_timestamp(),
                    length: entry.length(),
                    is_early_morning: entry.is_early_morning(),
                })
                .collect(),
        };

        let path = self.entries_path(run_id);
        let json = serde_json::to_vec_pretty(&audit).context("Failed to serialize entries audit")?;
        write_atomic(&path, &json)?;
        info!(path = %path.display(), entries = entries.len(), "Wrote entries audit");

        Ok(path)
    }
}

fn render_themes_csv(pack: &InsightPack, run_id: &str) -> String {
    let mut csv = String::from(THEMES_CSV_HEADER);
    csv.push('\n');
    for theme in &pack.themes {
        let support = theme.support.to_string();
        let fields = [theme.label.as_str(), support.as_str(), run_id, pack.meta.generated_at.as_str()];
        let line: Vec<Cow<'_, str>> = fields.iter().map(|f| csv_field(f)).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    csv
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
