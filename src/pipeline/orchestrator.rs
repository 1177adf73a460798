use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::outcome::{RunReport, RunStatus};
use crate::analyzer::{
    AnalyzerSettings, Delay, HttpModelClient, InsightAnalyzer, ModelClient, ThreadDelay,
};
use crate::config::{PipelineConfig, WindowConfig};
use crate::models::RawRecord;
use crate::normalizer::{EntryNormalizer, detect_anomalies};
use crate::source::RecordSource;
use crate::storage::{FsSnapshotStore, OutputWriter, SnapshotStore, SnapshotWriter};
use crate::window::build_window;

/// Run identifier: UTC start time plus a short random suffix
pub fn new_run_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..8])
}

/// Sequences snapshot, normalization, windowing, analysis and persistence
pub struct Pipeline<S, C, D = ThreadDelay> {
    snapshots: SnapshotWriter<S>,
    normalizer: EntryNormalizer,
    window: WindowConfig,
    analyzer: InsightAnalyzer<C, D>,
    outputs: OutputWriter,
}

impl Pipeline<FsSnapshotStore, HttpModelClient, ThreadDelay> {
    /// Build the production pipeline: filesystem storage and the HTTP model client
    ///
    /// The configuration must already be validated; this still fails if the API key
    /// is missing or the HTTP client cannot be built.
    pub fn from_config(config: &PipelineConfig, source: &dyn RecordSource) -> Result<Self> {
        let api_key = config.model.api_key()?;
        let client =
            HttpModelClient::new(&config.model.endpoint, &api_key, config.model.timeout())
                .context("Failed to build model client")?;

        Ok(Self::new(
            SnapshotWriter::new(
                FsSnapshotStore::new(&config.storage.snapshot_dir),
                source.info(),
                config.storage.dedup_snapshots,
            ),
            EntryNormalizer::new(config.normalizer.clone())?,
            config.window.clone(),
            InsightAnalyzer::new(client, ThreadDelay, AnalyzerSettings::from(&config.model)),
            OutputWriter::new(&config.storage.output_dir),
        ))
    }
}

impl<S: SnapshotStore, C: ModelClient, D: Delay> Pipeline<S, C, D> {
    pub fn new(
        snapshots: SnapshotWriter<S>,
        normalizer: EntryNormalizer,
        window: WindowConfig,
        analyzer: InsightAnalyzer<C, D>,
        outputs: OutputWriter,
    ) -> Self {
        Self { snapshots, normalizer, window, analyzer, outputs }
    }

    /// Run the pipeline over one batch of raw records
    ///
    /// Model failures never fail the run; they produce a fallback pack. Storage
    /// failures are returned as errors and leave already-written files in place.
    pub fn run(&self, records: &[RawRecord], run_id: &str) -> Result<RunReport> {
        let _span = info_span!("pipeline", run_id).entered();
        info!(rows = records.len(), "Starting run");

        let snapshot =
            self.snapshots.save_snapshot(records).context("Failed to save raw snapshot")?;

        let normalized = self.normalizer.normalize(records);
        let entries = normalized.entries;
        let detected_anomalies = detect_anomalies(&entries);
        if !detected_anomalies.is_empty() {
            info!(count = detected_anomalies.len(), "Detected entry anomalies");
        }

        let window = build_window(&entries, self.window.char_budget, self.window.entry_overhead);
        info!(
            selected = window.entries.len(),
            available = entries.len(),
            total_chars = window.total_chars,
            budget = self.window.char_budget,
            "Selected analysis window"
        );
        if window.entries.is_empty()
            && let Some(newest) = entries.last()
        {
            warn!(
                newest_chars = newest.length().saturating_add(self.window.entry_overhead),
                budget = self.window.char_budget,
                "Character budget excludes every entry, nothing will be analyzed"
            );
        }

        let mut pack = self.analyzer.analyze(&window.entries, run_id);
        let status = if entries.is_empty() {
            warn!("No valid entries after normalization");
            RunStatus::NoValidEntries
        } else if pack.is_fallback() {
            RunStatus::Fallback
        } else {
            pack.merge_anomalies(detected_anomalies.clone());
            RunStatus::Success
        };

        let pack_path =
            self.outputs.persist(&pack, run_id).context("Failed to persist insight pack")?;
        let entries_path = self
            .outputs
            .save_entries_snapshot(&entries, run_id)
            .context("Failed to save entries audit")?;

        info!(status = ?status, pack = %pack_path.display(), "Run finished");

        Ok(RunReport {
            run_id: run_id.to_string(),
            status,
            snapshot,
            valid_entries: entries.len(),
            skipped: normalized.skipped,
            window_entries: window.entries.len(),
            window_chars: window.total_chars,
            detected_anomalies,
            pack_path,
            entries_path,
        })
    }
}
