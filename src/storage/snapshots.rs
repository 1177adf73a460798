//! Content-addressed raw record snapshots

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use tracing::info;

use super::store::{SnapshotStore, snapshot_file_name};
use crate::models::{RawRecord, Snapshot, SnapshotPointer, SourceInfo};

/// SHA-256 over the canonical JSON form of the records.
///
/// Record keys are held in sorted maps, so the hash does not depend on the key
/// order of the source.
pub fn content_hash(records: &[RawRecord]) -> Result<String> {
    let canonical = serde_json::to_vec(records).context("Failed to serialize records for hashing")?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

/// Writes raw record snapshots into a [`SnapshotStore`]
pub struct SnapshotWriter<S> {
    store: S,
    source: SourceInfo,
    dedup: bool,
}

impl<S: SnapshotStore> SnapshotWriter<S> {
    /// With `dedup` off every save gets its own `<timestamp>_<hash>` key
    pub fn new(store: S, source: SourceInfo, dedup: bool) -> Self {
        Self { store, source, dedup }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save_snapshot(&self, records: &[RawRecord]) -> Result<SnapshotPointer> {
        self.save_snapshot_at(records, Utc::now())
    }

    /// Save a snapshot as of `now`
    ///
    /// An existing body under the same key is left untouched; the pointer is
    /// rewritten on every call either way.
    pub fn save_snapshot_at(
        &self,
        records: &[RawRecord],
        now: DateTime<Utc>,
    ) -> Result<SnapshotPointer> {
        let hash = content_hash(records)?;
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let key = if self.dedup {
            hash.clone()
        } else {
            format!("{}_{}", now.format("%Y%m%dT%H%M%SZ"), hash)
        };

        if self.store.exists(&key)? {
            info!(hash = %short(&hash), rows = records.len(), "Snapshot unchanged, reusing");
        } else {
            let snapshot = Snapshot {
                timestamp: timestamp.clone(),
                sheet_id: self.source.sheet_id.clone(),
                tab_name: self.source.tab_name.clone(),
                row_count: records.len(),
                content_hash: hash.clone(),
                records: records.to_vec(),
            };
            let body = serde_json::to_vec_pretty(&snapshot).context("Failed to serialize snapshot")?;
            self.store.write(&key, &body)?;
            info!(hash = %short(&hash), rows = records.len(), "Wrote new snapshot");
        }

        let pointer = SnapshotPointer {
            file: snapshot_file_name(&key),
            hash,
            timestamp,
            row_count: records.len(),
        };
        self.store.write_pointer(&pointer)?;

        Ok(pointer)
    }
}

fn short(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
