use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One raw row from the record source, keyed by column name.
///
/// A `BTreeMap` keeps keys sorted so serialization is canonical.
pub type RawRecord = BTreeMap<String, String>;

/// Where a batch of raw records came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub sheet_id: String,
    pub tab_name: String,
}

/// Body of a raw snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: String,
    pub sheet_id: String,
    pub tab_name: String,
    pub row_count: usize,
    pub content_hash: String,
    pub records: Vec<RawRecord>,
}

/// Pointer to the most recent snapshot file, rewritten on every save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPointer {
    pub file: String,
    pub hash: String,
    pub timestamp: String,
    pub row_count: usize,
}
