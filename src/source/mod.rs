//! Record sources feeding the pipeline
//!
//! # Error Handling Strategy
//!
//! - **Row-level failures**: A row that is not an object, or that holds nested arrays or
//!   objects, is logged and skipped so one bad row cannot break the run.
//!
//! - **Catastrophic failure detection**: If more than half of the rows fail, the source
//!   returns an error instead of handing a mostly-empty batch to the pipeline.
//!
//! - **Value coercion**: Strings are kept as-is, numbers and booleans are stringified and
//!   `null` cells are dropped, mirroring what a spreadsheet export contains.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{RawRecord, SourceInfo};
use crate::utils::validate_file_size;

/// Supplies the raw rows of one ingestion
pub trait RecordSource {
    fn fetch(&self) -> Result<Vec<RawRecord>>;
    fn info(&self) -> SourceInfo;
}

/// Reads a JSON export: an array of row objects keyed by column name
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    info: SourceInfo,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, info: SourceInfo) -> Self {
        Self { path: path.into(), info }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<RawRecord>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open records file: {}", self.path.display()))?;
        validate_file_size(&file, &self.path)?;

        let mut content = String::new();
        BufReader::new(file)
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read records file: {}", self.path.display()))?;

        let records = parse_records(&content)
            .with_context(|| format!("Failed to parse records file: {}", self.path.display()))?;
        info!(path = %self.path.display(), rows = records.len(), "Loaded raw records");
        Ok(records)
    }

    fn info(&self) -> SourceInfo {
        self.info.clone()
    }
}

/// Parse a JSON array of row objects into raw records
pub fn parse_records(content: &str) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_str(content).context("Records are not valid JSON")?;
    let Value::Array(rows) = value else {
        bail!("Expected a JSON array of row objects");
    };

    let total = rows.len();
    let mut records = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for (index, row) in rows.into_iter().enumerate() {
        match row_to_record(row) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(row = index + 1, reason, "Skipping malformed row");
                skipped += 1;
            }
        }
    }

    if total > 0 {
        let failure_rate = skipped as f64 / total as f64;
        if failure_rate > 0.5 {
            bail!(
                "Too many malformed rows: {} of {} failed ({:.1}%)",
                skipped,
                total,
                failure_rate * 100.0
            );
        }
    }

    Ok(records)
}

fn row_to_record(row: Value) -> Result<RawRecord, &'static str> {
    let Value::Object(map) = row else {
        return Err("row is not an object");
    };

    let mut record = RawRecord::new();
    for (key, value) in map {
        let cell = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => return Err("row has a nested value"),
        };
        record.insert(key, cell);
    }
    Ok(record)
}
