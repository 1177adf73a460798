use std::collections::HashSet;

use anyhow::{Result, anyhow};
use chrono::FixedOffset;
use tracing::{debug, info, warn};

use super::timestamps::{logical_date, parse_timestamp};
use crate::config::NormalizerConfig;
use crate::models::{CanonicalEntry, RawRecord};

/// Per-reason counts of records that did not become entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub missing_field: usize,
    pub too_short: usize,
    pub bad_timestamp: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.missing_field + self.too_short + self.bad_timestamp
    }
}

/// Normalization result: entries sorted ascending by timestamp, plus what was dropped
#[derive(Debug, Clone, Default)]
pub struct NormalizedEntries {
    pub entries: Vec<CanonicalEntry>,
    pub skipped: SkipCounts,
}

/// Converts raw rows into canonical entries using the configured field names and formats
#[derive(Debug, Clone)]
pub struct EntryNormalizer {
    config: NormalizerConfig,
    offset: FixedOffset,
}

enum Rejection {
    MissingField(&'static str),
    TooShort(usize),
    BadTimestamp,
}

impl EntryNormalizer {
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        let offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow!("UTC offset out of range: {} minutes", config.utc_offset_minutes)
            })?;
        Ok(Self { config, offset })
    }

    /// Normalize raw records into canonical entries
    ///
    /// Never fails on bad input: records with missing fields, text shorter than
    /// `min_text_length`, or a timestamp matching none of the formats are skipped
    /// and counted. The output keeps raw-record order among equal timestamps.
    pub fn normalize(&self, records: &[RawRecord]) -> NormalizedEntries {
        let mut entries = Vec::with_capacity(records.len());
        let mut skipped = SkipCounts::default();

        for (index, record) in records.iter().enumerate() {
            match self.normalize_record(record) {
                Ok(entry) => entries.push(entry),
                Err(Rejection::MissingField(field)) => {
                    warn!(row = index + 1, field, "Skipping record: missing field");
                    skipped.missing_field += 1;
                }
                Err(Rejection::TooShort(length)) => {
                    debug!(row = index + 1, length, "Skipping record: text too short");
                    skipped.too_short += 1;
                }
                Err(Rejection::BadTimestamp) => {
                    warn!(
                        row = index + 1,
                        raw = ?record.get(&self.config.timestamp_field),
                        "Skipping record: unparseable timestamp"
                    );
                    skipped.bad_timestamp += 1;
                }
            }
        }

        entries.sort_by_key(|entry| entry.timestamp());
        report_duplicate_ids(&entries);

        info!(
            valid = entries.len(),
            skipped = skipped.total(),
            missing_field = skipped.missing_field,
            too_short = skipped.too_short,
            bad_timestamp = skipped.bad_timestamp,
            "Normalized diary records"
        );

        NormalizedEntries { entries, skipped }
    }

    fn normalize_record(&self, record: &RawRecord) -> Result<CanonicalEntry, Rejection> {
        let raw_text = record
            .get(&self.config.text_field)
            .ok_or(Rejection::MissingField("text"))?;
        let raw_timestamp = record
            .get(&self.config.timestamp_field)
            .ok_or(Rejection::MissingField("timestamp"))?;

        let text = raw_text.trim();
        let length = text.chars().count();
        if length < self.config.min_text_length {
            return Err(Rejection::TooShort(length));
        }

        let timestamp = parse_timestamp(raw_timestamp, &self.config.timestamp_formats, self.offset)
            .ok_or(Rejection::BadTimestamp)?;
        let (date, is_early_morning) = logical_date(&timestamp, self.config.early_morning_hour);

        Ok(CanonicalEntry::new(raw_timestamp.as_str(), timestamp, date, text, is_early_morning))
    }
}

fn report_duplicate_ids(entries: &[CanonicalEntry]) {
    let mut seen = HashSet::with_capacity(entries.len());
    let duplicates = entries.iter().filter(|entry| !seen.insert(entry.id())).count();
    if duplicates > 0 {
        warn!(duplicates, "Records share an entry fingerprint (likely re-exported rows)");
    }
}
