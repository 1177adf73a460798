use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of leading text characters that feed the entry fingerprint
pub const FINGERPRINT_TEXT_PREFIX: usize = 64;

const FINGERPRINT_HEX_LEN: usize = 16;

/// One diary entry after normalization.
///
/// Fields are private so `length` and `id` always agree with `text` and
/// `raw_timestamp`; once built an entry is only read, copied or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEntry {
    raw_timestamp: String,
    timestamp: DateTime<FixedOffset>,
    epoch_millis: i64,
    logical_date: NaiveDate,
    text: String,
    length: usize,
    id: String,
    is_early_morning: bool,
}

impl CanonicalEntry {
    /// Build an entry, deriving `epoch_millis`, `length` and `id`.
    ///
    /// `text` is trimmed here so callers cannot break the length invariant.
    pub fn new(
        raw_timestamp: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        logical_date: NaiveDate,
        text: &str,
        is_early_morning: bool,
    ) -> Self {
        let raw_timestamp = raw_timestamp.into();
        let text = text.trim().to_string();
        let id = fingerprint(&raw_timestamp, &text);
        Self {
            epoch_millis: timestamp.timestamp_millis(),
            length: text.chars().count(),
            raw_timestamp,
            timestamp,
            logical_date,
            text,
            id,
            is_early_morning,
        }
    }

    pub fn raw_timestamp(&self) -> &str {
        &self.raw_timestamp
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }

    pub fn logical_date(&self) -> NaiveDate {
        self.logical_date
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_early_morning(&self) -> bool {
        self.is_early_morning
    }
}

/// Fingerprint an entry from its raw timestamp and the first 64 characters of its text.
///
/// This is a re-export detector, not a collision-resistant identity: two entries
/// sharing a timestamp and a 64-character prefix get the same id.
pub fn fingerprint(raw_timestamp: &str, text: &str) -> String {
    let prefix: String = text.chars().take(FINGERPRINT_TEXT_PREFIX).collect();
    let mut hasher = Sha256::new();
    hasher.update(raw_timestamp.as_bytes());
    hasher.update(prefix.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_HEX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_trims_text_and_counts_chars() {
        let entry = CanonicalEntry::new(
            "2024-03-10 12:00:00",
            at(12),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            "  今天下雨了  ",
            false,
        );
        assert_eq!(entry.text(), "今天下雨了");
        assert_eq!(entry.length(), 5);
        assert_eq!(entry.epoch_millis(), at(12).timestamp_millis());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint("2024-03-10 12:00:00", "walked to the river");
        let b = fingerprint("2024-03-10 12:00:00", "walked to the river");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_fingerprint_changes_with_timestamp() {
        let a = fingerprint("2024-03-10 12:00:00", "same text");
        let b = fingerprint("2024-03-10 12:00:01", "same text");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_text_past_prefix() {
        // Known collision boundary: only the first 64 characters are hashed
        let base = "x".repeat(FINGERPRINT_TEXT_PREFIX);
        let a = fingerprint("ts", &format!("{base}tail one"));
        let b = fingerprint("ts", &format!("{base}a different tail"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_entry_id_matches_fingerprint_of_trimmed_text() {
        let entry = CanonicalEntry::new(
            "raw",
            at(9),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            "\thello there\n",
            false,
        );
        assert_eq!(entry.id(), fingerprint("raw", "hello there"));
    }
}
