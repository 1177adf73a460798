use std::path::PathBuf;

use crate::models::SnapshotPointer;
use crate::normalizer::SkipCounts;

/// Process exit codes, one per run outcome
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const RUNTIME_FAILURE: u8 = 1;
    pub const INVALID_CONFIG: u8 = 2;
    pub const NO_VALID_ENTRIES: u8 = 3;
    pub const FALLBACK: u8 = 4;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The model produced a complete pack
    Success,
    /// Every model attempt failed; a fallback pack was written
    Fallback,
    /// No record survived normalization; a fallback pack was written
    NoValidEntries,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Success => exit_codes::SUCCESS,
            RunStatus::Fallback => exit_codes::FALLBACK,
            RunStatus::NoValidEntries => exit_codes::NO_VALID_ENTRIES,
        }
    }
}

/// What one pipeline run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub status: RunStatus,
    pub snapshot: SnapshotPointer,
    pub valid_entries: usize,
    pub skipped: SkipCounts,
    pub window_entries: usize,
    pub window_chars: usize,
    pub detected_anomalies: Vec<String>,
    pub pack_path: PathBuf,
    pub entries_path: PathBuf,
}
