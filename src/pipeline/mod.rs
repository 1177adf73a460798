//! Pipeline orchestration
//!
//! # Error Handling Strategy
//!
//! - **Bad rows**: skipped and counted by the normalizer; the run continues.
//! - **Model failures**: absorbed by the analyzer, which returns a fallback pack. The run
//!   still persists its outputs and reports [`RunStatus::Fallback`].
//! - **No usable entries**: the analyzer is handed an empty window, which yields a fallback
//!   pack without a network call; the run reports [`RunStatus::NoValidEntries`].
//! - **Storage failures**: returned as errors with context. Files written before the
//!   failure stay on disk; there is no rollback across files.
//!
//! Pipeline-detected anomalies are appended to complete packs only, so a fallback pack
//! carries nothing but metadata.

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::{Pipeline, new_run_id};
pub use outcome::{RunReport, RunStatus, exit_codes};
