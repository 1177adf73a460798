//! Data models for the diary insight pipeline.
//!
//! - [`CanonicalEntry`] - One normalized diary entry with derived fields
//! - [`InsightPack`] - Structured output of one analysis run
//! - [`Snapshot`] / [`SnapshotPointer`] - Content-addressed raw input records
//!
//! Output models serialize with camelCase keys; raw records use a sorted map so
//! their JSON form is canonical and hashable.

pub mod entry;
pub mod insight;
pub mod snapshot;

pub use entry::{CanonicalEntry, fingerprint};
pub use insight::{DailySummary, InsightPack, PackMeta, Theme};
pub use snapshot::{RawRecord, Snapshot, SnapshotPointer, SourceInfo};
