//! Snapshot and output persistence
//!
//! Raw input is stored content-addressed: the snapshot key is the SHA-256 of the
//! canonical record JSON, so re-running against an unchanged source writes no new
//! body. A pointer file (`latest_snapshot.json`) is rewritten on every save.
//!
//! Run outputs live in the output directory:
//! - `insights_<run_id>.json`: the insight pack
//! - `latest_themes.csv`: themes of the latest run that produced any
//! - `entries_<run_id>.json`: per-entry audit record
//!
//! Every file is written atomically (temp file + rename). Failures propagate and
//! are fatal for the run.

pub mod outputs;
pub mod snapshots;
pub mod store;

pub use outputs::OutputWriter;
pub use snapshots::{SnapshotWriter, content_hash};
pub use store::{FsSnapshotStore, MemorySnapshotStore, SnapshotStore, snapshot_file_name};
