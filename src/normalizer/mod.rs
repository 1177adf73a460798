//! Raw record normalization and anomaly detection
//!
//! # Error Handling Strategy
//!
//! Normalization never fails because of bad rows:
//!
//! - **Row-level problems**: A missing column, text shorter than the configured minimum,
//!   or a timestamp matching none of the accepted formats skips that row. Skips are
//!   counted per reason and logged.
//!
//! - **Ordering**: Surviving entries are sorted ascending by timestamp with a stable sort,
//!   so rows sharing a timestamp keep their source order.
//!
//! - **Anomalies**: [`detect_anomalies`] works on the sorted sequence and reports day gaps
//!   and recent length spikes as plain strings that end up in the insight pack.

pub mod anomalies;
pub mod entries;
pub mod timestamps;

pub use anomalies::detect_anomalies;
pub use entries::{EntryNormalizer, NormalizedEntries, SkipCounts};
pub use timestamps::{logical_date, parse_timestamp};
