//! Diary Insights - turn diary form responses into a structured insight pack
//!
//! This library runs a single-shot batch pipeline over raw diary records:
//!
//! - Snapshotting the raw rows into content-addressed storage
//! - Normalizing rows into canonical entries, including the early-morning date rule
//! - Detecting gaps and length spikes across the entry history
//! - Selecting the most recent entries that fit a character budget
//! - Asking a chat-completion model for insights, with bounded retry and fallback
//! - Persisting the insight pack, a themes CSV and an entries audit
//!
//! # Example
//!
//! ```no_run
//! use diary_insights::{JsonFileSource, PipelineConfig, RecordSource, format_path_with_tilde};
//! use diary_insights::pipeline::{Pipeline, new_run_id};
//!
//! let config = PipelineConfig::default();
//! let source = JsonFileSource::new(&config.source.records_path, Default::default());
//! let pipeline = Pipeline::from_config(&config, &source)?;
//! let report = pipeline.run(&source.fetch()?, &new_run_id(chrono::Utc::now()))?;
//! println!("Wrote {}", format_path_with_tilde(&report.pack_path));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod utils;
pub mod window;

// Re-export commonly used types
pub use config::{ConfigError, PipelineConfig};
pub use models::{CanonicalEntry, InsightPack};
pub use normalizer::{EntryNormalizer, detect_anomalies};
pub use pipeline::{Pipeline, RunReport, RunStatus};
pub use source::{JsonFileSource, RecordSource};
pub use utils::paths::format_path_with_tilde;
pub use window::build_window;
