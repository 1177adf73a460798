//! Pipeline configuration loaded from TOML.
//!
//! Every section and field has a built-in default, so an empty file (or no file
//! at all) yields a usable configuration apart from the model API key, which is
//! read from the environment variable named by `model.api_key_env`.
//!
//! [`PipelineConfig::validate`] runs before any I/O and returns a [`ConfigError`]
//! so the CLI can map configuration problems to their own exit code.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::utils::read_env_var;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("model API key environment variable `{0}` is not set")]
    MissingApiKey(String),
    #[error("failed to read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub normalizer: NormalizerConfig,
    pub window: WindowConfig,
    pub model: ModelConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSON export holding an array of row objects
    pub records_path: PathBuf,
    pub sheet_id: String,
    pub tab_name: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("data/records.json"),
            sheet_id: String::new(),
            tab_name: "Form Responses 1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub timestamp_field: String,
    pub text_field: String,
    pub min_text_length: usize,
    /// Entries stamped before this hour belong to the previous diary day
    pub early_morning_hour: u32,
    /// Offset applied to timestamps that carry no zone of their own
    pub utc_offset_minutes: i32,
    /// chrono format patterns, tried in order; the first that parses wins
    pub timestamp_formats: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            timestamp_field: "Timestamp".to_string(),
            text_field: "Diary".to_string(),
            min_text_length: 3,
            early_morning_hour: 3,
            utc_offset_minutes: 0,
            timestamp_formats: vec![
                "%m/%d/%Y %H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y/%m/%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S%:z".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub char_budget: usize,
    /// Per-entry formatting cost added to each entry's text length
    pub entry_overhead: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { char_budget: 12_000, entry_overhead: 50 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            temperature: 0.7,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, ConfigError> {
        read_env_var(&self.api_key_env)
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub snapshot_dir: PathBuf,
    pub output_dir: PathBuf,
    /// When false every snapshot is kept under a timestamped name
    pub dedup_snapshots: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/insights"),
            dedup_snapshots: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check ranges and required settings that need no I/O
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.normalizer;
        if n.timestamp_field.trim().is_empty() {
            return Err(invalid("normalizer.timestamp_field", "must not be empty"));
        }
        if n.text_field.trim().is_empty() {
            return Err(invalid("normalizer.text_field", "must not be empty"));
        }
        if n.timestamp_formats.is_empty() {
            return Err(invalid("normalizer.timestamp_formats", "at least one format is required"));
        }
        if n.early_morning_hour > 23 {
            return Err(invalid("normalizer.early_morning_hour", "must be between 0 and 23"));
        }
        if let Some(format) = n.timestamp_formats.iter().find(|f| !has_hour_specifier(f)) {
            return Err(ConfigError::Invalid {
                field: "normalizer.timestamp_formats",
                reason: format!("format `{}` has no hour specifier", format),
            });
        }
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&n.utc_offset_minutes) {
            return Err(invalid("normalizer.utc_offset_minutes", "must be within +/- 24h"));
        }
        if self.window.char_budget == 0 {
            return Err(invalid("window.char_budget", "must be greater than zero"));
        }
        if self.model.max_retries == 0 {
            return Err(invalid("model.max_retries", "at least one attempt is required"));
        }
        if self.model.timeout_secs == 0 {
            return Err(invalid("model.timeout_secs", "must be greater than zero"));
        }
        if self.model.endpoint.trim().is_empty() {
            return Err(invalid("model.endpoint", "must not be empty"));
        }
        if self.model.model.trim().is_empty() {
            return Err(invalid("model.model", "must not be empty"));
        }
        Ok(())
    }
}

/// Chrono specifiers that carry the hour of day
const HOUR_SPECIFIERS: [&str; 10] = ["%H", "%I", "%k", "%l", "%T", "%R", "%X", "%c", "%+", "%s"];

/// Largest accepted `utc_offset_minutes` magnitude
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

fn has_hour_specifier(format: &str) -> bool {
    HOUR_SPECIFIERS.iter().any(|spec| format.contains(spec))
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}
