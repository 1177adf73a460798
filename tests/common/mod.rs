//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Environment variable the generated configs read the model key from
pub const TEST_API_KEY_ENV: &str = "DIARY_INSIGHTS_IT_API_KEY";
pub const TEST_API_KEY: &str = "it-test-key";
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Builder for a temporary pipeline workspace: records file, config and storage dirs
pub struct WorkspaceBuilder {
    temp_dir: TempDir,
    records: Vec<Value>,
    endpoint: String,
    max_retries: usize,
    char_budget: usize,
    dedup_snapshots: bool,
}

impl WorkspaceBuilder {
    /// Create a new builder with no records and an unreachable model endpoint
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            records: Vec::new(),
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            max_retries: 2,
            char_budget: 12_000,
            dedup_snapshots: true,
        }
    }

    /// Add diary records
    pub fn with_records(mut self, records: &[RecordBuilder]) -> Self {
        self.records.extend(records.iter().map(RecordBuilder::to_json));
        self
    }

    /// Add a raw JSON row as-is
    pub fn with_raw_row(mut self, row: Value) -> Self {
        self.records.push(row);
        self
    }

    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn char_budget(mut self, char_budget: usize) -> Self {
        self.char_budget = char_budget;
        self
    }

    pub fn dedup_snapshots(mut self, dedup: bool) -> Self {
        self.dedup_snapshots = dedup;
        self
    }

    /// Write `records.json` and `config.toml` and return the workspace
    pub fn build(self) -> Workspace {
        let root = self.temp_dir.path();
        let records_path = root.join("records.json");
        fs::write(&records_path, serde_json::to_string_pretty(&self.records).unwrap())
            .expect("Failed to write records.json");

        let config = format!(
            r#"
[source]
records_path = "{records}"
sheet_id = "sheet-it"
tab_name = "Form Responses 1"

[window]
char_budget = {budget}

[model]
endpoint = "{endpoint}"
api_key_env = "{key_env}"
timeout_secs = 5
max_retries = {retries}

[storage]
snapshot_dir = "{raw}"
output_dir = "{out}"
dedup_snapshots = {dedup}
"#,
            records = toml_path(&records_path),
            budget = self.char_budget,
            endpoint = self.endpoint,
            key_env = TEST_API_KEY_ENV,
            retries = self.max_retries,
            raw = toml_path(&root.join("raw")),
            out = toml_path(&root.join("insights")),
            dedup = self.dedup_snapshots,
        );
        fs::write(root.join("config.toml"), config).expect("Failed to write config.toml");

        Workspace { temp_dir: self.temp_dir }
    }
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

/// A built workspace; the directory is removed on drop
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn records_path(&self) -> PathBuf {
        self.path().join("records.json")
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.path().join("raw")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("insights")
    }

    /// Files in the output directory whose names start with `prefix`
    pub fn outputs_with_prefix(&self, prefix: &str) -> Vec<PathBuf> {
        list_with_prefix(&self.output_dir(), prefix)
    }

    pub fn snapshots(&self) -> Vec<PathBuf> {
        list_with_prefix(&self.snapshot_dir(), "snapshot_")
    }
}

fn list_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    paths.sort();
    paths
}

/// Builder for one diary form row
pub struct RecordBuilder {
    timestamp: Option<String>,
    diary: Option<String>,
    extra: Vec<(String, String)>,
}

impl RecordBuilder {
    /// Create a record with default values
    pub fn new() -> Self {
        Self {
            timestamp: Some("2024-03-10 09:00:00".to_string()),
            diary: Some("A quiet morning with tea".to_string()),
            extra: Vec::new(),
        }
    }

    /// Set the raw timestamp cell
    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    /// Set the diary text cell
    pub fn diary(mut self, diary: &str) -> Self {
        self.diary = Some(diary.to_string());
        self
    }

    /// Drop the diary column entirely
    pub fn without_diary(mut self) -> Self {
        self.diary = None;
        self
    }

    /// Add an unrelated form column
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.extra.push((key.to_string(), value.to_string()));
        self
    }

    /// Convert to a JSON row object
    pub fn to_json(&self) -> Value {
        let mut row = serde_json::Map::new();
        if let Some(ts) = &self.timestamp {
            row.insert("Timestamp".to_string(), Value::String(ts.clone()));
        }
        if let Some(diary) = &self.diary {
            row.insert("Diary".to_string(), Value::String(diary.clone()));
        }
        for (key, value) in &self.extra {
            row.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(row)
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Two valid entries on consecutive days
pub fn two_day_records() -> Vec<RecordBuilder> {
    vec![
        RecordBuilder::new().timestamp("2024-03-09 21:15:00").diary("Long walk by the river"),
        RecordBuilder::new().timestamp("2024-03-10 08:30:00").diary("Slept badly, still hopeful"),
    ]
}

/// A well-formed model answer for the two-day records
pub fn insight_content() -> Value {
    json!({
        "daily_summaries": [
            {"date": "2024-03-09", "summary": "A restorative walk."},
            {"date": "2024-03-10", "summary": "Tired but hopeful."}
        ],
        "themes": [{"label": "rest", "support": 2}, {"label": "nature", "support": 1}],
        "reflective_question": "What helps you rest?",
        "anomalies": [],
        "hidden_signals": ["sleep affects mood"],
        "emotional_indicators": [{"date": "2024-03-10", "emotion": "hope", "intensity": 3}]
    })
}

/// Wrap message content in a chat completion envelope
pub fn completion_body(content: &Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content.to_string()}}]
    })
}
