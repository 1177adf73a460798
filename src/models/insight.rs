use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema version stamped into every pack's metadata
pub const INSIGHT_PACK_VERSION: &str = "1.0";

/// Marker stored in `meta.mode` for degraded runs
pub const FALLBACK_MODE: &str = "fallback";

/// Maximum number of themes kept from a model response
pub const MAX_THEMES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackMeta {
    pub run_id: String,
    pub version: String,
    pub entries_analyzed: usize,
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub label: String,
    pub support: u32,
}

/// Structured result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightPack {
    pub meta: PackMeta,
    pub daily_summaries: Vec<DailySummary>,
    pub themes: Vec<Theme>,
    pub reflective_question: String,
    pub anomalies: Vec<String>,
    pub hidden_signals: Vec<String>,
    pub emotional_indicators: Vec<Value>,
}

impl InsightPack {
    /// Degraded pack: metadata only, every collection empty
    pub fn fallback(run_id: &str, entries_analyzed: usize, generated_at: String) -> Self {
        Self {
            meta: PackMeta {
                run_id: run_id.to_string(),
                version: INSIGHT_PACK_VERSION.to_string(),
                entries_analyzed,
                generated_at,
                mode: Some(FALLBACK_MODE.to_string()),
            },
            daily_summaries: Vec::new(),
            themes: Vec::new(),
            reflective_question: String::new(),
            anomalies: Vec::new(),
            hidden_signals: Vec::new(),
            emotional_indicators: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.meta.mode.as_deref() == Some(FALLBACK_MODE)
    }

    /// Append pipeline-detected anomalies after the model-reported ones
    pub fn merge_anomalies(&mut self, detected: Vec<String>) {
        self.anomalies.extend(detected);
    }
}
