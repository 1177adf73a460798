//! Typed view of the model's JSON answer.
//!
//! Absent keys (and explicit `null`) fall back to defaults; any type mismatch
//! is a [`ModelError::MalformedContent`] so the attempt is retried.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::client::ModelError;
use crate::models::insight::{INSIGHT_PACK_VERSION, MAX_THEMES};
use crate::models::{DailySummary, InsightPack, PackMeta, Theme};

/// Used when the model omits the reflective question or leaves it blank
pub const DEFAULT_REFLECTIVE_QUESTION: &str = "最近有哪一个瞬间，让你想停下来多感受一会儿？";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelInsightResponse {
    #[serde(alias = "dailySummaries", deserialize_with = "null_as_default")]
    pub daily_summaries: Vec<DailySummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub themes: Vec<ThemeResponse>,
    #[serde(alias = "reflectiveQuestion", deserialize_with = "null_as_default")]
    pub reflective_question: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub anomalies: Vec<String>,
    #[serde(alias = "hiddenSignals", deserialize_with = "null_as_default")]
    pub hidden_signals: Vec<String>,
    #[serde(alias = "emotionalIndicators", deserialize_with = "null_as_default")]
    pub emotional_indicators: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThemeResponse {
    pub label: String,
    #[serde(default, deserialize_with = "deserialize_support")]
    pub support: u32,
}

impl ModelInsightResponse {
    /// Reshape into a complete pack: themes capped at five, question defaulted
    pub fn into_pack(self, run_id: &str, entries_analyzed: usize, generated_at: String) -> InsightPack {
        let reflective_question = self
            .reflective_question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_REFLECTIVE_QUESTION.to_string());

        InsightPack {
            meta: PackMeta {
                run_id: run_id.to_string(),
                version: INSIGHT_PACK_VERSION.to_string(),
                entries_analyzed,
                generated_at,
                mode: None,
            },
            daily_summaries: self.daily_summaries,
            themes: self
                .themes
                .into_iter()
                .take(MAX_THEMES)
                .map(|t| Theme { label: t.label, support: t.support })
                .collect(),
            reflective_question,
            anomalies: self.anomalies,
            hidden_signals: self.hidden_signals,
            emotional_indicators: self.emotional_indicators,
        }
    }
}

/// Parse assistant message content into a typed response
///
/// The content must be a JSON object, optionally wrapped in a Markdown code fence.
pub fn parse_insight_content(content: &str) -> Result<ModelInsightResponse, ModelError> {
    let body = strip_code_fence(content);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ModelError::MalformedContent(format!("content is not JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ModelError::MalformedContent("content is not a JSON object".to_string()));
    }

    serde_json::from_value(value)
        .map_err(|e| ModelError::MalformedContent(format!("unexpected shape: {}", e)))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        // Drop the language tag line
        Some((_, body)) => body.trim(),
        None => rest.strip_prefix("json").unwrap_or(rest).trim(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Theme support as a non-negative integer, an integral float, or a numeric string
fn deserialize_support<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).map_err(|_| Error::custom("theme support out of range"));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
                _ => Err(Error::custom("theme support must be a non-negative integer")),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::custom(format!("invalid theme support: {}", e))),
        _ => Err(Error::custom("theme support must be a number or string")),
    }
}
