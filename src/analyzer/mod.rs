//! Model-backed insight analysis with bounded retry and fallback
//!
//! # Error Handling Strategy
//!
//! [`InsightAnalyzer::analyze`] never returns an error:
//!
//! - **Empty input**: returns a fallback pack immediately without calling the model.
//! - **Attempt failures**: transport errors, timeouts, non-2xx statuses, malformed
//!   envelopes and malformed content are all treated alike. Each failure is logged and,
//!   while attempts remain, followed by a `2^attempt` second backoff.
//! - **Exhaustion**: after `max_retries` failed attempts a fallback pack is returned with
//!   `entries_analyzed` set to the number of entries that would have been analyzed.
//!
//! Every attempt re-sends the full prompt; nothing is cached between attempts.

pub mod client;
pub mod prompt;
pub mod response;
pub mod retry;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

pub use client::{ChatRequest, HttpModelClient, ModelClient, ModelError};
pub use response::{DEFAULT_REFLECTIVE_QUESTION, ModelInsightResponse, parse_insight_content};
pub use retry::{Delay, NoDelay, ThreadDelay, backoff_delay};

use crate::config::ModelConfig;
use crate::models::{CanonicalEntry, InsightPack};

/// Request settings shared by every attempt of one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    pub model: String,
    pub temperature: f32,
    /// Total number of attempts, including the first
    pub max_retries: usize,
}

impl From<&ModelConfig> for AnalyzerSettings {
    fn from(config: &ModelConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        }
    }
}

pub struct InsightAnalyzer<C, D = ThreadDelay> {
    client: C,
    delay: D,
    settings: AnalyzerSettings,
}

impl<C: ModelClient, D: Delay> InsightAnalyzer<C, D> {
    pub fn new(client: C, delay: D, settings: AnalyzerSettings) -> Self {
        Self { client, delay, settings }
    }

    /// Analyze entries into an insight pack, degrading to a fallback pack on failure
    pub fn analyze(&self, entries: &[CanonicalEntry], run_id: &str) -> InsightPack {
        if entries.is_empty() {
            info!(run_id, "No entries to analyze, returning fallback pack");
            return InsightPack::fallback(run_id, 0, now_rfc3339());
        }

        let request = ChatRequest::new(
            &self.settings.model,
            prompt::SYSTEM_PROMPT,
            prompt::build_prompt(entries),
            self.settings.temperature,
        );
        let max_attempts = self.settings.max_retries;

        for attempt in 0..max_attempts {
            debug!(run_id, attempt = attempt + 1, max_attempts, "Requesting model analysis");

            match self.attempt(&request) {
                Ok(response) => {
                    info!(
                        run_id,
                        attempt = attempt + 1,
                        entries = entries.len(),
                        themes = response.themes.len(),
                        "Model analysis succeeded"
                    );
                    return response.into_pack(run_id, entries.len(), now_rfc3339());
                }
                Err(error) => {
                    warn!(
                        run_id,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %error,
                        "Model analysis attempt failed"
                    );
                    if attempt + 1 < max_attempts {
                        let wait = backoff_delay(attempt);
                        debug!(run_id, wait_secs = wait.as_secs(), "Backing off before retry");
                        self.delay.wait(wait);
                    }
                }
            }
        }

        warn!(
            run_id,
            attempts = max_attempts,
            entries = entries.len(),
            "Model analysis exhausted all attempts, returning fallback pack"
        );
        InsightPack::fallback(run_id, entries.len(), now_rfc3339())
    }

    fn attempt(&self, request: &ChatRequest) -> Result<ModelInsightResponse, ModelError> {
        let content = self.client.complete(request)?;
        parse_insight_content(&content)
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::time::Duration;

    use chrono::{FixedOffset, TimeZone};

    use super::*;

    /// Replays canned results and counts calls
    struct ScriptedClient {
        script: RefCell<VecDeque<Result<String, ModelError>>>,
        calls: Cell<usize>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<String, ModelError>>) -> Self {
            Self { script: RefCell::new(script.into()), calls: Cell::new(0) }
        }

        fn always_failing() -> Self {
            Self::new(Vec::new())
        }
    }

    impl ModelClient for ScriptedClient {
        fn complete(&self, _request: &ChatRequest) -> Result<String, ModelError> {
            self.calls.set(self.calls.get() + 1);
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::Transport("connection refused".to_string())))
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        waits: RefCell<Vec<Duration>>,
    }

    impl Delay for RecordingDelay {
        fn wait(&self, duration: Duration) {
            self.waits.borrow_mut().push(duration);
        }
    }

    fn settings(max_retries: usize) -> AnalyzerSettings {
        AnalyzerSettings { model: "test-model".to_string(), temperature: 0.2, max_retries }
    }

    fn entries(count: usize) -> Vec<CanonicalEntry> {
        (0..count)
            .map(|i| {
                let ts = FixedOffset::east_opt(0)
                    .unwrap()
                    .with_ymd_and_hms(2024, 3, 10 + i as u32, 12, 0, 0)
                    .unwrap();
                CanonicalEntry::new(ts.to_rfc3339(), ts, ts.date_naive(), "a calm day", false)
            })
            .collect()
    }

    #[test]
    fn test_empty_input_skips_model() {
        let client = ScriptedClient::always_failing();
        let analyzer = InsightAnalyzer::new(&client, NoDelay, settings(2));

        let pack = analyzer.analyze(&[], "run-empty");

        assert!(pack.is_fallback());
        assert_eq!(pack.meta.entries_analyzed, 0);
        assert_eq!(client.calls.get(), 0);
    }

    #[test]
    fn test_success_on_first_attempt() {
        let client = ScriptedClient::new(vec![Ok(
            r#"{"themes": [{"label": "calm", "support": 3}], "reflective_question": "Why calm?"}"#
                .to_string(),
        )]);
        let delay = RecordingDelay::default();
        let analyzer = InsightAnalyzer::new(&client, &delay, settings(2));

        let pack = analyzer.analyze(&entries(3), "run-ok");

        assert!(!pack.is_fallback());
        assert_eq!(pack.meta.run_id, "run-ok");
        assert_eq!(pack.meta.entries_analyzed, 3);
        assert_eq!(pack.themes.len(), 1);
        assert_eq!(client.calls.get(), 1);
        assert!(delay.waits.borrow().is_empty());
    }

    #[test]
    fn test_permanent_failure_calls_exactly_max_retries() {
        for max_retries in 1..=4 {
            let client = ScriptedClient::always_failing();
            let analyzer = InsightAnalyzer::new(&client, NoDelay, settings(max_retries));

            let pack = analyzer.analyze(&entries(4), "run-fail");

            assert_eq!(client.calls.get(), max_retries);
            assert!(pack.is_fallback());
            assert_eq!(pack.meta.entries_analyzed, 4);
        }
    }

    #[test]
    fn test_backoff_waits_between_attempts_only() {
        let client = ScriptedClient::always_failing();
        let delay = RecordingDelay::default();
        let analyzer = InsightAnalyzer::new(&client, &delay, settings(3));

        analyzer.analyze(&entries(1), "run-backoff");

        assert_eq!(*delay.waits.borrow(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn test_malformed_content_then_success() {
        let client = ScriptedClient::new(vec![
            Ok("not json at all".to_string()),
            Ok(r#"{"daily_summaries": [{"date": "2024-03-10", "summary": "ok"}]}"#.to_string()),
        ]);
        let analyzer = InsightAnalyzer::new(&client, NoDelay, settings(2));

        let pack = analyzer.analyze(&entries(1), "run-retry");

        assert!(!pack.is_fallback());
        assert_eq!(pack.daily_summaries.len(), 1);
        assert_eq!(pack.reflective_question, DEFAULT_REFLECTIVE_QUESTION);
        assert_eq!(client.calls.get(), 2);
    }

    #[test]
    fn test_status_errors_fall_back() {
        let client = ScriptedClient::new(vec![
            Err(ModelError::Status { status: 500, body: "boom".to_string() }),
            Err(ModelError::Timeout("deadline".to_string())),
        ]);
        let analyzer = InsightAnalyzer::new(&client, NoDelay, settings(2));

        let pack = analyzer.analyze(&entries(2), "run-status");

        assert!(pack.is_fallback());
        assert!(pack.themes.is_empty());
        assert_eq!(client.calls.get(), 2);
    }

    #[test]
    fn test_settings_from_model_config() {
        let config = ModelConfig { max_retries: 5, ..ModelConfig::default() };
        let settings = AnalyzerSettings::from(&config);
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.model, config.model);
    }
}
