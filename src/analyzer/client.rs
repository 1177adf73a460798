use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ERROR_BODY_PREVIEW_CHARS: usize = 240;

/// Why a single model attempt failed. Every variant is retried the same way.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request timed out: {0}")]
    Timeout(String),
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response envelope: {0}")]
    MalformedEnvelope(String),
    #[error("malformed insight content: {0}")]
    MalformedContent(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ModelError::Timeout(error.to_string())
        } else {
            ModelError::Transport(error.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// OpenAI-compatible chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(model: &str, system: &str, user: String, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system.to_string() },
                ChatMessage { role: "user".to_string(), content: user },
            ],
            response_format: ResponseFormat { format_type: "json_object".to_string() },
            temperature,
        }
    }
}

/// Sends one chat request and returns the assistant message content
pub trait ModelClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, ModelError>;
}

impl<T: ModelClient + ?Sized> ModelClient for &T {
    fn complete(&self, request: &ChatRequest) -> Result<String, ModelError> {
        (**self).complete(request)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking HTTP client for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct HttpModelClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl HttpModelClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, ModelError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint: endpoint.trim().to_string(), api_key: api_key.to_string() })
    }
}

impl ModelClient for HttpModelClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, ModelError> {
        let response =
            self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let completion: ChatCompletion =
            response.json().map_err(|e| ModelError::MalformedEnvelope(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ModelError::MalformedEnvelope("response has no assistant message content".to_string())
            })
    }
}
