//! LLM client for the chat service backing classification, extraction and
//! ranking.
//!
//! This crate provides:
//! - The `LanguageModel` trait the rest of the workspace depends on
//! - `OllamaClient`, a `reqwest` implementation for the Ollama chat API
//! - `extract::<T>()`, schema-guided structured output via `schemars`
//!
//! Every request carries a timeout. Failures are surfaced to the caller and
//! never retried here.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur when talking to the LLM service
#[derive(Error, Debug)]
pub enum LlmClientError {
    #[error("Failed to connect to LLM service: {0}")]
    ConnectionError(String),

    #[error("LLM service timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM service returned an error: {0}")]
    ApiError(String),

    #[error("Invalid response from LLM service: {0}")]
    InvalidResponse(String),
}

impl LlmClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmClientError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, LlmClientError>;

/// A text-generation capability.
///
/// Implemented by `OllamaClient` in production and by scripted mocks in
/// tests across the workspace.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-form completion of a single user prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Completion constrained to the given JSON schema (returns raw JSON text)
    async fn complete_structured(&self, prompt: &str, schema: serde_json::Value) -> Result<String>;
}

/// Ask the model for a value of type `T`.
///
/// The JSON schema is generated from `T`, sent along with the prompt, and
/// the answer is deserialized back into `T`.
pub async fn extract<T>(model: &dyn LanguageModel, prompt: &str) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = serde_json::to_value(schema_for!(T))
        .map_err(|e| LlmClientError::InvalidResponse(format!("schema generation failed: {}", e)))?;

    let raw = model.complete_structured(prompt, schema).await?;

    serde_json::from_str(clean_answer(&raw)).map_err(|e| {
        error!("Structured answer did not match the schema: {}", e);
        LlmClientError::InvalidResponse(format!("could not deserialize structured answer: {}", e))
    })
}

/// Strip reasoning blocks and markdown code fences from a model answer
pub fn clean_answer(raw: &str) -> &str {
    let mut answer = raw.trim();

    if let Some(end) = answer.find("</think>") {
        answer = answer[end + "</think>".len()..].trim();
    }

    if let Some(stripped) = answer.strip_prefix("```") {
        let body = stripped
            .split_once('\n')
            .map(|(_, rest)| rest)
            .unwrap_or(stripped);
        answer = body.strip_suffix("```").unwrap_or(body).trim();
    }

    answer
}

// =============================================================================
// Ollama chat API
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

/// Client for an Ollama-compatible chat endpoint (`POST {base}/api/chat`).
#[derive(Clone)]
pub struct OllamaClient {
    http_client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a client for `model` served at `base_url`
    /// (e.g., "http://localhost:11434")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Configure the per-request timeout (default: 60s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn chat(&self, prompt: &str, format: Option<serde_json::Value>) -> Result<String> {
        let start = Instant::now();
        let structured = format.is_some();
        debug!(
            model = %self.model,
            prompt_length = prompt.len(),
            structured,
            "Sending chat request"
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: ChatOptions { temperature: 0.0 },
            format,
        };

        let response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("LLM request failed: {}", e);
                if e.is_timeout() {
                    LlmClientError::Timeout(self.timeout)
                } else {
                    LlmClientError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "LLM service error");
            return Err(LlmClientError::ApiError(format!("{}: {}", status, error_text)));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmClientError::Timeout(self.timeout)
            } else {
                LlmClientError::InvalidResponse(e.to_string())
            }
        })?;

        let content = chat_response
            .message
            .map(|m| m.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("response has no message".into()))?;

        info!(
            model = %self.model,
            response_length = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "LLM response received"
        );
        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let content = self.chat(prompt, None).await?;
        Ok(clean_answer(&content).to_string())
    }

    async fn complete_structured(&self, prompt: &str, schema: serde_json::Value) -> Result<String> {
        self.chat(prompt, Some(schema)).await
    }
}
