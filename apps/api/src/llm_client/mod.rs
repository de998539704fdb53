//! LLM Client: the single point of entry for all text-inference calls in AXIS.
//!
//! ARCHITECTURAL RULE: No other module may call the inference API directly.
//! All pipeline stages MUST go through `InferenceClient::invoke`.
//!
//! The client walks an ordered fallback chain of model ids (primary first, then
//! backups). The first candidate that answers wins; a failed candidate is
//! followed by a fixed backoff before the next one is tried. Only when every
//! candidate has failed does the call surface an `InferenceError`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Failure of a single attempt against one model.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The inference service answered with a non-success status.
    #[error("service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// Transport failure, timeout, or an unreadable response envelope.
    #[error("transport error: {0}")]
    Transport(String),
}

impl BackendError {
    fn kind(&self) -> &'static str {
        match self {
            BackendError::Service { .. } => "service",
            BackendError::Transport(_) => "transport",
        }
    }
}

/// Raised only after every configured model has been tried.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("all {attempts} inference candidates failed; last error: {last_error}")]
    Exhausted {
        attempts: usize,
        last_error: BackendError,
    },

    #[error("no inference models configured")]
    NoCandidates,
}

/// Sampling parameters for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A model backend capable of answering one prompt with one specific model.
///
/// Carried behind `Arc<dyn ModelBackend>` so tests can substitute a scripted backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        params: SamplingParams,
    ) -> Result<String, BackendError>;
}

/// Decides how long to wait after a failed candidate before trying the next one.
pub trait BackoffPolicy: Send + Sync {
    /// `failed_attempt` is 1-based: the number of candidates tried so far.
    fn delay(&self, failed_attempt: usize) -> Duration;
}

/// Waits the same interval after every failure.
#[derive(Debug, Clone, Copy)]
pub struct FixedBackoff(pub Duration);

impl BackoffPolicy for FixedBackoff {
    fn delay(&self, _failed_attempt: usize) -> Duration {
        self.0
    }
}

/// Inference client with an ordered fallback chain.
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn ModelBackend>,
    models: Vec<String>,
    backoff: Arc<dyn BackoffPolicy>,
}

impl InferenceClient {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        models: Vec<String>,
        backoff: Arc<dyn BackoffPolicy>,
    ) -> Self {
        Self {
            backend,
            models,
            backoff,
        }
    }

    /// Ordered candidate model ids, primary first.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Sends `prompt` to each candidate in order until one succeeds.
    ///
    /// An empty body from a successful call is returned as-is; validating the
    /// shape of the text is the caller's job.
    pub async fn invoke(&self, prompt: &str, params: SamplingParams) -> Result<String, InferenceError> {
        let mut last_error: Option<BackendError> = None;

        for (index, model) in self.models.iter().enumerate() {
            let attempt = index + 1;
            let started = Instant::now();

            match self.backend.complete(model, prompt, params).await {
                Ok(text) => {
                    info!(
                        model = %model,
                        attempt,
                        outcome = "success",
                        latency_ms = started.elapsed().as_millis() as u64,
                        output_chars = text.chars().count(),
                        "Inference call succeeded"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        model = %model,
                        attempt,
                        outcome = "failure",
                        error_kind = e.kind(),
                        latency_ms = started.elapsed().as_millis() as u64,
                        "Inference call failed: {e}"
                    );
                    last_error = Some(e);

                    if attempt < self.models.len() {
                        tokio::time::sleep(self.backoff.delay(attempt)).await;
                    }
                }
            }
        }

        match last_error {
            Some(last_error) => {
                error!(
                    attempts = self.models.len(),
                    "All inference candidates failed. Last error: {last_error}"
                );
                Err(InferenceError::Exhausted {
                    attempts: self.models.len(),
                    last_error,
                })
            }
            None => Err(InferenceError::NoCandidates),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    block_type: Option<String>,
    text: Option<String>,
}

impl AnthropicResponse {
    /// Text of the first text block, or empty when the model returned none.
    /// A block without a `type` still counts when it carries text.
    fn into_text(self) -> String {
        self.content
            .unwrap_or_default()
            .into_iter()
            .filter(|b| b.block_type.as_deref().map_or(true, |t| t == "text"))
            .find_map(|b| b.text)
            .unwrap_or_default()
    }
}

/// Text of a successful (2xx) response body.
///
/// The call already succeeded, so an unreadable envelope yields empty text
/// instead of an error; the caller decides what empty output means.
fn success_text(model: &str, body: &str) -> String {
    match serde_json::from_str::<AnthropicResponse>(body) {
        Ok(parsed) => parsed.into_text(),
        Err(e) => {
            warn!(
                model = %model,
                body_chars = body.chars().count(),
                "Successful response had an unparseable body, treating as empty: {e}"
            );
            String::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Backend that speaks the Anthropic Messages API over HTTPS.
#[derive(Clone)]
pub struct AnthropicBackend {
    client: Client,
    api_key: String,
}

impl AnthropicBackend {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        params: SamplingParams,
    ) -> Result<String, BackendError> {
        let request_body = AnthropicRequest {
            model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(BackendError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("response body read failed: {e}")))?;

        Ok(success_text(model, &body))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
