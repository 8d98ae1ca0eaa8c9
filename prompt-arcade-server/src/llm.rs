//! Optional LLM intro embellishment.
//!
//! The pipeline never depends on the LLM: a failed or missing completion
//! leaves the template intro in place.

use async_trait::async_trait;
use prompt_arcade::core::selector::TemplateChoice;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Longest embellished intro kept, in characters.
pub const MAX_INTRO_CHARS: usize = 280;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A text completion backend.
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// Ollama (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You write one-sentence intros for small browser games. \
Reply with the sentence only: no quotes, no markdown.";

#[async_trait]
impl LlmPort for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.8,
            max_tokens: 120,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Retry wrapper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Caps exponential growth.
    pub max_delay_ms: u64,
    /// Fraction (0.0-1.0) of the delay randomized either way.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 5000,
            jitter_factor: 0.2,
        }
    }
}

/// Adds bounded exponential-backoff retry to any `LlmPort`.
pub struct ResilientLlm {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlm {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    fn delay_for(&self, attempt: u32) -> u64 {
        // base * 2^(attempt-1)
        let exponential = self
            .config
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }

    /// Client errors (4xx) will fail the same way again.
    fn is_retryable(error: &LlmError) -> bool {
        match error {
            LlmError::Status { status, .. } => !(400..500).contains(status),
            LlmError::RequestFailed(_) | LlmError::InvalidResponse(_) => true,
        }
    }
}

#[async_trait]
impl LlmPort for ResilientLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(prompt).await {
                Ok(text) => {
                    if attempt > 0 {
                        tracing::info!(attempt = attempt + 1, "LLM request succeeded after retry");
                    }
                    return Ok(text);
                }
                Err(e) if attempt < self.config.max_retries && Self::is_retryable(&e) => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Embellishment
// ---------------------------------------------------------------------------

/// The completion prompt asking for an intro for `choice`.
pub fn intro_prompt(choice: &TemplateChoice, prompt: &str) -> String {
    format!(
        "Game title: {}\nGame type: {}\nDifficulty: {}\nPlayer's request: {}\n\
         Write one exciting sentence introducing this game to the player.",
        choice.title,
        choice.category,
        choice.difficulty.name(),
        prompt.trim()
    )
}

/// Normalise a completion into an intro: first line, trimmed, surrounding
/// quotes stripped, capped at `MAX_INTRO_CHARS`. `None` if nothing is left.
pub fn clean_intro(raw: &str) -> Option<String> {
    let line = raw.trim().lines().next().unwrap_or("").trim();
    let unquoted = line
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '`'))
        .trim();
    if unquoted.is_empty() {
        return None;
    }
    let capped: String = unquoted.chars().take(MAX_INTRO_CHARS).collect();
    Some(capped.trim_end().to_string())
}

/// Ask `llm` for an intro. Failures are logged and yield `None`.
pub async fn embellish_intro(
    llm: &dyn LlmPort,
    choice: &TemplateChoice,
    prompt: &str,
) -> Option<String> {
    match llm.complete(&intro_prompt(choice, prompt)).await {
        Ok(raw) => {
            let intro = clean_intro(&raw);
            if intro.is_none() {
                tracing::warn!(category = %choice.category, "LLM returned an empty intro");
            }
            intro
        }
        Err(e) => {
            tracing::warn!(
                category = %choice.category,
                error = %e,
                "LLM embellishment failed, keeping template intro"
            );
            None
        }
    }
}
