//! OpenAI-compatible text-generation client.
//!
//! The generator only ever sees the [`TextGenerator`] trait: one call taking
//! a prompt and a maximum completion size, returning generated text or a
//! classified error. Tests script a fake implementation; production wires in
//! [`OpenAiClient`], a blocking chat-completions client with randomized
//! exponential backoff.
//!
//! # Retry policy
//!
//! Rate-limit responses, connection failures and 5xx server errors are
//! transient: they are retried up to [`RetryPolicy::max_attempts`] with full
//! jitter (a uniform delay between zero and an exponentially growing cap).
//! Authentication and other 4xx errors fail immediately — retrying a bad API
//! key only burns the budget. After the ceiling, the last error is returned
//! and the caller abandons that concept for the run.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Default chat-completions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// System prompt sent with every completion request.
const SYSTEM_PROMPT: &str = "You are an eager teacher.";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("API returned an empty completion")]
    Empty,
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("failed to build HTTP client: {0}")]
    Http(String),
}

impl ClientError {
    /// Transient errors worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::RateLimited(_) | ClientError::Connection(_) => true,
            ClientError::Api { status, .. } => (500..600).contains(status),
            ClientError::Empty | ClientError::MissingApiKey | ClientError::Http(_) => false,
        }
    }
}

/// The text-generation collaborator as the generate stage sees it.
pub trait TextGenerator {
    /// Produce text for a prompt, bounded by `max_tokens` output tokens.
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ClientError>;
}

/// Backoff shape for transient failures: attempt `n` (1-based) sleeps a
/// uniformly random duration in `[0, min(max_delay, base_delay * 2^(n-1))]`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Exponential cap for a 1-based attempt number, before jitter.
    pub fn cap_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        let uncapped = self
            .base_delay
            .checked_mul(1u32 << exp)
            .unwrap_or(self.max_delay);
        uncapped.min(self.max_delay)
    }

    /// Full-jitter delay for an attempt: uniform in `[0, cap_for(attempt)]`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.cap_for(attempt).mul_f64(jitter_fraction())
    }
}

/// Uniform-ish fraction in `[0, 1)` from the subsecond clock. Backoff jitter
/// only needs to decorrelate concurrent clients, not be cryptographic.
fn jitter_fraction() -> f64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos) / 1e9
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Blocking chat-completions client.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
    model: String,
    policy: RetryPolicy,
}

impl OpenAiClient {
    /// Build a client from the environment: `OPENAI_API_KEY` (required)
    /// and `OPENAI_API_URL` (optional endpoint override).
    pub fn from_env(model: &str, policy: RetryPolicy) -> Result<Self, ClientError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ClientError::MissingApiKey)?;
        let api_url =
            std::env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(api_url, api_key, model.to_string(), policy)
    }

    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        policy: RetryPolicy,
    ) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            http,
            api_url,
            api_key,
            model,
            policy,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_once(&self, prompt: &str, max_tokens: u32) -> Result<String, ClientError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ClientError::Connection(e.to_string())
                } else {
                    ClientError::Api {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(match status.as_u16() {
                429 => ClientError::RateLimited(message),
                code => ClientError::Api {
                    status: code,
                    message,
                },
            });
        }

        let parsed: ChatResponse = response.json().map_err(|e| ClientError::Api {
            status: status.as_u16(),
            message: format!("malformed completion body: {e}"),
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ClientError::Empty);
        }
        Ok(content)
    }
}

/// Drive `request` under the retry policy, sleeping between attempts via
/// `sleep`. Transient errors retry up to `max_attempts` total attempts;
/// non-transient errors and the last error after the ceiling are returned
/// as-is.
fn retry_with<F, S>(policy: &RetryPolicy, mut sleep: S, mut request: F) -> Result<String, ClientError>
where
    F: FnMut(u32) -> Result<String, ClientError>,
    S: FnMut(Duration),
{
    let mut attempt = 1;
    loop {
        match request(attempt) {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                sleep(policy.delay_for(attempt));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

impl TextGenerator for OpenAiClient {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ClientError> {
        retry_with(&self.policy, std::thread::sleep, |_attempt| {
            self.request_once(prompt, max_tokens)
        })
    }
}
