//! Completion client: one HTTP POST per user message.
//!
//! Single attempt by design — no retry, no backoff, no client-side timeout.
//! Every failure class maps to a fixed user-facing string via
//! [`CompletionError::user_message`]; the panel turns that into a transcript
//! entry and never lets the error propagate into the host.

use serde::{Deserialize, Serialize};

use crate::settings::ChatSettings;

/// Token budget sent with every request, matching the original plugin.
pub const MAX_TOKENS: u32 = 150;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
}

/// Expected success shape: `{"choices": [{"text": "..."}, ...]}`.
/// Unknown fields are tolerated so API additions don't break parsing.
#[derive(Debug, Default, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// Failure taxonomy
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("rate limited (HTTP 429)")]
    RateLimited,
    #[error("forbidden (HTTP 403)")]
    Forbidden,
    #[error("server error (HTTP {0})")]
    Server(u16),
    /// Any other HTTP status; `detail` is the server's error payload when
    /// one was present.
    #[error("unexpected status {status}: {detail}")]
    Status { status: u16, detail: String },
    /// No response received at all (connect failure, timeout, DNS).
    #[error("no response received: {0}")]
    Network(String),
    /// 2xx response whose body doesn't carry at least one choice.
    #[error("unexpected response format")]
    UnexpectedFormat,
    #[error("{0}")]
    Other(String),
}

impl CompletionError {
    /// The exact transcript string shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            CompletionError::RateLimited => {
                "Error: Rate limit reached. Please try again later.".to_string()
            }
            CompletionError::Forbidden => {
                "Error: Invalid API key or insufficient permissions.".to_string()
            }
            CompletionError::Server(_) => {
                "Error: Server error at the completion API. Please try again later.".to_string()
            }
            CompletionError::Status { detail, .. } => format!("Error: {detail}"),
            CompletionError::Network(_) => {
                "Error: No response received. Please check your internet connection.".to_string()
            }
            CompletionError::UnexpectedFormat => {
                "Error: The completion response format was unexpected.".to_string()
            }
            CompletionError::Other(msg) => format!("Error: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl CompletionClient {
    /// Client configured from the persisted settings.
    pub fn new(settings: &ChatSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Issue the single POST for `prompt` and return the first choice's
    /// text, trimmed.
    pub async fn request_completion(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = CompletionRequest {
            prompt,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let err = match code {
                429 => CompletionError::RateLimited,
                403 => CompletionError::Forbidden,
                c if c >= 500 => CompletionError::Server(c),
                c => CompletionError::Status {
                    status: c,
                    detail: error_payload(response).await,
                },
            };
            tracing::warn!(status = code, "completion request failed: {err}");
            return Err(err);
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|_| CompletionError::UnexpectedFormat)?;

        match parsed.choices.first() {
            Some(choice) => Ok(choice.text.trim().to_string()),
            None => {
                tracing::warn!("completion response carried no choices");
                Err(CompletionError::UnexpectedFormat)
            }
        }
    }
}

/// Map a transport-level failure onto the taxonomy. Connect failures and
/// timeouts mean no response was received; anything else (e.g. a request
/// that could not be built from a bad endpoint) keeps its own message text.
fn classify_send_error(e: reqwest::Error) -> CompletionError {
    if e.is_connect() || e.is_timeout() {
        CompletionError::Network(e.to_string())
    } else {
        CompletionError::Other(e.to_string())
    }
}

/// Pull the error payload out of a non-success body: the `error` field when
/// present (string or serialized object), else "Unexpected Error".
async fn error_payload(response: reqwest::Response) -> String {
    let Ok(value) = response.json::<serde_json::Value>().await else {
        return "Unexpected Error".to_string();
    };
    match value.get("error") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => "Unexpected Error".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
