//! LLM error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors from model API calls.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider rejected the credentials (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited by {provider}; try again later")]
    RateLimited { provider: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No API key in the environment or the keys file.
    #[error("no API key for {provider}: set {env_var} or add \"{provider}\" to {}", .keys_path.display())]
    MissingKey {
        provider: String,
        env_var: String,
        keys_path: PathBuf,
    },

    #[error("unknown model provider for '{0}': use anthropic/<model> or openai/<model>")]
    UnknownProvider(String),

    #[error("failed to read keys file {path}: {message}")]
    KeysFile { path: PathBuf, message: String },
}

impl LlmError {
    /// Check if this is an authentication error
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Auth(_))
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Map a non-success HTTP status and body to an error.
    pub fn from_status(provider: &str, status: u16, body: &str) -> Self {
        let message = error_message(body);
        match status {
            401 | 403 => LlmError::Auth(message),
            429 => LlmError::RateLimited {
                provider: provider.to_string(),
            },
            _ => LlmError::Api { status, message },
        }
    }
}

/// Pull `error.message` out of a provider error body, falling back to the
/// raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error details".to_string()
            } else {
                trimmed.to_string()
            }
        })
}
