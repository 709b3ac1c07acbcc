//! llm
//!
//! Model API clients.
//!
//! # Providers
//!
//! - [`anthropic`] - Anthropic Messages API
//! - [`openai`] - OpenAI-compatible chat completions
//!
//! A model id is either `provider/name` or a bare name routed by prefix
//! (`claude-*` to Anthropic, `gpt-*`, `o1*`, `o3*`, `o4*` to OpenAI).
//!
//! # Behavior
//!
//! One non-streaming request per turn. Failures are reported as they come
//! back; nothing is retried.

pub mod anthropic;
pub mod error;
pub mod keys;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use error::LlmError;
pub use openai::OpenAiClient;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::config::Config;
use crate::core::paths::LlmPaths;
use crate::defaults::{ParamSet, ParamValue, MODEL_KEY};

/// A model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
}

impl Provider {
    /// Default API base URL.
    pub fn default_api_base(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAi => "https://api.openai.com",
        }
    }

    /// Default environment variable holding the API key.
    pub fn default_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Names the provider's key may have in `keys.json`.
    pub fn key_aliases(&self) -> &'static [&'static str] {
        match self {
            Provider::Anthropic => &["anthropic", "claude"],
            Provider::OpenAi => &["openai"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::OpenAi => write!(f, "openai"),
        }
    }
}

/// A model id split into provider and provider-side name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub provider: Provider,
    pub name: String,
}

impl ModelRef {
    /// Parse a model id.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::UnknownProvider` if the provider cannot be
    /// determined.
    pub fn parse(id: &str) -> Result<Self, LlmError> {
        let id = id.trim();
        if let Some((prefix, name)) = id.split_once('/') {
            let provider = match prefix.to_ascii_lowercase().as_str() {
                "anthropic" | "claude" => Provider::Anthropic,
                "openai" => Provider::OpenAi,
                _ => return Err(LlmError::UnknownProvider(id.to_string())),
            };
            if name.is_empty() {
                return Err(LlmError::UnknownProvider(id.to_string()));
            }
            return Ok(Self {
                provider,
                name: name.to_string(),
            });
        }

        let lower = id.to_ascii_lowercase();
        let provider = if lower.starts_with("claude") {
            Provider::Anthropic
        } else if ["gpt", "o1", "o3", "o4", "chatgpt"]
            .iter()
            .any(|p| lower.starts_with(p))
        {
            Provider::OpenAi
        } else {
            return Err(LlmError::UnknownProvider(id.to_string()));
        };

        Ok(Self {
            provider,
            name: id.to_string(),
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.name)
    }
}

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A conversation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A request for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Provider-side model name.
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    /// Parameters forwarded in the request body (everything but `model`).
    pub options: ParamSet,
}

impl CompletionRequest {
    /// Build a request from resolved parameters.
    pub fn new(model: &ModelRef, params: &ParamSet, system: Option<String>, messages: Vec<Message>) -> Self {
        let options = params
            .iter()
            .filter(|(k, _)| k.as_str() != MODEL_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            model: model.name.clone(),
            system,
            messages,
            options,
        }
    }

    /// Insert options into a JSON body without overwriting keys already set.
    pub(crate) fn extend_body(&self, body: &mut serde_json::Map<String, serde_json::Value>) {
        for (key, value) in self.options.iter() {
            body.entry(key.clone()).or_insert_with(|| value.to_json());
        }
    }

    /// An integer option, if present.
    pub(crate) fn int_option(&self, key: &str) -> Option<i64> {
        match self.options.get(key) {
            Some(ParamValue::Int(n)) => Some(*n),
            _ => None,
        }
    }
}

/// A completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

/// A model API client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one request and wait for the full response.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

/// Build the client for a model using configured endpoints and keys.
///
/// # Errors
///
/// - `LlmError::MissingKey` / `LlmError::KeysFile` if no key can be found
/// - `LlmError::Network` if the HTTP client cannot be built
pub fn client_for(
    model: &ModelRef,
    config: &Config,
    paths: &LlmPaths,
) -> Result<Box<dyn LlmClient>, LlmError> {
    let settings = match model.provider {
        Provider::Anthropic => config.anthropic(),
        Provider::OpenAi => config.openai(),
    };
    let env_var = settings
        .api_key_env
        .as_deref()
        .unwrap_or_else(|| model.provider.default_key_env());
    let api_key = keys::find_key(model.provider, env_var, &paths.keys_path())?;
    let api_base = settings
        .api_base
        .unwrap_or_else(|| model.provider.default_api_base().to_string());
    let timeout = Duration::from_secs(config.timeout_secs());

    log::debug!("client: {} via {}", model, api_base);

    Ok(match model.provider {
        Provider::Anthropic => Box::new(AnthropicClient::new(api_key, api_base, timeout)?),
        Provider::OpenAi => Box::new(OpenAiClient::new(api_key, api_base, timeout)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_qualified_ids() {
        let m = ModelRef::parse("anthropic/claude-3-7-sonnet-latest").unwrap();
        assert_eq!(m.provider, Provider::Anthropic);
        assert_eq!(m.name, "claude-3-7-sonnet-latest");

        let m = ModelRef::parse("openai/gpt-4o").unwrap();
        assert_eq!(m.provider, Provider::OpenAi);
        assert_eq!(m.name, "gpt-4o");
    }

    #[test]
    fn parse_bare_ids_by_prefix() {
        assert_eq!(
            ModelRef::parse("claude-3-opus-20240229").unwrap().provider,
            Provider::Anthropic
        );
        assert_eq!(ModelRef::parse("gpt-4o-mini").unwrap().provider, Provider::OpenAi);
        assert_eq!(ModelRef::parse("o3-mini").unwrap().provider, Provider::OpenAi);
    }

    #[test]
    fn parse_unknown_provider() {
        assert!(matches!(
            ModelRef::parse("mistral/large"),
            Err(LlmError::UnknownProvider(_))
        ));
        assert!(matches!(
            ModelRef::parse("llama3"),
            Err(LlmError::UnknownProvider(_))
        ));
        assert!(matches!(
            ModelRef::parse("anthropic/"),
            Err(LlmError::UnknownProvider(_))
        ));
    }

    #[test]
    fn request_drops_model_from_options() {
        let params: ParamSet = [
            (MODEL_KEY.to_string(), ParamValue::from("anthropic/claude-x")),
            ("temperature".to_string(), ParamValue::Float(0.2)),
        ]
        .into_iter()
        .collect();
        let model = ModelRef::parse("anthropic/claude-x").unwrap();

        let req = CompletionRequest::new(&model, &params, None, vec![Message::user("hi")]);
        assert_eq!(req.model, "claude-x");
        assert!(!req.options.contains_key(MODEL_KEY));
        assert_eq!(req.options.get("temperature"), Some(&ParamValue::Float(0.2)));
    }
}
