//! Anthropic Messages API client
//!
//! Implements [`LlmClient`] for `POST /v1/messages`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{Completion, CompletionRequest, LlmClient, LlmError};
use crate::defaults::MAX_TOKENS_KEY;

/// API version sent with every request.
pub const API_VERSION: &str = "2023-06-01";

/// `max_tokens` used when the parameters do not set one.
pub const DEFAULT_MAX_TOKENS: i64 = 4096;

/// Anthropic Claude API client
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl AnthropicClient {
    /// Create a client for `base_url` (scheme and host).
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build the request body.
    pub fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert("model".into(), request.model.clone().into());
        body.insert(
            "max_tokens".into(),
            request
                .int_option(MAX_TOKENS_KEY)
                .unwrap_or(DEFAULT_MAX_TOKENS)
                .into(),
        );
        if let Some(system) = request.system.as_deref().filter(|s| !s.is_empty()) {
            body.insert("system".into(), system.into());
        }
        body.insert(
            "messages".into(),
            serde_json::to_value(&request.messages).unwrap_or_default(),
        );
        request.extend_body(&mut body);
        serde_json::Value::Object(body)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(request);
        log::debug!("anthropic: POST {} model={}", url, request.model);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::debug!("anthropic: status {}", status);
            return Err(LlmError::from_status("anthropic", status.as_u16(), &text));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse(
                "response contained no text content".to_string(),
            ));
        }

        Ok(Completion { text })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}
