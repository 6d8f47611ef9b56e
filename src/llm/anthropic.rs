//! Anthropic Messages API client.
//!
//! One POST to `/v1/messages` per translation. Everything after the HTTP
//! round trip (status check, body decode, block filtering) happens in the
//! pure [`decode`] so it is testable without a network.

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod anthropic_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::LlmTimeouts;
use super::types::{ChatResponse, ContentBlock, LlmError, Message, Tool};

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Error bodies are kept for logs only; cap what we carry around.
const MAX_ERROR_BODY: usize = 512;

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the HTTP client cannot be constructed.
    pub fn new(api_key: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, endpoint: DEFAULT_ENDPOINT.to_string() })
    }

    /// Point the client at a different Messages endpoint (proxy, gateway).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one Messages request.
    ///
    /// # Errors
    ///
    /// `ApiRequest` when the request cannot be sent or the body cannot be
    /// read, otherwise whatever [`decode`] returns.
    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        tools: Option<&[Tool]>,
    ) -> Result<ChatResponse, LlmError> {
        let request = MessagesRequest { model, max_tokens, system, messages, tools };
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        debug!(model, status, bytes = body.len(), "anthropic: response received");
        decode(status, &body)
    }
}

// =============================================================================
// WIRE
// =============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Tool]>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct TokenUsage {
    input_tokens: u64,
    output_tokens: u64,
}

impl From<MessagesResponse> for ChatResponse {
    fn from(raw: MessagesResponse) -> Self {
        Self {
            content: raw.content.into_iter().filter(|b| !matches!(b, ContentBlock::Unknown)).collect(),
            model: raw.model,
            stop_reason: raw.stop_reason.unwrap_or_default(),
            input_tokens: raw.usage.input_tokens,
            output_tokens: raw.usage.output_tokens,
        }
    }
}

/// Turn a status and body into a response. Block types the translator does
/// not understand (thinking, images) are dropped.
fn decode(status: u16, body: &str) -> Result<ChatResponse, LlmError> {
    if !(200..300).contains(&status) {
        let body = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(LlmError::ApiResponse { status, body });
    }
    serde_json::from_str::<MessagesResponse>(body)
        .map(ChatResponse::from)
        .map_err(|e| LlmError::ApiParse(e.to_string()))
}
