//! LLM types: messages, tool definitions, responses and errors.
//!
//! Only what the command translator needs: a single user turn in, text
//! and `tool_use` blocks out.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Failures between the translator and the model provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("invalid LLM setting: {0}")]
    ConfigParse(String),

    /// AI commands are off until `var` is set.
    #[error("LLM API key not configured ({var} is unset)")]
    MissingApiKey { var: String },

    /// Transport failure: DNS, TLS, timeout, dropped connection.
    #[error("LLM request failed: {0}")]
    ApiRequest(String),

    /// Non-2xx reply. `body` is truncated.
    #[error("LLM provider returned status {status}")]
    ApiResponse { status: u16, body: String },

    #[error("unreadable LLM response: {0}")]
    ApiParse(String),

    #[error("could not build HTTP client: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_LLM_CONFIG",
            Self::MissingApiKey { .. } => "E_LLM_NO_KEY",
            Self::ApiRequest(_) => "E_LLM_REQUEST",
            Self::ApiResponse { .. } => "E_LLM_STATUS",
            Self::ApiParse(_) => "E_LLM_PARSE",
            Self::HttpClientBuild(_) => "E_LLM_HTTP_CLIENT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// CONTENT
// =============================================================================

/// A block of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// A call to one of the offered tools; here, one board operation.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Block types this client does not consume (thinking, etc).
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn with plain-text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A tool definition passed to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Response from a chat call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ChatResponse {
    /// Concatenated text blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `(name, input)` of every tool call, in order.
    #[must_use]
    pub fn tool_calls(&self) -> Vec<(&str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { name, input, .. } => Some((name.as_str(), input)),
                _ => None,
            })
            .collect()
    }
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// One request/response exchange with a model. The translator depends on
/// this, never on a concrete provider.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// # Errors
    ///
    /// Any [`LlmError`] from transport, status or decoding.
    async fn chat(
        &self,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        tools: Option<&[Tool]>,
    ) -> Result<ChatResponse, LlmError>;
}
