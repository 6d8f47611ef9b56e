//! LLM: the model backend behind natural-language board commands.
//!
//! DESIGN
//! ======
//! The command translator only ever sees the [`LlmChat`] trait, so tests
//! swap in a scripted mock. [`LlmClient`] is the production implementation:
//! an Anthropic client plus the model name and a token ceiling, so a caller
//! asking for more tokens than configured is quietly capped.
//!
//! `tools` holds the board operation vocabulary offered to the model.

pub mod anthropic;
pub mod config;
pub mod tools;
pub mod types;

use tracing::info;

use anthropic::AnthropicClient;
use config::LlmConfig;
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message, Tool};

pub struct LlmClient {
    inner: AnthropicClient,
    model: String,
    max_tokens: u32,
}

impl LlmClient {
    /// Build from `LLM_*` environment variables; see [`LlmConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when AI commands are not configured, or the
    /// config/HTTP error that stopped the client from building.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let mut inner = AnthropicClient::new(config.api_key, config.timeouts)?;
        if let Some(endpoint) = config.endpoint {
            info!(%endpoint, "llm: using endpoint override");
            inner = inner.with_endpoint(endpoint);
        }
        Ok(Self { inner, model: config.model, max_tokens: config.max_tokens })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Configured token ceiling for one reply.
    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(
        &self,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        tools: Option<&[Tool]>,
    ) -> Result<ChatResponse, LlmError> {
        let capped = max_tokens.min(self.max_tokens);
        self.inner.chat(&self.model, capped, system, messages, tools).await
    }
}
