//! LLM configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use super::types::LlmError;

pub const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeouts: LlmTimeouts,
    /// Messages endpoint override; the public API when absent.
    pub endpoint: Option<String>,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - `LLM_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `LLM_MODEL`: default [`DEFAULT_LLM_MODEL`]
    /// - `LLM_MAX_TOKENS`: default 1024
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 60
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LLM_ENDPOINT`: Messages endpoint override
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when the key variable is unset, and
    /// `ConfigParse` when a numeric setting is malformed.
    pub fn from_env() -> Result<Self, LlmError> {
        // Unset and non-UTF-8 values both read as absent.
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => None,
        })
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`LlmConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let key_var = lookup("LLM_API_KEY_ENV").ok_or_else(|| LlmError::MissingApiKey { var: "LLM_API_KEY_ENV".into() })?;
        let api_key = lookup(&key_var).ok_or_else(|| LlmError::MissingApiKey { var: key_var.clone() })?;
        let model = lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
        let max_tokens = parse_or(&lookup, "LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS)?;
        let timeouts = LlmTimeouts {
            request_secs: parse_or(&lookup, "LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_or(&lookup, "LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS)?,
        };
        let endpoint = lookup("LLM_ENDPOINT");
        Ok(Self { api_key, model, max_tokens, timeouts, endpoint })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, LlmError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| LlmError::ConfigParse(format!("{key}: expected a number, got '{raw}'"))),
    }
}
