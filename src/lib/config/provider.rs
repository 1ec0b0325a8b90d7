//! # Provider Configuration
//!
//! Connection settings for the language-model backend. Only the
//! OpenAI-compatible chat-completions format is spoken, which also covers
//! Groq, Mistral, OpenRouter and local gateways exposing the same API.

use super::defaults::{
    DEFAULT_API_KEY_ENV, DEFAULT_OPENAI_API_PATH, DEFAULT_OPENAI_ENDPOINT, DEFAULT_PROVIDER_ID,
    DEFAULT_PROVIDER_TYPE,
};
use serde::{Deserialize, Serialize};

/// Configuration for the model provider.
///
/// # Example
///
/// ```toml
/// [provider]
/// id = "openai"
/// type = "openai"
/// endpoint = "https://api.openai.com"
/// api_key = "OPENAI_API_KEY"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelProviderConfig {
    /// Identifier used in logs and error messages
    pub id: String,
    /// API format; anything other than "openai" is rejected by the factory
    #[serde(rename = "type")]
    pub provider_type: String,
    /// API endpoint URL
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key: Option<String>,
    /// Path appended to the endpoint for chat completions
    pub api_path: String,
}

impl Default for ModelProviderConfig {
    fn default() -> Self {
        Self::from(RawProviderConfig::default())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct RawProviderConfig {
    id: Option<String>,
    #[serde(rename = "type")]
    provider_type: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
    api_path: Option<String>,
}

impl From<RawProviderConfig> for ModelProviderConfig {
    fn from(raw: RawProviderConfig) -> Self {
        Self {
            id: raw.id.unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string()),
            provider_type: raw
                .provider_type
                .unwrap_or_else(|| DEFAULT_PROVIDER_TYPE.to_string()),
            endpoint: raw
                .endpoint
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
            api_key: Some(
                raw.api_key
                    .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            )
            .filter(|name| !name.trim().is_empty()),
            api_path: raw
                .api_path
                .unwrap_or_else(|| DEFAULT_OPENAI_API_PATH.to_string()),
        }
    }
}

impl ModelProviderConfig {
    /// Check if this provider speaks the OpenAI chat-completions format (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_task_runner::config::ModelProviderConfig;
    ///
    /// let mut provider = ModelProviderConfig::default();
    /// assert!(provider.is_openai());
    /// provider.provider_type = "Gemini".to_string();
    /// assert!(!provider.is_openai());
    /// ```
    pub fn is_openai(&self) -> bool {
        self.provider_type.eq_ignore_ascii_case("openai")
    }
}
