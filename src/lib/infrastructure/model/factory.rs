//! Provider factory - creates clients from config

use super::clients::OpenAIClient;
use super::traits::ModelProvider;
use super::types::ModelError;
use crate::config::ModelProviderConfig;
use std::env;
use std::sync::Arc;
use tracing::warn;

/// Resolve API key from environment variable
pub fn resolve_api_key(provider: &str, spec: Option<&str>) -> Option<String> {
    let raw = spec.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = raw,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates the model client for the configured provider type.
    ///
    /// Only OpenAI-compatible endpoints are supported.
    pub fn create(config: &ModelProviderConfig) -> Result<Arc<dyn ModelProvider>, ModelError> {
        if config.is_openai() {
            Ok(Arc::new(OpenAIClient::from_config(config)))
        } else {
            Err(ModelError::unsupported_provider(&config.provider_type))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn resolves_key_from_named_variable() {
        unsafe {
            env::set_var("TEST_RUNNER_OPENAI_KEY", "sk-test");
        }
        assert_eq!(
            resolve_api_key("openai", Some(" TEST_RUNNER_OPENAI_KEY ")),
            Some("sk-test".to_string())
        );
        unsafe {
            env::remove_var("TEST_RUNNER_OPENAI_KEY");
        }
        assert_eq!(resolve_api_key("openai", Some("TEST_RUNNER_OPENAI_KEY")), None);
        assert_eq!(resolve_api_key("openai", Some("  ")), None);
        assert_eq!(resolve_api_key("openai", None), None);
    }

    #[test]
    fn rejects_unknown_provider_type() {
        let config = ModelProviderConfig {
            provider_type: "gemini".to_string(),
            ..ModelProviderConfig::default()
        };
        assert!(matches!(
            ProviderFactory::create(&config),
            Err(ModelError::UnsupportedProvider { .. })
        ));
        assert!(ProviderFactory::create(&ModelProviderConfig::default()).is_ok());
    }
}
