use super::agent::AgentConfig;
use super::defaults::DEFAULT_BIND;
use super::error::ConfigError;
use super::provider::ModelProviderConfig;
use super::server::ServerConfig;
use std::net::SocketAddr;
use std::path::Path;

/// Application configuration loaded from runner.toml
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub provider: ModelProviderConfig,
    pub tool_server: ServerConfig,
    pub rest_server: RestServerConfig,
}

/// Settings for the HTTP surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestServerConfig {
    pub bind: SocketAddr,
}

impl Default for RestServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 7001)),
        }
    }
}

impl RestServerConfig {
    pub(super) fn parse(bind: Option<String>) -> Result<Self, ConfigError> {
        let value = bind.unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = value
            .parse()
            .map_err(|source| ConfigError::InvalidBind { value, source })?;
        Ok(Self { bind })
    }
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from TOML text without touching the filesystem
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, Path::new("<inline>"))
    }
}
