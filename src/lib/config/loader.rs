use super::agent::{AgentConfig, RawAgent};
use super::app::{AppConfig, RestServerConfig};
use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RawProviderConfig};
use super::server::{RawServer, ServerConfig};
use crate::constants::{CONFIG_PATH, ENV_PATH, LOCAL_ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::{debug, info};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    agent: RawAgent,
    #[serde(default)]
    provider: RawProviderConfig,
    #[serde(default)]
    tool_server: RawServer,
    #[serde(default)]
    server: RawRestServer,
}

#[derive(Debug, Deserialize, Default)]
struct RawRestServer {
    bind: Option<String>,
}

/// Ensures environment variables are loaded from config/.env, then ./.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        for path in [ENV_PATH, LOCAL_ENV_PATH] {
            if from_filename(path).is_ok() {
                debug!(path, "Loaded environment file");
            }
        }
    });
}

/// Load and validate configuration.
///
/// An explicit path must exist. Without one the default path is tried and
/// built-in defaults are used when it is absent.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            match read_config(default_path) {
                Err(ConfigError::NotFound { .. }) => {
                    info!(
                        path = %default_path.display(),
                        "No configuration file found; using built-in defaults"
                    );
                    validate_and_build(RawConfig::default())
                }
                other => other,
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading runner configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    if parsed.tool_server.read_timeout_secs() == Some(0) {
        return Err(ConfigError::InvalidReadTimeout);
    }

    let agent = AgentConfig::from(parsed.agent);
    require_non_empty("agent.name", &agent.name)?;
    require_non_empty("agent.model", &agent.model)?;
    require_non_empty("agent.termination_token", &agent.termination_token)?;
    if agent.max_turns == 0 {
        return Err(ConfigError::InvalidMaxTurns);
    }

    let provider = ModelProviderConfig::from(parsed.provider);
    require_non_empty("provider.endpoint", &provider.endpoint)?;

    let tool_server = ServerConfig::from(parsed.tool_server);
    require_non_empty("tool_server.name", &tool_server.name)?;
    require_non_empty(
        "tool_server.command",
        &tool_server.command.to_string_lossy(),
    )?;

    let rest_server = RestServerConfig::parse(parsed.server.bind)?;

    Ok(AppConfig {
        agent,
        provider,
        tool_server,
        rest_server,
    })
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyField { field })
    } else {
        Ok(())
    }
}
