pub mod agent;
pub mod app;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod provider;
pub mod server;

pub use crate::constants::CONFIG_PATH;

pub use agent::AgentConfig;
pub use app::{AppConfig, RestServerConfig};
pub use error::ConfigError;
pub use provider::ModelProviderConfig;
pub use server::ServerConfig;
