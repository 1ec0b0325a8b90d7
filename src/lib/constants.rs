//! Application constants
//!
//! Single source of truth for paths and other constants.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/runner.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Fallback environment file in the working directory
pub const LOCAL_ENV_PATH: &str = ".env";
