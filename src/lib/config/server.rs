use super::defaults::{
    DEFAULT_READ_TIMEOUT_SECS, DEFAULT_TOOL_SERVER_ARGS, DEFAULT_TOOL_SERVER_COMMAND,
    DEFAULT_TOOL_SERVER_CREDENTIAL_ENV, DEFAULT_TOOL_SERVER_NAME,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Launch parameters for the MCP tool server spoken to over stdio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
    /// Upper bound on waiting for any single response from the server.
    pub read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(RawServer::default())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct RawServer {
    name: Option<String>,
    command: Option<String>,
    args: Option<Vec<String>>,
    env: Option<HashMap<String, String>>,
    workdir: Option<String>,
    read_timeout_secs: Option<u64>,
}

impl RawServer {
    pub(crate) fn read_timeout_secs(&self) -> Option<u64> {
        self.read_timeout_secs
    }
}

fn expand(value: &str) -> String {
    match shellexpand::full(value) {
        Ok(cow) => cow.into_owned(),
        Err(err) => {
            warn!(value, %err, "Leaving unexpanded value in tool server config");
            value.to_string()
        }
    }
}

impl From<RawServer> for ServerConfig {
    fn from(raw: RawServer) -> Self {
        let command = raw
            .command
            .unwrap_or_else(|| DEFAULT_TOOL_SERVER_COMMAND.to_string());
        let args = raw.args.unwrap_or_else(|| {
            DEFAULT_TOOL_SERVER_ARGS
                .iter()
                .map(|arg| arg.to_string())
                .collect()
        });
        let env = raw.env.unwrap_or_else(|| {
            let (key, value) = DEFAULT_TOOL_SERVER_CREDENTIAL_ENV;
            HashMap::from([(key.to_string(), value.to_string())])
        });

        Self {
            name: raw
                .name
                .unwrap_or_else(|| DEFAULT_TOOL_SERVER_NAME.to_string()),
            command: PathBuf::from(expand(&command)),
            args: args.iter().map(|arg| expand(arg)).collect(),
            env: env
                .into_iter()
                .map(|(key, value)| (key, expand(&value)))
                .collect(),
            workdir: raw.workdir.map(|dir| PathBuf::from(expand(&dir))),
            read_timeout: Duration::from_secs(
                raw.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
            ),
        }
    }
}
