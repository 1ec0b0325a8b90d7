// Config loading tests - AppConfig::load against files on disk
//
// Covers defaults, overrides and validation errors.

use mcp_task_runner::config::{AppConfig, ConfigError};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("runner.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_explicit_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/runner.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn empty_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "");

    let config = AppConfig::load(Some(&path)).expect("defaults are valid");

    assert_eq!(config.agent.name, "notion_agent");
    assert_eq!(config.agent.model, "gpt-4o-mini");
    assert_eq!(config.agent.max_turns, 5);
    assert_eq!(config.agent.termination_token, "TERMINATE");
    assert!(config.agent.system_prompt.contains("TERMINATE"));
    assert!(config.provider.is_openai());
    assert_eq!(config.provider.api_key.as_deref(), Some("OPENAI_API_KEY"));
    assert_eq!(config.tool_server.name, "notion");
    assert_eq!(config.tool_server.read_timeout, Duration::from_secs(20));
    assert_eq!(
        config.rest_server.bind,
        "127.0.0.1:7001".parse::<SocketAddr>().expect("addr")
    );
}

#[test]
fn overrides_every_section() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[agent]
name = "ops_agent"
model = "gpt-4.1"
system_prompt = "Be brief. Say DONE when finished."
max_turns = 3
termination_token = "DONE"

[provider]
type = "openai"
endpoint = "http://127.0.0.1:8000"
api_path = "/v1/chat/completions"
api_key = "LOCAL_KEY"

[tool_server]
name = "files"
command = "/usr/local/bin/files-mcp"
args = ["--root", "/srv"]
read_timeout_secs = 3

[tool_server.env]
FILES_TOKEN = "plain"

[server]
bind = "0.0.0.0:9000"
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("valid config");

    assert_eq!(config.agent.name, "ops_agent");
    assert_eq!(config.agent.max_turns, 3);
    assert_eq!(config.agent.termination_token, "DONE");
    assert_eq!(config.provider.endpoint, "http://127.0.0.1:8000");
    assert_eq!(config.provider.api_key.as_deref(), Some("LOCAL_KEY"));
    assert_eq!(config.tool_server.name, "files");
    assert_eq!(config.tool_server.args, vec!["--root", "/srv"]);
    assert_eq!(
        config.tool_server.env.get("FILES_TOKEN").map(String::as_str),
        Some("plain")
    );
    assert_eq!(config.tool_server.read_timeout, Duration::from_secs(3));
    assert_eq!(config.rest_server.bind.port(), 9000);
}

#[test]
fn rejects_zero_max_turns() {
    let result = AppConfig::from_toml_str("[agent]\nmax_turns = 0\n");
    assert!(matches!(result, Err(ConfigError::InvalidMaxTurns)));
}

#[test]
fn rejects_empty_termination_token() {
    let result = AppConfig::from_toml_str("[agent]\ntermination_token = \"  \"\n");
    assert!(matches!(
        result,
        Err(ConfigError::EmptyField {
            field: "agent.termination_token"
        })
    ));
}

#[test]
fn rejects_zero_read_timeout() {
    let result = AppConfig::from_toml_str("[tool_server]\nread_timeout_secs = 0\n");
    assert!(matches!(result, Err(ConfigError::InvalidReadTimeout)));
}

#[test]
fn rejects_invalid_bind_address() {
    let result = AppConfig::from_toml_str("[server]\nbind = \"not-an-address\"\n");
    assert!(matches!(result, Err(ConfigError::InvalidBind { .. })));
}

#[test]
fn reports_parse_errors_with_path() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[agent\nname = ");

    let result = AppConfig::load(Some(&path));

    match result {
        Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}
