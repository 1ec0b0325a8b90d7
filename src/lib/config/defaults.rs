//! Built-in defaults used when `runner.toml` omits a value.

pub const DEFAULT_AGENT_NAME: &str = "notion_agent";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TURNS: usize = 5;
pub const DEFAULT_TERMINATION_TOKEN: &str = "TERMINATE";

pub const DEFAULT_PROVIDER_ID: &str = "openai";
pub const DEFAULT_PROVIDER_TYPE: &str = "openai";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_API_PATH: &str = "/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_TOOL_SERVER_NAME: &str = "notion";
pub const DEFAULT_TOOL_SERVER_COMMAND: &str = "npx";
pub const DEFAULT_TOOL_SERVER_ARGS: &[&str] = &["-y", "mcp-remote", "https://mcp.notion.com/mcp"];
pub const DEFAULT_TOOL_SERVER_CREDENTIAL_ENV: (&str, &str) = ("NOTION_API_KEY", "${NOTION_SECRET}");
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 20;

pub const DEFAULT_BIND: &str = "127.0.0.1:7001";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can search and summarize content from the user's Notion workspace and also list what is asked. Try to assume the tool and call the same and get the answer. Say TERMINATE when you are done with the task.";
