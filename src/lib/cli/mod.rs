use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mcp-task-runner",
    version,
    about = "Runs tasks through a tool-using agent backed by an MCP server"
)]
pub struct Cli {
    /// Configuration file, defaults to config/runner.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTTP API (default)
    Serve {
        /// Overrides `[server].bind`
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Execute one task and print the outcome as JSON
    Run {
        #[arg(long)]
        task_file: Option<PathBuf>,
        task: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_words() {
        let cli = Cli::parse_from(["mcp-task-runner", "run", "list", "my", "pages"]);
        assert_eq!(
            cli.command,
            Some(Command::Run {
                task_file: None,
                task: vec!["list".into(), "my".into(), "pages".into()],
            })
        );
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from([
            "mcp-task-runner",
            "serve",
            "--addr",
            "0.0.0.0:9000",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Some(Command::Serve { addr: Some(_) })));
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::parse_from(["mcp-task-runner"]);
        assert!(cli.command.is_none());
    }
}
