pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, orchestrator, tooling};
pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use domain::types;
pub use infrastructure::{model, server};

use domain::Task;
use orchestrator::TaskOrchestrator;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting mcp-task-runner");
    debug!(config = ?cli.config, command = ?cli.command, "CLI arguments parsed");

    let config = AppConfig::load(cli.config.as_deref())?;
    match &cli.config {
        Some(path) => info!(path = %path.display(), "Loaded configuration from file"),
        None => info!("Loaded configuration using default path or defaults"),
    }

    let orchestrator = Arc::new(TaskOrchestrator::from_config(&config)?);
    let command = cli.command.unwrap_or(Command::Serve { addr: None });

    match command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or(config.rest_server.bind);
            info!(%addr, "Starting REST server");
            server::serve(orchestrator, addr).await?;
        }
        Command::Run { task_file, task } => {
            let task = load_task(task_file, task)?;
            info!("Dispatching single task via CLI");
            let outcome = orchestrator.execute_task(task).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    info!("Runner finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    });
}

fn load_task(task_file: Option<PathBuf>, words: Vec<String>) -> Result<Task, Box<dyn Error>> {
    let text = match task_file {
        Some(path) => {
            info!(path = %path.display(), "Loading task from file");
            fs::read_to_string(path)?
        }
        None => words.join(" "),
    };

    Task::new(text.trim()).ok_or_else(|| {
        warn!("Task not provided via arguments or file");
        "task required via arguments or --task-file".into()
    })
}
