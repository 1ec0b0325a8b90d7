use clap::Parser;
use mcp_task_runner::Cli;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    mcp_task_runner::run(cli).await
}
