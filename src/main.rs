// Entry point of the office-hooks CLI.
//
// **Architecture Overview:**
// - `office_hooks::core` = Business logic (no HTTP types)
// - `office_hooks::infra` = Implementations of core traits (Google, Chatwork, ...)
// - `cli/` = Argument parsing and command adapters
//
// This file's job is to:
// 1. Initialize logging
// 2. Load configuration (.env, then flags and environment variables)
// 3. Hand the parsed command to the CLI layer

#[path = "cli/cli_layer.rs"]
mod cli;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening. Logs go to stderr,
    // stdout carries command output.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables from .env file (if it exists) before clap
    // reads its `env = ...` fallbacks.
    dotenv::dotenv().ok();

    let cli = cli::Cli::parse();
    cli::run(cli).await
}
