//! `bt`: behavior tree runner.
//!
//! # Examples
//!
//! ```bash
//! # Action_A gets its arguments from a builder closure, Action_B from init
//! cargo run -p bt-cli -- demo
//!
//! # Run a tree document, seeding the root blackboard
//! cargo run -p bt-cli -- run --file crates/bt-cli/trees/countdown.ron -D greeting=hello
//!
//! # List node types and their ports
//! cargo run -p bt-cli -- nodes
//! ```

mod commands;
mod config;
mod logging;
mod nodes;

use anyhow::Result;
use clap::Parser;
use commands::{Demo, Nodes, Run};
use config::CliConfig;

/// Behavior tree runner
#[derive(Parser)]
#[command(name = "bt")]
#[command(about = "Build and tick behavior trees", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Pass construction arguments by closure and by post-construction init
    Demo(Demo),

    /// Load a tree document and tick it until it completes
    Run(Run),

    /// List registered node types
    Nodes(Nodes),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for BT_* variables and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = CliConfig::from_env();
    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    match cli.command {
        Command::Demo(cmd) => cmd.execute(),
        Command::Run(cmd) => cmd.execute(&config),
        Command::Nodes(cmd) => cmd.execute(),
    }
}
