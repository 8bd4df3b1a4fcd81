//! ATOM CLI
//!
//! Terminal interface for the agent trust engine. State is kept as JSON in a
//! local state directory so successive invocations build on each other.

mod commands;
mod output;
mod settings;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::Context;
use state::StateDir;

#[derive(Parser)]
#[command(name = "atom")]
#[command(author = "LogicCrafter")]
#[command(version = "0.1.0")]
#[command(about = "ATOM - Agent trust scoring from on-chain feedback", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// State directory (defaults to ~/.atom)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the engine configuration and record default identities
    Init(commands::init::InitArgs),

    /// Show or update the engine configuration
    Config(commands::config::ConfigArgs),

    /// Manage the local asset directory (collections and agents)
    Directory(commands::directory::DirectoryArgs),

    /// Create, update, inspect and revoke agent stats
    Stats(commands::stats::StatsArgs),

    /// Print derived record addresses
    Address(commands::address::AddressArgs),
}

fn main() {
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let state = match StateDir::resolve(cli.state_dir) {
        Ok(s) => s,
        Err(e) => return commands::state_failure(e),
    };
    let settings = match state.load_settings() {
        Ok(s) => s,
        Err(e) => return commands::state_failure(e),
    };
    settings::init_logging(cli.log_level.as_deref(), &settings.logging);

    let ctx = Context { state, settings };
    match cli.command {
        Commands::Init(args) => commands::init::run(ctx, args),
        Commands::Config(args) => commands::config::run(ctx, args),
        Commands::Directory(args) => commands::directory::run(ctx, args),
        Commands::Stats(args) => commands::stats::run(ctx, args),
        Commands::Address(args) => commands::address::run(args),
    }
}
