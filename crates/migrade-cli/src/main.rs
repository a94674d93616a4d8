use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod utils;
use commands::{cmd_init, cmd_parse, cmd_plan};

/// migrade command-line interface.
#[derive(Parser, Debug)]
#[command(name = "migrade", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show inclusion decisions for the configured scripts. Dry run: nothing
    /// is applied and nothing is written.
    Plan {
        /// Treat the database as having zero tables.
        #[arg(long)]
        empty_db: bool,
        /// Treat the migration tool as never having run.
        #[arg(long)]
        never_ran: bool,
        /// JSON snapshot of the durable store to decide against.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Classify script paths by the naming convention.
    Parse {
        paths: Vec<String>,
    },
    /// Initialize migrade.json with defaults.
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan {
            empty_db,
            never_ran,
            store,
        } => cmd_plan(empty_db, never_ran, store),
        Commands::Parse { paths } => cmd_parse(paths),
        Commands::Init => cmd_init(),
    }
}
