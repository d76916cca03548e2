#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that authors, inspects and plays Wumpus World caves.

mod commands;
mod config;
mod world_transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{
    commands::{ExportArgs, ImportArgs, InspectArgs, NewArgs, PlayArgs},
    config::{CliConfig, LoggingConfig},
};

/// Headless driver for the Wumpus World simulator.
#[derive(Debug, Parser)]
#[command(name = "wumpus", version, long_about = None)]
struct Cli {
    /// Configuration file (defaults to wumpus.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Author a world and save it
    New(NewArgs),
    /// Play a world with a list of actions
    Play(PlayArgs),
    /// Print bounds, landmarks and cells of a world file
    Inspect(InspectArgs),
    /// Print a world file as a transfer string
    Export(ExportArgs),
    /// Write a world file from a transfer string
    Import(ImportArgs),
}

/// Entry point for the Wumpus World command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    match cli.command {
        CliCommand::New(args) => args.execute(),
        CliCommand::Play(args) => args.execute(&config),
        CliCommand::Inspect(args) => args.execute(),
        CliCommand::Export(args) => args.execute(),
        CliCommand::Import(args) => args.execute(),
    }
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("invalid logging filter {:?}", config.filter))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
