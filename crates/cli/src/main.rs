mod commands;
mod report;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::Result;
use armybuilder_core::config::{self, AppConfig};
use clap::Parser;
use commands::{Build, Check, Context, Factions, Saves, Units};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Build and check army lists from faction catalogs
#[derive(Parser)]
#[command(name = "armybuilder")]
#[command(about = "Build and check army lists", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file to use instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// List discovered faction catalogs
    Factions(Factions),

    /// Show the unit templates of a faction
    Units(Units),

    /// Build a roster from a request file
    Build(Build),

    /// Re-validate a saved roster
    Check(Check),

    /// List saved rosters
    Saves(Saves),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = match cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => {
            config::ensure_default_config()?;
            AppConfig::load()?
        }
    };
    let ctx = Context::new(config);

    match cli.command {
        Command::Factions(cmd) => cmd.execute(&ctx),
        Command::Units(cmd) => cmd.execute(&ctx),
        Command::Build(cmd) => cmd.execute(&ctx),
        Command::Check(cmd) => cmd.execute(&ctx),
        Command::Saves(cmd) => cmd.execute(&ctx),
    }
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("armybuilder.log"))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
