//! templift CLI - upgrades AngularJS templates to Angular template syntax.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use commands::upgrade::UpgradeArgs;

#[derive(Parser)]
#[command(name = "templift")]
#[command(about = "Upgrade AngularJS templates to Angular template syntax")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to templift.toml config file
    #[arg(short, long, default_value = "templift.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default templift.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Upgrade template files, directories or stdin
    Upgrade(UpgradeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for template output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
        Commands::Upgrade(args) => {
            let config = config::load_config(&cli.config)?;
            commands::upgrade::run(args, config)?;
        }
    }

    Ok(())
}
