//! Sitepack CLI - static web asset build pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "sitepack")]
#[command(about = "Static web asset build pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the sitepack.toml manifest
    #[arg(short, long, default_value = "sitepack.toml")]
    manifest: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter manifest and source tree
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the build task once
    Build,

    /// Rebuild whenever sources or the manifest change
    Watch {
        /// Only re-run lint, and only when application scripts change
        #[arg(long)]
        js: bool,
    },

    /// Run a named task list from the manifest
    Run {
        /// Task or step name (e.g. "build", "lint", "default")
        task: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command; no subcommand runs the manifest's default task.
    match cli.command {
        Some(Commands::Init { yes }) => {
            commands::init::run(yes).await?;
        }
        Some(Commands::Build) => {
            commands::build::run(&cli.manifest).await?;
        }
        Some(Commands::Watch { js }) => {
            commands::watch::run(&cli.manifest, js).await?;
        }
        Some(Commands::Run { task }) => {
            commands::run::run(&cli.manifest, &task).await?;
        }
        None => {
            commands::run::run(&cli.manifest, "default").await?;
        }
    }

    Ok(())
}
