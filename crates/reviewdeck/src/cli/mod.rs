//! CLI definition and command handling

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    AppsCommand, DeleteResponseCommand, RespondCommand, ReviewsCommand, StoresCommand,
};

/// Reviewdeck - customer reviews across app stores from one place
#[derive(Debug, Parser)]
#[command(name = "reviewdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to a config file (skips the reviewdeck.toml search)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show configured stores
    Stores(StoresCommand),

    /// Manage the local app directory
    Apps(AppsCommand),

    /// Fetch customer reviews for an app
    Reviews(ReviewsCommand),

    /// Respond to a review
    Respond(RespondCommand),

    /// Delete a developer response
    DeleteResponse(DeleteResponseCommand),
}

impl Cli {
    pub fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Stores(cmd) => cmd.execute(self),
            Commands::Apps(cmd) => cmd.execute(self),
            Commands::Reviews(cmd) => cmd.execute(self),
            Commands::Respond(cmd) => cmd.execute(self),
            Commands::DeleteResponse(cmd) => cmd.execute(self),
        }
    }

    /// Load configuration: the explicit `--config` path when given, otherwise
    /// searching from the working directory.
    pub fn load_config(&self) -> anyhow::Result<reviewdeck_core::Config> {
        match &self.config {
            Some(path) => Ok(reviewdeck_core::config::load_config(path)?),
            None => {
                let cwd = std::env::current_dir()?;
                let (config, _path) = reviewdeck_core::config::load_config_or_default(&cwd)?;
                Ok(config)
            }
        }
    }
}
