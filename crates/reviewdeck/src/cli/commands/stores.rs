//! Stores command - show which stores are configured

use clap::Args;
use console::style;

use reviewdeck_core::Vendor;
use reviewdeck_dispatch::{DispatchError, ReviewDispatcher};

use crate::cli::{Cli, OutputFormat};

/// Show configured stores
#[derive(Debug, Args)]
pub struct StoresCommand {}

impl StoresCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config()?;

        let available = match ReviewDispatcher::from_config(&config) {
            Ok(dispatcher) => dispatcher.available_stores(),
            // Nothing configured is still worth reporting, not an error here
            Err(DispatchError::NoCredentials) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        if cli.format == OutputFormat::Json {
            let rows: Vec<serde_json::Value> = Vendor::all()
                .into_iter()
                .map(|vendor| {
                    serde_json::json!({
                        "store": vendor.to_string(),
                        "scheme": vendor.scheme(),
                        "configured": available.contains(&vendor),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        for vendor in Vendor::all() {
            let state = if available.contains(&vendor) {
                style("configured").green()
            } else {
                style("not configured").dim()
            };
            println!("{:<14} {}", vendor.to_string(), state);
        }

        if available.is_empty() && !cli.quiet {
            println!();
            println!(
                "{}",
                style("Add an [app_store] or [google_play] section to reviewdeck.toml").yellow()
            );
        }

        Ok(())
    }
}
