//! Respond and delete-response commands

use clap::Args;
use console::style;

use reviewdeck_dispatch::ReviewDispatcher;

use crate::cli::{Cli, OutputFormat};

/// Respond to a review
#[derive(Debug, Args)]
pub struct RespondCommand {
    /// Scoped review id (e.g. "as:123" or "gp:com.example.app/abc")
    pub id: String,

    /// Response text
    pub text: String,
}

impl RespondCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let dispatcher = ReviewDispatcher::from_config(&config)?;

        let response = dispatcher.respond_to_review(&self.id, &self.text).await?;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        if !cli.quiet {
            println!("Response published as {}", style(&response.id).cyan());
        }
        Ok(())
    }
}

/// Delete a developer response
#[derive(Debug, Args)]
pub struct DeleteResponseCommand {
    /// Scoped response id (e.g. "as:555")
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl DeleteResponseCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        if !self.yes {
            anyhow::bail!(
                "deleting a response cannot be undone; re-run with --yes to confirm"
            );
        }

        let config = cli.load_config()?;
        let dispatcher = ReviewDispatcher::from_config(&config)?;

        dispatcher.delete_review_response(&self.id).await?;

        if !cli.quiet {
            println!("Deleted response {}", style(&self.id).cyan());
        }
        Ok(())
    }
}
