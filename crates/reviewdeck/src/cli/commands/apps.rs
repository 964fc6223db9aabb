//! Apps command - manage the local app directory

use clap::{Args, Subcommand};
use console::style;

use reviewdeck_core::{AppRecord, Vendor};
use reviewdeck_directory::AppDirectory;
use reviewdeck_dispatch::ReviewDispatcher;

use crate::cli::{Cli, OutputFormat};

/// Manage the local app directory
#[derive(Debug, Args)]
pub struct AppsCommand {
    #[command(subcommand)]
    pub subcommand: AppsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AppsSubcommand {
    /// Refresh the directory from every configured store
    Sync,

    /// List known apps
    List {
        /// Include hidden apps
        #[arg(long)]
        hidden: bool,
    },

    /// Add an app manually (e.g. a Google Play package the API cannot list)
    Add {
        /// Store the app belongs to ("appstore" or "googleplay")
        store: String,

        /// Vendor-native app id (numeric id or package name)
        native_id: String,

        /// Display name
        name: String,

        /// Bundle id / package name, when it differs from the native id
        #[arg(long)]
        bundle_id: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Project/homepage URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Hide an app from default listings
    Hide {
        /// App name, bundle id or native id
        query: String,
    },

    /// Unhide an app
    Unhide {
        /// App name, bundle id or native id
        query: String,
    },

    /// Attach notes to an app
    Note {
        /// App name, bundle id or native id
        query: String,

        /// Note text
        text: String,
    },

    /// Attach a project URL to an app
    Url {
        /// App name, bundle id or native id
        query: String,

        /// Project/homepage URL
        url: String,
    },

    /// Remove an app from the directory
    Remove {
        /// Store the app belongs to ("appstore" or "googleplay")
        store: String,

        /// Native or bundle/package id
        id: String,
    },
}

impl AppsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.subcommand {
            AppsSubcommand::Sync => self.sync(cli).await,
            AppsSubcommand::List { hidden } => self.list(cli, *hidden).await,
            AppsSubcommand::Add {
                store,
                native_id,
                name,
                bundle_id,
                notes,
                url,
            } => {
                let mut record = AppRecord::new(parse_store(store)?, native_id, name);
                record.bundle_id = bundle_id.clone();
                record.notes = notes.clone();
                record.project_url = url.clone();
                self.add(cli, record).await
            }
            AppsSubcommand::Hide { query } => {
                self.edit(cli, query, |record| record.is_hidden = true).await
            }
            AppsSubcommand::Unhide { query } => {
                self.edit(cli, query, |record| record.is_hidden = false).await
            }
            AppsSubcommand::Note { query, text } => {
                let text = text.clone();
                self.edit(cli, query, move |record| record.notes = Some(text))
                    .await
            }
            AppsSubcommand::Url { query, url } => {
                let url = url.clone();
                self.edit(cli, query, move |record| record.project_url = Some(url))
                    .await
            }
            AppsSubcommand::Remove { store, id } => self.remove(cli, store, id).await,
        }
    }

    async fn sync(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let dispatcher = ReviewDispatcher::from_config(&config)?;

        let listing = dispatcher.list_apps().await?;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&listing)?);
            return Ok(());
        }

        print_records(&listing.apps);
        if !cli.quiet {
            println!();
            println!("{} apps known", listing.apps.len());
        }
        for warning in &listing.warnings {
            eprintln!("{} {}", style("warning:").yellow().bold(), warning);
        }

        Ok(())
    }

    async fn list(&self, cli: &Cli, include_hidden: bool) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let mut directory = AppDirectory::new(config.directory_path());
        directory.ensure_loaded().await?;

        let records = directory.get_all(include_hidden);

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!(
                "No apps known yet; run {} first",
                style("reviewdeck apps sync").cyan()
            );
            return Ok(());
        }

        print_records(&records);
        Ok(())
    }

    async fn add(&self, cli: &Cli, record: AppRecord) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let mut directory = AppDirectory::new(config.directory_path());
        directory.ensure_loaded().await?;

        let name = record.name.clone();
        directory.add_or_update(record);
        directory.save().await?;

        if !cli.quiet {
            println!("Added {}", style(name).cyan());
        }
        Ok(())
    }

    async fn edit(
        &self,
        cli: &Cli,
        query: &str,
        apply: impl FnOnce(&mut AppRecord),
    ) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let mut directory = AppDirectory::new(config.directory_path());
        directory.ensure_loaded().await?;

        let mut record = directory
            .resolve(query, true)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no app in the directory matches '{}'", query))?;

        apply(&mut record);
        let name = record.name.clone();
        directory.add_or_update(record);
        directory.save().await?;

        if !cli.quiet {
            println!("Updated {}", style(name).cyan());
        }
        Ok(())
    }

    async fn remove(&self, cli: &Cli, store: &str, id: &str) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let mut directory = AppDirectory::new(config.directory_path());
        directory.ensure_loaded().await?;

        let vendor = parse_store(store)?;
        if !directory.remove(vendor, id) {
            anyhow::bail!("no {} app with id '{}' in the directory", vendor, id);
        }
        directory.save().await?;

        if !cli.quiet {
            println!("Removed {} {}", vendor, style(id).cyan());
        }
        Ok(())
    }
}

fn parse_store(store: &str) -> anyhow::Result<Vendor> {
    Vendor::from_alias(store).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown store '{}'; expected \"appstore\" or \"googleplay\"",
            store
        )
    })
}

fn print_records(records: &[AppRecord]) {
    for record in records {
        let id = record.key_id();
        let version = record.current_version.as_deref().unwrap_or("-");
        let mut line = format!(
            "{:<12} {:<32} {:<36} {}",
            record.vendor.to_string(),
            record.name,
            id,
            version
        );
        if record.is_hidden {
            line.push_str("  [hidden]");
        }
        if record.notes.is_some() {
            line.push_str("  *");
        }
        println!("{}", line);
    }
}
