//! Reviews command - fetch customer reviews for an app

use clap::Args;
use console::style;

use reviewdeck_core::{ReviewRequest, SortOrder};
use reviewdeck_dispatch::ReviewDispatcher;

use crate::cli::{Cli, OutputFormat};

/// Fetch customer reviews for an app
#[derive(Debug, Args)]
pub struct ReviewsCommand {
    /// App name, bundle/package id or native id
    pub app: String,

    /// Sort order
    #[arg(long, default_value = "newest")]
    pub sort: SortArg,

    /// ISO 3166-1 alpha-2 country filter (e.g. "us")
    #[arg(long)]
    pub country: Option<String>,

    /// Maximum reviews per page
    #[arg(long, default_value = "100")]
    pub limit: usize,

    /// Pagination cursor from a previous page
    #[arg(long)]
    pub cursor: Option<String>,
}

/// CLI-facing sort names
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortArg {
    Newest,
    Oldest,
    Highest,
    Lowest,
    Helpful,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Newest => SortOrder::NewestFirst,
            SortArg::Oldest => SortOrder::OldestFirst,
            SortArg::Highest => SortOrder::HighestRatingFirst,
            SortArg::Lowest => SortOrder::LowestRatingFirst,
            SortArg::Helpful => SortOrder::MostHelpful,
        }
    }
}

impl ReviewsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config()?;
        let dispatcher = ReviewDispatcher::from_config(&config)?;

        let request = ReviewRequest {
            sort: self.sort.into(),
            country: self.country.clone(),
            cursor: self.cursor.clone(),
            limit: self.limit,
        };

        let page = dispatcher.get_reviews(&self.app, &request).await?;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&page)?);
            return Ok(());
        }

        if page.reviews.is_empty() {
            println!("No reviews found");
        }

        for review in &page.reviews {
            let stars = "★".repeat(review.rating as usize);
            let date = review
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            let reviewer = review.reviewer.as_deref().unwrap_or("anonymous");

            println!(
                "{} {} {} {}",
                style(&review.id).dim(),
                style(&stars).yellow(),
                reviewer,
                style(&date).dim()
            );
            if let Some(title) = &review.title {
                println!("  {}", style(title).bold());
            }
            if !review.body.is_empty() {
                println!("  {}", review.body);
            }
            if let Some(response) = &review.response {
                println!("  {} {}", style("↳ response:").green(), response.body);
            }
            println!();
        }

        if let Some(total) = page.pagination.total_count {
            println!("{} of {} reviews", page.reviews.len(), total);
        }
        if let Some(cursor) = &page.pagination.next_cursor {
            println!("More pages: {} {}", style("--cursor").cyan(), cursor);
        }
        for warning in &page.warnings {
            eprintln!("{} {}", style("warning:").yellow().bold(), warning);
        }

        Ok(())
    }
}
