use std::sync::Arc;

use anyhow::{Context, Error, Result};
use clap::Parser;
use gitsearch::{
    args::Args,
    config::{logging::setup_logging, settings::Config},
    services::{
        github::GitHubClient,
        session::SearchSession,
    },
    utils::helpers::format_results,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    let config = Config::load()?;

    let _guard = setup_logging(&config.log_dir);

    tracing::info!("GitHub API url: {}", config.github_api_url);

    let client = GitHubClient::from_config(&config).context("Failed to build GitHub client")?;

    tracing::info!("GitHub client initialized");

    let page_size = args.page_size.unwrap_or(config.page_size);
    let max_pages = args.pages.unwrap_or(config.max_pages);

    let session = SearchSession::initiate(Arc::new(client), &args.joined_query())
        .context("Cannot start a search")?
        .with_page_size(page_size);

    if let Err(e) = session.search_pages(max_pages).await {
        tracing::error!(
            "Stopping at page {} of '{}': {}",
            session.page(),
            session.query(),
            e
        );
    }

    println!(
        "{}",
        format_results(session.query(), &session.results(), session.is_completed())
    );

    if let Some(total) = session.total_count() {
        tracing::info!("{} repositories match '{}'", total, session.query());
    }

    Ok(())
}
