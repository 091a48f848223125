//! Discover command - search GitHub and save repositories.csv

use anyhow::{Context, Result};
use console::style;
use std::time::Duration;

use super::ui;
use crate::config::{DiscoveryConfig, UserConfig, TOKEN_ENV};
use crate::error::HarvestError;
use crate::github::{
    discover_to_csv, load_query, Discovery, DiscoveryRequest, RetryPolicy, UreqTransport,
    DEFAULT_QUERY,
};

pub fn run(settings: &DiscoveryConfig) -> Result<()> {
    let user = UserConfig::load()?;
    let token = user
        .github_token()
        .ok_or(HarvestError::MissingToken { env_var: TOKEN_ENV })?;

    let query = match &settings.query_file {
        Some(path) => load_query(path)?,
        None => DEFAULT_QUERY.to_string(),
    };

    let transport = UreqTransport::new(
        settings.endpoint.as_str(),
        token,
        Duration::from_secs(settings.timeout_secs),
    );
    let retry = RetryPolicy::new(settings.max_retries, settings.retry_base);
    let discovery = Discovery::new(transport, query, retry);
    let request = DiscoveryRequest {
        search: settings.search.clone(),
        page_size: settings.page_size,
        max_repos: settings.max_repos,
    };

    ui::print_header(&format!("Searching GitHub: {}", settings.search));
    let spinner = ui::spinner("Collecting repositories...");
    let result = discover_to_csv(&discovery, &request, &settings.output, |n| {
        spinner.set_message(format!("Collected {} repositories...", n));
    });
    spinner.finish_and_clear();

    let records = result.context("Repository discovery failed")?;
    println!(
        "{} Saved {} with {} repositories",
        style("✓").green(),
        settings.output.display(),
        records.len()
    );
    Ok(())
}
