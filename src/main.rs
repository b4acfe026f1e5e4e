use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use reqwest::Client;

use krx_snapshot::config::CrawlerConfig;
use krx_snapshot::error::{AppError, Context, Result};
use krx_snapshot::fetch::{DirectoryFetcher, FetchStrategy, QuoteClient};
use krx_snapshot::report::aggregate;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let strategy_name = args.next().unwrap_or_else(|| "dynamic".to_string());
    let config = match args.next() {
        Some(path) => CrawlerConfig::load(&path)?,
        None => CrawlerConfig::default(),
    };

    let strategy = FetchStrategy::from_name(&strategy_name, config.worker_count).ok_or_else(
        || {
            AppError::message(format!(
                "unknown strategy `{strategy_name}` (expected sequential, dynamic or static)"
            ))
        },
    )?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    // An empty or unreachable directory aborts the run: with no roster there
    // is nothing to fetch.
    let directory = DirectoryFetcher::new(client.clone(), &config);
    let companies = directory.fetch().await?;
    info!(
        "directory listing returned {} companies, fetching with {:?}",
        companies.len(),
        strategy
    );

    let quotes = Arc::new(QuoteClient::new(client, &config));
    let started = Instant::now();
    let outcomes = strategy.run(companies, quotes).await;
    let report = aggregate(outcomes, started.elapsed());
    report.log_summary();

    Ok(())
}
