//! # LA Times News Scraper
//!
//! Searches the Los Angeles Times for a phrase, narrows the results by topic
//! and by a window of recent months, and exports every matching article to a
//! CSV spreadsheet together with its downloaded image.
//!
//! ## Usage
//!
//! ```sh
//! latimes_news_scraper --search-phrase Nvidia --topics '[Business]' --months 3
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: resolve the search inputs from flags, environment and work item
//! 2. **Navigation**: drive a Chromium session through search, filters and sorting
//! 3. **Extraction**: read each results page concurrently (10 items at a time),
//!    downloading images and deriving phrase counts and money mentions
//! 4. **Output**: write the spreadsheet; images and the log sit next to it

use clap::Parser;
use std::error::Error;
use std::fs::{self as stdfs, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod browser;
mod cli;
mod config;
mod dates;
mod error;
mod images;
mod models;
mod outputs;
mod portal;
mod scrapers;
#[cfg(test)]
mod testing;
mod utils;

use browser::chromium::ChromiumBrowser;
use cli::Cli;
use config::{SearchConfig, WorkItem};
use outputs::spreadsheet;
use scrapers::latimes::{ScrapeOptions, scrape_news};
use utils::ensure_writable_dir;

/// Stdout plus a plain-text copy of every event in `log_path`.
fn init_tracing(log_path: &Path) -> Result<(), Box<dyn Error>> {
    let log_file = OpenOptions::new().create(true).append(true).open(log_path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tfmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(UtcTime::rfc_3339()),
        )
        .with(
            tfmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // The log file lives in the output directory by default.
    stdfs::create_dir_all(&args.output_dir)?;
    let log_path = args
        .log_file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(&args.output_dir).join("app.log"));
    init_tracing(&log_path)?;

    let start_time = std::time::Instant::now();
    info!("news scraper starting up");
    debug!(?args, "Parsed CLI arguments");

    let output_dir = PathBuf::from(&args.output_dir);
    if let Err(e) = ensure_writable_dir(&output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let work_item = match &args.work_item {
        Some(path) => WorkItem::load(path).await?,
        None => WorkItem::default(),
    };
    let config = SearchConfig::resolve(
        args.search_phrase.clone(),
        args.topics.clone(),
        args.number_of_months.clone(),
        work_item,
    );
    config.log_summary();

    let timeout = Duration::from_secs(args.timeout_secs);
    let fetcher = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let browser = ChromiumBrowser::launch(!args.headful, timeout).await?;
    let options = ScrapeOptions {
        image_dir: output_dir.clone(),
        timeout,
    };

    let news = match scrape_news(browser, &config, fetcher, options).await {
        Ok(news) => news,
        Err(e) => {
            error!(error = %e, "Scrape aborted");
            return Err(e.into());
        }
    };

    let spreadsheet_path = output_dir.join(format!("{}.csv", args.spreadsheet_name));
    if let Err(e) = spreadsheet::write_records(&news, &spreadsheet_path) {
        error!(path = %spreadsheet_path.display(), error = %e, "Failed to write spreadsheet");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = news.len(),
        with_images = news.iter().filter(|n| n.image_file_name.is_some()).count(),
        "Execution complete"
    );
    Ok(())
}
