//! # AP News Scraper
//!
//! Searches AP News for a phrase, walks the newest-first results until they
//! fall outside the requested number of months, and exports what it found.
//!
//! ## Features
//!
//! - Search parameters from a work item file (JSON or YAML) or CLI flags
//! - Relative (`"5 hours ago"`) and absolute card dates
//! - Per-article phrase counts in title and description
//! - Dollar-amount detection
//! - Picture download into a local folder
//! - Spreadsheet export (`.xlsx`)
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=4444 &
//! apnews_scraper --work-item work_item.json
//! ```
//!
//! ## Architecture
//!
//! The pipeline runs one step at a time:
//! 1. **Configuration**: load and validate the search parameters
//! 2. **Search**: open the site, search, filter by category, sort by newest
//! 3. **Extraction**: read cards until the cutoff, end of results or an error
//! 4. **Output**: write the spreadsheet
//!
//! The browser session is closed after step 3 whatever its outcome.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod browser;
mod cli;
mod config;
mod dates;
mod error;
mod extraction;
mod models;
mod outputs;
mod pictures;
mod utils;

use browser::BrowserSession;
use cli::Cli;
use config::Config;
use extraction::extract_records;
use models::{ExtractionReport, SearchFilter};
use outputs::spreadsheet;
use pictures::PictureDownloader;
use utils::ensure_writable_dir;

/// Drive the search UI, then run the extraction loop.
///
/// UI steps that fail are logged and skipped; the loop still runs against
/// whatever page the browser is showing.
#[instrument(level = "info", skip_all)]
async fn search_and_extract(
    session: &BrowserSession,
    pictures: &PictureDownloader,
    filter: &SearchFilter,
) -> ExtractionReport {
    if let Err(e) = session.open_search().await {
        error!(error = %e, "Error opening the search option");
    }
    if let Err(e) = session.enter_search_phrase(&filter.search_phrase).await {
        error!(error = %e, "Error entering the search phrase");
    }
    if let Some(topic) = &filter.category {
        if let Err(e) = session.select_category(topic).await {
            warn!(error = %e, %topic, "Error selecting news category");
        }
    }
    if let Err(e) = session.sort_by_newest().await {
        error!(error = %e, "Error choosing the latest news");
    }

    extract_records(session, pictures, filter, Local::now().naive_local()).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("apnews_scraper starting up");

    // Parse CLI and validate configuration before touching the browser
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let config = Config::load(&args).inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    if let Err(e) = ensure_writable_dir(&config.picture_dir).await {
        error!(
            path = %config.picture_dir.display(),
            error = %e,
            "Picture directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let pictures = PictureDownloader::new(reqwest::Client::new(), &config.picture_dir);

    // ---- Search and extract ----
    let session = BrowserSession::open(&config)
        .await
        .inspect_err(|e| error!(error = %e, "Error opening website"))?;
    let report = search_and_extract(&session, &pictures, &config.filter).await;
    session.close().await;

    info!(
        count = report.records.len(),
        cutoff = %report.cutoff,
        stop = %report.stop,
        "Extracted data"
    );

    // ---- Spreadsheet output ----
    match spreadsheet::write_records(&report.records, &config.excel_file) {
        Ok(()) => info!(path = %config.excel_file.display(), "Data saved"),
        Err(e) => error!(path = %config.excel_file.display(), error = %e, "Error saving data to Excel"),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
