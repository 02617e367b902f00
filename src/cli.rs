//! Command-line interface definitions.
//!
//! Every option can also be supplied through an environment variable. The
//! search parameters normally come from the work item file; the
//! `--search-phrase`, `--category` and `--months` flags override it.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the AP News scraper.
///
/// # Examples
///
/// ```sh
/// # Parameters from a work item file
/// apnews_scraper --work-item work_item.json
///
/// # Parameters from flags only, with a visible browser
/// apnews_scraper --search-phrase "climate" --months 2 --headed
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Work item file (JSON or YAML) holding the search parameters
    #[arg(short, long, env = "WORK_ITEM_PATH")]
    pub work_item: Option<PathBuf>,

    /// Search phrase, overrides the work item's "search phrase"
    #[arg(short, long, env = "SEARCH_PHRASE")]
    pub search_phrase: Option<String>,

    /// News category/section/topic, overrides the work item
    #[arg(short, long, env = "NEWS_CATEGORY")]
    pub category: Option<String>,

    /// Number of months of news to keep, overrides the work item
    #[arg(short, long, env = "NUMBER_OF_MONTHS")]
    pub months: Option<u32>,

    /// Home page of the news site
    #[arg(long, env = "NEWS_URL", default_value = "https://apnews.com/")]
    pub url: String,

    /// Spreadsheet to write
    #[arg(short, long, env = "EXCEL_FILE", default_value = "ap_news.xlsx")]
    pub excel_file: PathBuf,

    /// Directory for downloaded pictures
    #[arg(short, long, env = "PICTURE_DIR", default_value = "news_pictures")]
    pub picture_dir: PathBuf,

    /// WebDriver server (chromedriver, selenium) to drive the browser through
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,
}
