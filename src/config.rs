//! Run configuration, loaded and validated once at startup.
//!
//! Search parameters come from a work item: a flat key-value file (JSON, or
//! YAML for `.yaml`/`.yml`) using the keys below. Command-line overrides win
//! over the file.
//!
//! ```json
//! {
//!   "search phrase": "climate change",
//!   "news category/section/topic": "Science",
//!   "number of months": "2"
//! }
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::models::SearchFilter;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_option_number_from_string;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const SEARCH_PHRASE_KEY: &str = "search phrase";
pub const MONTHS_KEY: &str = "number of months";

/// Raw work item contents. Every key is optional until validation.
#[derive(Debug, Default, Deserialize)]
pub struct WorkItem {
    #[serde(rename = "search phrase", default)]
    pub search_phrase: Option<String>,
    #[serde(rename = "news category/section/topic", default)]
    pub category: Option<String>,
    /// Accepts `2` as well as `"2"`.
    #[serde(
        rename = "number of months",
        default,
        deserialize_with = "deserialize_option_number_from_string"
    )]
    pub number_of_months: Option<i64>,
}

/// Everything the pipeline needs, validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub filter: SearchFilter,
    pub url: String,
    pub excel_file: PathBuf,
    pub picture_dir: PathBuf,
    pub webdriver_url: String,
    pub headless: bool,
}

impl Config {
    /// Build the configuration from parsed CLI arguments and the work item
    /// file they point to, if any.
    ///
    /// # Errors
    ///
    /// Fails when the work item cannot be read or parsed, or when the search
    /// phrase or number of months is missing or invalid.
    #[instrument(level = "info", skip_all)]
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let item = match &cli.work_item {
            Some(path) => load_work_item(path)?,
            None => WorkItem::default(),
        };

        let filter = resolve_filter(item, cli)?;
        info!(
            phrase = %filter.search_phrase,
            category = ?filter.category,
            months = filter.months_back,
            "Loaded search parameters"
        );

        Ok(Self {
            filter,
            url: cli.url.clone(),
            excel_file: cli.excel_file.clone(),
            picture_dir: cli.picture_dir.clone(),
            webdriver_url: cli.webdriver_url.clone(),
            headless: !cli.headed,
        })
    }
}

/// Read a work item file, choosing the format by extension.
pub fn load_work_item(path: &Path) -> Result<WorkItem, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Merge CLI overrides into the work item and validate the result.
pub fn resolve_filter(item: WorkItem, cli: &Cli) -> Result<SearchFilter, ConfigError> {
    let search_phrase = cli
        .search_phrase
        .clone()
        .or(item.search_phrase)
        .map(|phrase| phrase.trim().to_string())
        .filter(|phrase| !phrase.is_empty())
        .ok_or(ConfigError::Missing(SEARCH_PHRASE_KEY))?;

    let category = cli
        .category
        .clone()
        .or(item.category)
        .map(|topic| topic.trim().to_string())
        .filter(|topic| !topic.is_empty());

    let months_back = match (cli.months, item.number_of_months) {
        (Some(months), _) => months,
        (None, Some(months)) => u32::try_from(months).map_err(|_| ConfigError::Invalid {
            key: MONTHS_KEY,
            value: months.to_string(),
        })?,
        (None, None) => return Err(ConfigError::Missing(MONTHS_KEY)),
    };

    Ok(SearchFilter {
        search_phrase,
        category,
        months_back,
    })
}
