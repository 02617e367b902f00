//! Data models for search parameters, result cards and extracted records.
//!
//! - [`SearchFilter`]: what to search for and how far back to look
//! - [`ArticleCard`]: the raw text read from one search result position
//! - [`Record`]: one accepted article, ready for export
//! - [`StopReason`] / [`ExtractionReport`]: why and where the extraction loop ended

use chrono::NaiveDateTime;
use std::fmt;

/// Search parameters supplied once at startup.
///
/// Built from the work item by [`crate::config`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Phrase typed into the site search and counted in titles/descriptions.
    pub search_phrase: String,
    /// Optional news category/section/topic to narrow the results.
    pub category: Option<String>,
    /// How many months of results to keep (0 and 1 both mean "this month").
    pub months_back: u32,
}

/// Text of a single search result card, as read from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    pub title: String,
    /// The date fragment preceding the `...` delimiter in the excerpt.
    pub raw_date_text: String,
    pub description: String,
}

/// One accepted article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    /// Publication time, resolved against the local clock for relative dates.
    pub published_at: NaiveDateTime,
    pub description: String,
    /// Case-insensitive occurrences of the search phrase in the title.
    pub title_match_count: usize,
    /// Case-insensitive occurrences of the search phrase in the description.
    pub description_match_count: usize,
    /// Whether the title or description mentions a dollar amount.
    pub money_mentioned: bool,
    /// Basename of the downloaded picture, empty when there is none.
    pub picture_filename: String,
}

/// Why the extraction loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No card exists at the next position.
    EndOfResults,
    /// The card at `index` was published before the cutoff.
    BeforeCutoff { index: usize },
    /// Processing the card at `index` failed.
    Failed { index: usize, message: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EndOfResults => write!(f, "end of results"),
            StopReason::BeforeCutoff { index } => write!(f, "card {index} is older than the cutoff"),
            StopReason::Failed { index, message } => write!(f, "card {index} failed: {message}"),
        }
    }
}

/// Outcome of a whole extraction run.
#[derive(Debug)]
pub struct ExtractionReport {
    /// Accepted records in page order.
    pub records: Vec<Record>,
    pub stop: StopReason,
    /// Earliest accepted publication time.
    pub cutoff: NaiveDateTime,
}
