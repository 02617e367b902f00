//! Text analysis applied to every accepted article.
//!
//! - [`count_phrase`]: how often the search phrase occurs in a piece of text
//! - [`mentions_money`]: whether a text refers to a dollar amount

use once_cell::sync::Lazy;
use regex::Regex;

/// A dollar sign, `<digits> dollars`, or `<digits> USD` (spacing optional).
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$|\d+ dollars|\d+\s*USD").expect("money pattern is valid")
});

/// Count case-insensitive, non-overlapping occurrences of `phrase` in `text`.
///
/// Matches are plain substrings, not words: `"cat"` occurs twice in
/// `"Cats and Catnip"`.
///
/// # Arguments
///
/// * `text` - Title or description to search.
/// * `phrase` - Search phrase.
///
/// # Returns
///
/// The number of matches, or 0 when `phrase` is empty.
pub fn count_phrase(text: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&phrase.to_lowercase()).count()
}

/// Whether `text` mentions a dollar amount.
pub fn mentions_money(text: &str) -> bool {
    MONEY_RE.is_match(text)
}
