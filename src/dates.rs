//! Date handling for search result cards.
//!
//! Two concerns live here:
//! - the **cutoff**: the earliest publication time still worth extracting,
//!   derived from the configured number of months
//! - the **card date**: the fragment in front of a card's excerpt, which is
//!   either relative (`"5 hours ago"`) or an absolute calendar date
//!
//! Every function takes `now` explicitly so results are reproducible.

use crate::error::{Result, ScrapeError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, instrument};

/// Formats tried, in order, for absolute timestamps that carry a time of day.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Formats tried, in order, for date-only values (resolved to midnight).
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%A, %B %d, %Y",
];

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Compute the earliest publication time to keep.
///
/// - `months_back` 0 or 1: midnight on the first day of the current month.
/// - `months_back` > 1: step back `(months_back - 1) * 30` days from the 15th
///   of the current month, then take the first day of the month landed in.
///
/// The 30-day month is deliberate; it is not calendar-exact.
///
/// # Arguments
///
/// * `now` - Reference time of the run.
/// * `months_back` - How many months of results to keep.
///
/// # Returns
///
/// Midnight on the first day of the earliest accepted month.
///
/// # Examples
///
/// ```ignore
/// // 2024-05-20 with 3 months: 2024-05-15 - 60 days = 2024-03-16 -> 2024-03-01
/// let cutoff = compute_cutoff(now, 3);
/// ```
#[instrument(level = "debug", skip(now))]
pub fn compute_cutoff(now: NaiveDateTime, months_back: u32) -> NaiveDateTime {
    let this_month = first_of_month(now.date());
    let start = if months_back <= 1 {
        this_month
    } else {
        let middle = this_month + Duration::days(14);
        let back = middle - Duration::days(i64::from(months_back - 1) * 30);
        first_of_month(back)
    };
    let cutoff = start.and_time(NaiveTime::MIN);
    debug!(%cutoff, "Computed cutoff");
    cutoff
}

/// Parse the date fragment of a card excerpt.
///
/// Fragments containing `"ago"` are relative to `now`; anything else goes
/// through [`parse_absolute`].
///
/// # Arguments
///
/// * `text` - Date fragment, e.g. `"5 hours ago"` or `"January 3, 2024"`.
/// * `now` - Reference time for relative fragments.
///
/// # Returns
///
/// The card timestamp, or a [`ScrapeError`] date variant when the fragment
/// matches no supported shape.
pub fn parse_card_date(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    if text.contains("ago") {
        parse_relative(text, now)
    } else {
        parse_absolute(text)
    }
}

/// Parse `"<value> <unit> ago"`.
///
/// Exactly three whitespace-separated tokens are required. The unit may be
/// singular or plural hours, minutes or days; the site sometimes renders
/// `minutes` with a soft hyphen (`min\u{ad}utes`), which is accepted too.
pub fn parse_relative(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [value, unit, _] = tokens.as_slice() else {
        return Err(ScrapeError::RelativeDate(text.to_string()));
    };

    let value: i64 = value
        .parse()
        .map_err(|_| ScrapeError::RelativeDate(text.to_string()))?;

    let delta = match *unit {
        "hour" | "hours" => Duration::try_hours(value),
        "minute" | "minutes" | "min\u{ad}utes" => Duration::try_minutes(value),
        "day" | "days" => Duration::try_days(value),
        _ => return Err(ScrapeError::RelativeDate(text.to_string())),
    }
    .ok_or_else(|| ScrapeError::DateOutOfRange(text.to_string()))?;

    now.checked_sub_signed(delta)
        .ok_or_else(|| ScrapeError::DateOutOfRange(text.to_string()))
}

/// Parse an absolute calendar date or timestamp.
///
/// Accepts RFC 3339, RFC 2822 and a handful of human formats such as
/// `January 3, 2024`, `Jan. 3, 2024` or `3 January 2024`. Offsets are
/// dropped; the wall-clock time is kept.
pub fn parse_absolute(text: &str) -> Result<NaiveDateTime> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.naive_local());
    }

    // "Sept. 3, 2024" -> "Sep 3, 2024"
    let normalized = trimmed.replace("Sept.", "Sep").replace('.', "");

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, fmt) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(ScrapeError::AbsoluteDate(trimmed.to_string()))
}
