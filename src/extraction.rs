//! The extraction loop over search result cards.
//!
//! Cards are visited by 1-based position, newest first. Each position yields
//! a [`CardOutcome`] and the loop branches on it:
//!
//! | Outcome | Effect |
//! |---------|--------|
//! | `Accepted` | record appended, move to the next position |
//! | `EndOfResults` | stop, no card at this position |
//! | `BeforeCutoff` | stop, this and every later card is too old |
//! | `Failed` | stop, collected records are kept |
//!
//! The page is assumed sorted by date, so the first card older than the
//! cutoff ends the run without looking at anything after it.

use crate::analysis::{count_phrase, mentions_money};
use crate::dates::{compute_cutoff, parse_card_date};
use crate::error::{Result, ScrapeError};
use crate::models::{ArticleCard, ExtractionReport, Record, SearchFilter, StopReason};
use crate::utils::truncate_for_log;
use chrono::NaiveDateTime;
use tracing::{debug, error, info, instrument};

/// Delimiter between the date fragment and the description in an excerpt.
pub const EXCERPT_DELIMITER: &str = "...";

/// Read access to the cards of a results page.
///
/// Positions are 1-based, matching the order the site renders them in.
pub trait CardSource {
    /// Excerpt text of the card at `index`, or `None` when there is no card.
    async fn excerpt(&self, index: usize) -> Result<Option<String>>;

    /// Headline of the card at `index`.
    async fn title(&self, index: usize) -> Result<String>;

    /// Absolute URL of the card's picture, `None` when the card has no picture
    /// element. A card without one fails with [`ScrapeError::MissingPicture`].
    async fn image_url(&self, index: usize) -> Result<Option<String>>;
}

/// Downloads a picture and reports the stored filename.
pub trait PictureFetcher {
    /// Returns the saved filename, or an empty string when the download failed.
    async fn fetch(&self, url: &str) -> String;
}

/// Result of processing one card position.
#[derive(Debug)]
pub enum CardOutcome {
    Accepted(Record),
    EndOfResults,
    BeforeCutoff,
    Failed(ScrapeError),
}

/// Split an excerpt into its date fragment and description.
///
/// The date fragment is trimmed. The description is the raw text between the
/// first and second delimiter, surrounding spaces included.
pub fn split_excerpt(excerpt: &str) -> Result<(&str, &str)> {
    let mut parts = excerpt.split(EXCERPT_DELIMITER);
    match (parts.next(), parts.next()) {
        (Some(date), Some(description)) => Ok((date.trim(), description)),
        _ => Err(ScrapeError::MalformedExcerpt(excerpt.to_string())),
    }
}

/// Turn an accepted card into a [`Record`].
pub fn build_record(
    card: ArticleCard,
    published_at: NaiveDateTime,
    search_phrase: &str,
    picture_filename: String,
) -> Record {
    let title_match_count = count_phrase(&card.title, search_phrase);
    let description_match_count = count_phrase(&card.description, search_phrase);
    let money_mentioned = mentions_money(&card.title) || mentions_money(&card.description);

    Record {
        title: card.title,
        published_at,
        description: card.description,
        title_match_count,
        description_match_count,
        money_mentioned,
        picture_filename,
    }
}

async fn read_card<S, P>(
    source: &S,
    pictures: &P,
    filter: &SearchFilter,
    index: usize,
    cutoff: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<CardOutcome>
where
    S: CardSource,
    P: PictureFetcher,
{
    let Some(excerpt) = source.excerpt(index).await? else {
        return Ok(CardOutcome::EndOfResults);
    };

    let (raw_date_text, description) = split_excerpt(&excerpt)?;
    let published_at = parse_card_date(raw_date_text, now)?;
    if published_at < cutoff {
        debug!(index, %published_at, %cutoff, "Card is older than cutoff");
        return Ok(CardOutcome::BeforeCutoff);
    }

    let card = ArticleCard {
        title: source.title(index).await?,
        raw_date_text: raw_date_text.to_string(),
        description: description.to_string(),
    };

    let picture_url = source
        .image_url(index)
        .await?
        .ok_or(ScrapeError::MissingPicture(index))?;
    let picture_filename = pictures.fetch(&picture_url).await;

    debug!(
        index,
        raw_date = %card.raw_date_text,
        %published_at,
        description = %truncate_for_log(&card.description, 120),
        "Accepted card"
    );
    Ok(CardOutcome::Accepted(build_record(
        card,
        published_at,
        &filter.search_phrase,
        picture_filename,
    )))
}

/// Process the card at `index`, folding any error into [`CardOutcome::Failed`].
pub async fn process_card<S, P>(
    source: &S,
    pictures: &P,
    filter: &SearchFilter,
    index: usize,
    cutoff: NaiveDateTime,
    now: NaiveDateTime,
) -> CardOutcome
where
    S: CardSource,
    P: PictureFetcher,
{
    match read_card(source, pictures, filter, index, cutoff, now).await {
        Ok(outcome) => outcome,
        Err(e) => CardOutcome::Failed(e),
    }
}

/// Walk the result cards until one of the stop conditions is hit.
///
/// # Arguments
///
/// * `source` - The results page, already searched and sorted newest first
/// * `pictures` - Where card pictures are downloaded to
/// * `filter` - Search phrase and how many months to keep
/// * `now` - Reference time for the cutoff and for relative card dates
#[instrument(level = "info", skip_all, fields(phrase = %filter.search_phrase, months = filter.months_back))]
pub async fn extract_records<S, P>(
    source: &S,
    pictures: &P,
    filter: &SearchFilter,
    now: NaiveDateTime,
) -> ExtractionReport
where
    S: CardSource,
    P: PictureFetcher,
{
    let cutoff = compute_cutoff(now, filter.months_back);
    info!(%cutoff, "Starting extraction");

    let mut records = Vec::new();
    let mut index = 1;
    let stop = loop {
        match process_card(source, pictures, filter, index, cutoff, now).await {
            CardOutcome::Accepted(record) => {
                info!(index, title = %record.title, "Extracted article");
                records.push(record);
                index += 1;
            }
            CardOutcome::EndOfResults => break StopReason::EndOfResults,
            CardOutcome::BeforeCutoff => break StopReason::BeforeCutoff { index },
            CardOutcome::Failed(e) => {
                let message = truncate_for_log(&e.to_string(), 300);
                error!(index, error = %message, "Card extraction failed; stopping");
                break StopReason::Failed { index, message };
            }
        }
    };

    info!(count = records.len(), stop = %stop, "Extraction finished");
    ExtractionReport {
        records,
        stop,
        cutoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    struct FakeCard {
        title: &'static str,
        excerpt: &'static str,
        image: Option<&'static str>,
    }

    struct FakePage {
        cards: Vec<FakeCard>,
        visited: RefCell<Vec<usize>>,
    }

    impl FakePage {
        fn new(cards: Vec<FakeCard>) -> Self {
            Self {
                cards,
                visited: RefCell::new(Vec::new()),
            }
        }

        fn card(&self, index: usize) -> Option<&FakeCard> {
            self.cards.get(index - 1)
        }
    }

    impl CardSource for FakePage {
        async fn excerpt(&self, index: usize) -> Result<Option<String>> {
            self.visited.borrow_mut().push(index);
            Ok(self.card(index).map(|c| c.excerpt.to_string()))
        }

        async fn title(&self, index: usize) -> Result<String> {
            Ok(self.card(index).map(|c| c.title.to_string()).unwrap_or_default())
        }

        async fn image_url(&self, index: usize) -> Result<Option<String>> {
            Ok(self.card(index).and_then(|c| c.image.map(str::to_string)))
        }
    }

    struct FakePictures;

    impl PictureFetcher for FakePictures {
        async fn fetch(&self, url: &str) -> String {
            if url.contains("broken") {
                String::new()
            } else {
                url.rsplit('/').next().unwrap_or_default().to_string()
            }
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn filter(months_back: u32) -> SearchFilter {
        SearchFilter {
            search_phrase: "election".to_string(),
            category: None,
            months_back,
        }
    }

    fn card(title: &'static str, excerpt: &'static str) -> FakeCard {
        FakeCard {
            title,
            excerpt,
            image: Some("https://img.example.com/a/photo.jpg"),
        }
    }

    #[test]
    fn test_split_excerpt() {
        let (date, description) = split_excerpt("5 hours ago ... Voters head out ... more").unwrap();
        assert_eq!(date, "5 hours ago");
        assert_eq!(description, " Voters head out ");
    }

    #[test]
    fn test_split_excerpt_without_delimiter() {
        assert!(matches!(
            split_excerpt("January 3, 2024 Voters head out"),
            Err(ScrapeError::MalformedExcerpt(_))
        ));
    }

    #[test]
    fn test_build_record_counts_and_money() {
        let record = build_record(
            ArticleCard {
                title: "Election costs $5 million".to_string(),
                raw_date_text: "2 days ago".to_string(),
                description: "The ELECTION board met".to_string(),
            },
            now(),
            "election",
            "photo.jpg".to_string(),
        );
        assert_eq!(record.title_match_count, 1);
        assert_eq!(record.description_match_count, 1);
        assert!(record.money_mentioned);
        assert_eq!(record.picture_filename, "photo.jpg");
    }

    #[tokio::test]
    async fn test_stops_at_first_card_before_cutoff() {
        let page = FakePage::new(vec![
            card("Election day", "5 hours ago ... Polls open"),
            card("Election recount", "January 3, 2024 ... Counting again"),
            card("Old election", "December 20, 2023 ... Before the cutoff"),
            card("Never read", "1 hour ago ... Out of order"),
        ]);

        let report = extract_records(&page, &FakePictures, &filter(1), now()).await;

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].title, "Election day");
        assert_eq!(report.records[1].title, "Election recount");
        assert_eq!(report.stop, StopReason::BeforeCutoff { index: 3 });
        assert_eq!(*page.visited.borrow(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_end_of_results() {
        let page = FakePage::new(vec![card("Election day", "2 days ago ... Polls open")]);

        let report = extract_records(&page, &FakePictures, &filter(0), now()).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.stop, StopReason::EndOfResults);
        assert_eq!(
            report.records[0].published_at,
            NaiveDate::from_ymd_opt(2024, 1, 8)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_malformed_excerpt_stops_and_keeps_records() {
        let page = FakePage::new(vec![
            card("Election day", "5 hours ago ... Polls open"),
            card("Broken", "6 hours ago with no delimiter"),
            card("After broken", "7 hours ago ... Never reached"),
        ]);

        let report = extract_records(&page, &FakePictures, &filter(1), now()).await;

        assert_eq!(report.records.len(), 1);
        assert!(matches!(report.stop, StopReason::Failed { index: 2, .. }));
        assert_eq!(*page.visited.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unparseable_date_stops_loop() {
        let page = FakePage::new(vec![card("Election", "sometime soon ... text")]);

        let report = extract_records(&page, &FakePictures, &filter(1), now()).await;

        assert!(report.records.is_empty());
        assert!(matches!(report.stop, StopReason::Failed { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_broken_download_does_not_stop_loop() {
        let page = FakePage::new(vec![
            FakeCard {
                title: "Broken picture",
                excerpt: "2 hours ago ... text",
                image: Some("https://img.example.com/broken.jpg"),
            },
            card("Fine", "3 hours ago ... text"),
        ]);

        let report = extract_records(&page, &FakePictures, &filter(1), now()).await;

        let filenames: Vec<&str> = report
            .records
            .iter()
            .map(|r| r.picture_filename.as_str())
            .collect();
        assert_eq!(filenames, vec!["", "photo.jpg"]);
        assert_eq!(report.stop, StopReason::EndOfResults);
    }

    #[tokio::test]
    async fn test_missing_picture_element_stops_loop() {
        let page = FakePage::new(vec![
            card("Fine", "1 hour ago ... text"),
            FakeCard {
                title: "No picture",
                excerpt: "2 hours ago ... text",
                image: None,
            },
            card("Never reached", "3 hours ago ... text"),
        ]);

        let report = extract_records(&page, &FakePictures, &filter(1), now()).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].title, "Fine");
        assert!(matches!(report.stop, StopReason::Failed { index: 2, .. }));
        assert_eq!(*page.visited.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_missing_picture_on_first_card_yields_nothing() {
        let page = FakePage::new(vec![
            FakeCard {
                title: "No picture",
                excerpt: "1 hour ago ... text",
                image: None,
            },
            card("Valid", "2 hours ago ... text"),
        ]);

        let report = extract_records(&page, &FakePictures, &filter(1), now()).await;

        assert!(report.records.is_empty());
        assert!(matches!(report.stop, StopReason::Failed { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_older_months_window() {
        // 2024-01-15 minus 60 days is 2023-11-16, so the cutoff is 2023-11-01
        let page = FakePage::new(vec![
            card("Election", "December 20, 2023 ... Still inside"),
            card("Election", "November 2, 2023 ... Still inside"),
            card("Election", "October 31, 2023 ... Too old"),
        ]);

        let report = extract_records(&page, &FakePictures, &filter(3), now()).await;

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.stop, StopReason::BeforeCutoff { index: 3 });
    }
}
