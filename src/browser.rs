//! Browser session driving the AP News search page over WebDriver.
//!
//! The session is an explicit object: opened once with [`BrowserSession::open`],
//! borrowed by the extraction loop through [`CardSource`], and released with
//! [`BrowserSession::close`].
//!
//! # Waits
//!
//! | Element | Condition | Timeout |
//! |---------|-----------|---------|
//! | Search input | clickable | 10 s |
//! | Category label | visible | 30 s |
//! | Sort select / option | enabled | 120 s |
//! | Result card link | enabled | 10 s |

use crate::config::Config;
use crate::error::Result;
use crate::extraction::CardSource;
use std::time::Duration;
use thirtyfour::ChromiumLikeCapabilities;
use thirtyfour::prelude::*;
use tracing::{debug, info, instrument, warn};

const SEARCH_INPUT_XPATH: &str =
    "//*[@id=\"Page-header-trending-zephr\"]/div[1]/div[3]/bsp-search-overlay/div/form/label/input";
const SORT_SELECT_XPATH: &str = "//select[@id='search-sort-option']";
const SORT_BY_DATE_XPATH: &str = "//option[@value='date']";

const SEARCH_INPUT_TIMEOUT: Duration = Duration::from_secs(10);
const CATEGORY_TIMEOUT: Duration = Duration::from_secs(30);
const SORT_TIMEOUT: Duration = Duration::from_secs(120);
const CARD_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// WebDriver code point for the Enter key.
const ENTER_KEY: char = '\u{e007}';

/// Quote `value` as an XPath string literal, even when it contains quotes.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// XPath of the `index`-th (1-based) result card link.
pub fn card_link_xpath(index: usize) -> String {
    format!("(//a[@class='u-clickable-card__link'])[{index}]")
}

/// XPath of the excerpt paragraph of the `index`-th result card.
pub fn card_excerpt_xpath(index: usize) -> String {
    format!("(//div[@class=\"gc__excerpt\"]//p)[{index}]")
}

/// XPath of the picture belonging to the `index`-th result card.
pub fn card_picture_xpath(index: usize) -> String {
    format!(
        "{}/ancestor::div[@class='gc__card__media']//img",
        card_link_xpath(index)
    )
}

/// XPath of the category label named `topic`.
pub fn category_xpath(topic: &str) -> String {
    format!("//span[text()={}]", xpath_literal(topic))
}

/// A live WebDriver session positioned on the news site.
pub struct BrowserSession {
    driver: WebDriver,
}

impl BrowserSession {
    /// Start a Chrome session through the configured WebDriver server and
    /// load the site's home page.
    ///
    /// If the page fails to load the session is quit before returning.
    #[instrument(level = "info", skip_all, fields(webdriver = %config.webdriver_url, url = %config.url))]
    pub async fn open(config: &Config) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless()?;
        }
        caps.add_arg("--window-size=1920,1080")?;

        let driver = WebDriver::new(config.webdriver_url.as_str(), caps).await?;
        let session = Self { driver };

        let loaded = async {
            session.driver.maximize_window().await?;
            session.driver.goto(config.url.as_str()).await
        }
        .await;
        if let Err(e) = loaded {
            session.close().await;
            return Err(e.into());
        }

        info!("Opened the AP News website");
        Ok(session)
    }

    /// Click the search input in the page header.
    #[instrument(level = "info", skip_all)]
    pub async fn open_search(&self) -> Result<()> {
        let input = self
            .driver
            .query(By::XPath(SEARCH_INPUT_XPATH))
            .wait(SEARCH_INPUT_TIMEOUT, POLL_INTERVAL)
            .and_clickable()
            .first()
            .await?;
        input.click().await?;
        info!("Opened the search option");
        Ok(())
    }

    /// Type `phrase` into the search input and submit it.
    #[instrument(level = "info", skip_all, fields(%phrase))]
    pub async fn enter_search_phrase(&self, phrase: &str) -> Result<()> {
        let input = self
            .driver
            .query(By::XPath(SEARCH_INPUT_XPATH))
            .wait(SEARCH_INPUT_TIMEOUT, POLL_INTERVAL)
            .and_enabled()
            .first()
            .await?;
        input.send_keys(format!("{phrase}{ENTER_KEY}")).await?;
        info!("Submitted the search phrase");
        Ok(())
    }

    /// Narrow the results to the category labelled `topic`.
    #[instrument(level = "info", skip_all, fields(%topic))]
    pub async fn select_category(&self, topic: &str) -> Result<()> {
        let label = self
            .driver
            .query(By::XPath(category_xpath(topic)))
            .wait(CATEGORY_TIMEOUT, POLL_INTERVAL)
            .and_displayed()
            .first()
            .await?;
        label.click().await?;
        info!("Selected news category");
        Ok(())
    }

    /// Sort the search results newest first.
    #[instrument(level = "info", skip_all)]
    pub async fn sort_by_newest(&self) -> Result<()> {
        for xpath in [SORT_SELECT_XPATH, SORT_BY_DATE_XPATH] {
            let element = self
                .driver
                .query(By::XPath(xpath))
                .wait(SORT_TIMEOUT, POLL_INTERVAL)
                .and_enabled()
                .first()
                .await?;
            element.click().await?;
        }
        info!("Chose the latest news");
        Ok(())
    }

    /// Quit the WebDriver session. Errors are logged, not returned.
    #[instrument(level = "info", skip_all)]
    pub async fn close(self) {
        match self.driver.quit().await {
            Ok(()) => info!("Closed browser session"),
            Err(e) => warn!(error = %e, "Failed to close browser session"),
        }
    }

    async fn find(&self, xpath: &str) -> Result<WebElement> {
        Ok(self.driver.find(By::XPath(xpath)).await?)
    }
}

impl CardSource for BrowserSession {
    async fn excerpt(&self, index: usize) -> Result<Option<String>> {
        let link = self
            .driver
            .query(By::XPath(card_link_xpath(index)))
            .wait(CARD_TIMEOUT, POLL_INTERVAL)
            .and_enabled()
            .first_opt()
            .await?;
        let Some(link) = link else {
            debug!(index, "No result card at position");
            return Ok(None);
        };
        link.scroll_into_view().await?;

        let paragraph = self.find(&card_excerpt_xpath(index)).await?;
        Ok(Some(paragraph.text().await?))
    }

    async fn title(&self, index: usize) -> Result<String> {
        let link = self.find(&card_link_xpath(index)).await?;
        Ok(link.text().await?)
    }

    async fn image_url(&self, index: usize) -> Result<Option<String>> {
        let picture = self
            .driver
            .query(By::XPath(card_picture_xpath(index)))
            .nowait()
            .first_opt()
            .await?;
        match picture {
            Some(img) => Ok(img.prop("src").await?),
            None => Ok(None),
        }
    }
}
