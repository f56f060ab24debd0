//! Los Angeles Times search driver.
//!
//! Walks the search UI as a small state machine:
//!
//! ```text
//! Init -> SearchSubmitted -> TopicsSelected -> Sorted -> Paginating -> Done
//! ```
//!
//! Only this module navigates. Each results page is fully extracted before
//! the next one is requested.
//!
//! # Stopping
//!
//! Pagination ends after a page that produced fewer than
//! [`portal::RESULTS_PER_PAGE`] in-window records, or that has no next-page
//! control. The first rule relies on results being sorted newest first, so
//! every item on later pages is older than anything already seen. The
//! scraper selects that ordering itself before paginating.

use super::page::PageExtractor;
use crate::browser::{Browser, PageElement};
use crate::config::SearchConfig;
use crate::dates::DateRange;
use crate::error::{Result, ScrapeError};
use crate::images::FetchBytes;
use crate::models::ArticleRecord;
use crate::portal;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Where the controller currently is in the search flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeState {
    Init,
    SearchSubmitted,
    TopicsSelected,
    Sorted,
    Paginating,
    Done,
}

/// Why pagination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page had fewer in-window records than a full page.
    ReachedWindowStart,
    /// There is no next-page control.
    LastPage,
}

/// Decision taken after a page has been extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Continue,
    Stop(StopReason),
}

/// Decide whether to request another page.
pub fn next_page_outcome(in_window: usize, has_next: bool) -> PageOutcome {
    if in_window < portal::RESULTS_PER_PAGE {
        PageOutcome::Stop(StopReason::ReachedWindowStart)
    } else if !has_next {
        PageOutcome::Stop(StopReason::LastPage)
    } else {
        PageOutcome::Continue
    }
}

/// Runtime knobs that are not part of the search itself.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Directory downloaded images are written to.
    pub image_dir: PathBuf,
    /// Upper bound for every navigation wait.
    pub timeout: Duration,
}

pub struct LaTimesScraper<'a, B, F> {
    browser: &'a mut B,
    config: &'a SearchConfig,
    extractor: PageExtractor<F>,
    timeout: Duration,
    state: ScrapeState,
}

impl<'a, B: Browser, F: FetchBytes> LaTimesScraper<'a, B, F> {
    pub fn new(browser: &'a mut B, config: &'a SearchConfig, fetcher: F, options: ScrapeOptions) -> Self {
        Self {
            browser,
            config,
            extractor: PageExtractor::new(fetcher, config.search_phrase.clone(), options.image_dir),
            timeout: options.timeout,
            state: ScrapeState::Init,
        }
    }

    pub fn state(&self) -> ScrapeState {
        self.state
    }

    /// Run the whole flow, keeping results published between the start of
    /// the configured window and `now`.
    #[instrument(level = "info", skip_all, fields(search_phrase = %self.config.search_phrase))]
    pub async fn scrape(&mut self, now: DateTime<Tz>) -> Result<Vec<ArticleRecord>> {
        info!("Starting to scrape news");
        info!(url = portal::URL, "Opening browser");
        self.browser.open(portal::URL).await?;

        self.search_for_phrase().await?;
        self.select_topics().await?;
        self.sort_by_newest().await?;

        let window = DateRange::months_back(now, self.config.number_of_months);
        info!(start = %window.start, end = %window.end, "Using date range");
        let news = self.collect_pages(&window).await?;
        info!(count = news.len(), "Finished scraping news");
        Ok(news)
    }

    fn advance(&mut self, next: ScrapeState) {
        info!(from = ?self.state, to = ?next, "Scraper state change");
        self.state = next;
    }

    async fn search_for_phrase(&mut self) -> Result<()> {
        info!(search_phrase = %self.config.search_phrase, "Searching for search phrase");
        self.browser.click(portal::SEARCH_BUTTON).await?;
        self.browser
            .input_text(portal::SEARCH_INPUT, &self.config.search_phrase)
            .await?;
        self.browser.click(portal::SEARCH_SUBMIT_BUTTON).await?;
        self.browser
            .wait_visible(portal::RESULT_SEARCH_INPUT, self.timeout)
            .await?;
        self.advance(ScrapeState::SearchSubmitted);
        Ok(())
    }

    async fn select_topics(&mut self) -> Result<()> {
        info!(topics = ?self.config.topics, "Selecting topics");
        for topic in &self.config.topics {
            match self.browser.select_checkbox(&portal::topic_checkbox(topic)).await {
                Ok(()) => {
                    self.browser
                        .wait_visible(&portal::topic_checked_checkbox(topic), self.timeout)
                        .await?;
                    info!(%topic, "Topic selected");
                }
                Err(ScrapeError::ElementNotFound(_)) => {
                    warn!(%topic, "Topic not found");
                }
                Err(e) => return Err(e),
            }
        }
        self.advance(ScrapeState::TopicsSelected);
        Ok(())
    }

    async fn sort_by_newest(&mut self) -> Result<()> {
        info!("Sorting by newest");
        self.wait_for_results_load().await?;
        self.browser
            .select_option(portal::RESULT_SORTING_SELECT, portal::RESULT_SORTING_NEWEST_VALUE)
            .await?;
        self.advance(ScrapeState::Sorted);
        Ok(())
    }

    /// Wait until the next-page anchor pointing past the current URL renders.
    async fn wait_for_results_load(&self) -> Result<()> {
        let current_url = self.browser.current_url().await?;
        info!(%current_url, "Waiting for results to load");
        self.browser
            .wait_visible(&portal::next_page_anchor_with_url(&current_url), self.timeout)
            .await
    }

    async fn collect_pages(&mut self, window: &DateRange<Tz>) -> Result<Vec<ArticleRecord>> {
        self.advance(ScrapeState::Paginating);
        info!("Iterating through pages to get news");
        self.wait_for_results_load().await?;

        let mut news = Vec::new();
        let mut page = 1usize;
        loop {
            let results_list = self.browser.find_element(portal::RESULTS_LIST).await?;
            let page_news = self.extractor.extract(&results_list, window).await?;
            let in_window = page_news.len();
            news.extend(page_news);

            let has_next = self.browser.is_visible(portal::RESULT_NEXT_PAGE_ANCHOR).await?;
            match next_page_outcome(in_window, has_next) {
                PageOutcome::Continue => {
                    info!(page, in_window, "Page full; continuing");
                    self.go_to_next_page().await?;
                    page += 1;
                }
                PageOutcome::Stop(reason) => {
                    info!(page, in_window, ?reason, total = news.len(), "Stopping pagination");
                    break;
                }
            }
        }

        self.advance(ScrapeState::Done);
        Ok(news)
    }

    async fn go_to_next_page(&self) -> Result<()> {
        info!("Going to next page");
        let anchor = self.browser.find_element(portal::RESULT_NEXT_PAGE_ANCHOR).await?;
        let href = anchor.attribute("href").await?.ok_or_else(|| {
            ScrapeError::ElementNotFound(format!("{}/@href", portal::RESULT_NEXT_PAGE_ANCHOR))
        })?;
        let current_url = self.browser.current_url().await?;
        let next_url = Url::parse(&current_url)
            .and_then(|base| base.join(&href))
            .map(String::from)
            .unwrap_or(href);

        self.browser.click(portal::RESULT_NEXT_PAGE_ANCHOR).await?;
        self.browser.wait_url(&next_url, self.timeout).await?;
        self.browser
            .wait_visible(portal::RESULTS_LIST, self.timeout)
            .await
    }
}

/// Scrape with `browser`, closing it whether or not the scrape succeeds.
pub async fn scrape_news<B: Browser, F: FetchBytes>(
    mut browser: B,
    config: &SearchConfig,
    fetcher: F,
    options: ScrapeOptions,
) -> Result<Vec<ArticleRecord>> {
    let now = Utc::now().with_timezone(&portal::TIMEZONE);
    let mut scraper = LaTimesScraper::new(&mut browser, config, fetcher, options);
    let result = scraper.scrape(now).await;
    if let Err(e) = &result {
        error!(state = ?scraper.state(), error = %e, "Scrape stopped early");
    }

    info!("Closing browser");
    if let Err(e) = browser.close().await {
        warn!(error = %e, "Failed to close browser");
    }
    result
}
