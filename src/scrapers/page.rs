//! Extraction of one results page into [`ArticleRecord`]s.
//!
//! Every `<li>` of the results list is processed concurrently, up to
//! [`EXTRACTION_WORKERS`] at a time. Items published outside the date window
//! produce nothing. The order of the returned records is unspecified.

use crate::browser::PageElement;
use crate::dates::DateRange;
use crate::error::{Result, ScrapeError};
use crate::images::{FetchBytes, fetch_and_store, filename_with_extension, resolve_image_url};
use crate::models::ArticleRecord;
use crate::portal;
use crate::utils::truncate_for_log;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::PathBuf;
use tracing::{debug, error, info, instrument};

/// Items read in parallel on a single page.
pub const EXTRACTION_WORKERS: usize = 10;

/// Turns the items of a loaded results list into records.
pub struct PageExtractor<F> {
    fetcher: F,
    search_phrase: String,
    image_dir: PathBuf,
    timezone: Tz,
}

impl<F: FetchBytes> PageExtractor<F> {
    pub fn new(fetcher: F, search_phrase: impl Into<String>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            search_phrase: search_phrase.into(),
            image_dir: image_dir.into(),
            timezone: portal::TIMEZONE,
        }
    }

    /// Records for the in-window items of `results_list`.
    ///
    /// Fails on the first item with a fatal problem (missing or malformed
    /// timestamp, missing title); image and description problems never fail.
    #[instrument(level = "info", skip_all)]
    pub async fn extract<E: PageElement>(
        &self,
        results_list: &E,
        window: &DateRange<Tz>,
    ) -> Result<Vec<ArticleRecord>> {
        let items = results_list.children("li").await?;
        let total = items.len();

        let records: Vec<ArticleRecord> = stream::iter(items.iter())
            .map(|item| self.extract_item(item, window))
            .buffer_unordered(EXTRACTION_WORKERS)
            .try_filter_map(|record| future::ready(Ok(record)))
            .try_collect()
            .await?;

        info!(total, in_window = records.len(), "Extracted page news");
        Ok(records)
    }

    async fn extract_item<E: PageElement>(
        &self,
        item: &E,
        window: &DateRange<Tz>,
    ) -> Result<Option<ArticleRecord>> {
        let published_at = self.published_at(item).await?;
        if !window.contains(&published_at) {
            debug!(%published_at, "News outside date window; skipping");
            return Ok(None);
        }

        let title = item
            .find_by_class(portal::NEWS_TITLE)
            .await?
            .ok_or_else(|| ScrapeError::ElementNotFound(format!(".{}", portal::NEWS_TITLE)))?
            .text()
            .await?;
        let short_title = truncate_for_log(&title, 80);
        debug!(title = %short_title, %published_at, "Collecting news data");

        let description = match item.find_by_class(portal::NEWS_DESCRIPTION).await? {
            Some(element) => Some(element.text().await?),
            None => {
                info!(title = %short_title, "Description not found for news");
                None
            }
        };

        let image_file_name = match self.download_image(item).await {
            Ok(Some(name)) => Some(name),
            Ok(None) => {
                info!(title = %short_title, "Image not found for news");
                None
            }
            Err(e) => {
                error!(title = %short_title, error = %e, "Failed to download news image");
                None
            }
        };

        Ok(Some(ArticleRecord::new(
            title,
            description,
            published_at,
            image_file_name,
            &self.search_phrase,
        )))
    }

    async fn published_at<E: PageElement>(&self, item: &E) -> Result<DateTime<Tz>> {
        let timestamp = item
            .find_by_class(portal::NEWS_TIMESTAMP)
            .await?
            .ok_or_else(|| ScrapeError::ElementNotFound(format!(".{}", portal::NEWS_TIMESTAMP)))?;
        let raw = timestamp
            .attribute(portal::NEWS_TIMESTAMP_ATTRIBUTE)
            .await?
            .unwrap_or_default();
        parse_timestamp(&raw, &self.timezone)
    }

    /// Resolve, download and store the item's image.
    ///
    /// `Ok(None)` means the item has no usable image.
    async fn download_image<E: PageElement>(&self, item: &E) -> Result<Option<String>> {
        let Some(image) = item.find_by_class(portal::NEWS_IMAGE).await? else {
            return Ok(None);
        };
        let Some(src) = image.attribute(portal::NEWS_IMAGE_ATTRIBUTE).await? else {
            return Ok(None);
        };
        let Some(url) = resolve_image_url(&src, portal::URL) else {
            return Ok(None);
        };

        let file_name = filename_with_extension(&url, portal::DEFAULT_IMAGE_EXTENSION);
        fetch_and_store(&self.fetcher, &url, &self.image_dir, &file_name).await?;
        Ok(Some(file_name))
    }
}

/// Epoch milliseconds rendered in `tz`.
pub fn parse_timestamp<Z: TimeZone>(raw: &str, tz: &Z) -> Result<DateTime<Z>> {
    let malformed = || ScrapeError::MalformedTimestamp {
        value: raw.to_string(),
    };
    let millis: i64 = raw.trim().parse().map_err(|_| malformed())?;
    let utc = Utc.timestamp_millis_opt(millis).single().ok_or_else(malformed)?;
    Ok(utc.with_timezone(tz))
}
