//! Data models for scraped articles and their spreadsheet rows.
//!
//! - [`ArticleRecord`]: one in-window search result, with its derived attributes
//! - [`SpreadsheetRow`]: the flat representation handed to the output sink

use crate::analysis::{article_mentions_money, count_phrase_in_article};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// A search result that fell inside the requested date window.
///
/// Built once during page extraction and never mutated afterwards. The
/// derived fields are computed from the title, the description and the
/// search phrase at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    /// The headline as scraped.
    pub title: String,
    /// The teaser text, when the result has one.
    pub description: Option<String>,
    /// Publication time in the portal's timezone.
    pub published_at: DateTime<Tz>,
    /// Name of the downloaded image inside the output directory.
    pub image_file_name: Option<String>,
    /// Case-insensitive occurrences of the search phrase in title and description.
    pub search_phrase_count: usize,
    /// Whether the title or description mentions an amount of money.
    pub contains_money: bool,
}

impl ArticleRecord {
    pub fn new(
        title: String,
        description: Option<String>,
        published_at: DateTime<Tz>,
        image_file_name: Option<String>,
        search_phrase: &str,
    ) -> Self {
        let search_phrase_count =
            count_phrase_in_article(&title, description.as_deref(), search_phrase);
        let contains_money = article_mentions_money(&title, description.as_deref());
        Self {
            title,
            description,
            published_at,
            image_file_name,
            search_phrase_count,
            contains_money,
        }
    }

    /// Flatten into a spreadsheet row, with the date as `YYYY-MM-DD`.
    pub fn to_row(&self) -> SpreadsheetRow {
        SpreadsheetRow {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.published_at.format("%Y-%m-%d").to_string(),
            image_file_name: self.image_file_name.clone(),
            search_phrase_count: self.search_phrase_count,
            contains_money: self.contains_money,
        }
    }
}

/// One line of the exported spreadsheet.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SpreadsheetRow {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub image_file_name: Option<String>,
    pub search_phrase_count: usize,
    pub contains_money: bool,
}
