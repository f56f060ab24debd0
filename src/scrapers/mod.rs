//! Search-result scraping.
//!
//! Scraping happens in two layers:
//!
//! 1. **Navigation** ([`latimes`]): submit the search, apply topic filters,
//!    sort newest first and walk the result pages one at a time
//! 2. **Extraction** ([`page`]): turn the items of one loaded page into
//!    [`ArticleRecord`](crate::models::ArticleRecord)s, concurrently
//!
//! Item-level problems with descriptions and images are logged and leave the
//! field empty. Malformed timestamps, missing titles and navigation timeouts
//! abort the scrape.

pub mod latimes;
pub mod page;
