//! Derived article attributes: search phrase occurrences and money mentions.
//!
//! Both functions are pure, so an [`ArticleRecord`](crate::models::ArticleRecord)
//! computes them exactly once when it is built.

use once_cell::sync::Lazy;
use regex::Regex;

/// A `$`-prefixed amount, or a bare amount followed by `dollar(s)`/`USD`.
///
/// Thousands separators and two-digit cents are optional in both forms.
static MONEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\$\d{1,3}(?:,\d{3})*(?:\.\d{2})?|\b\d+(?:,\d{3})*(?:\.\d{2})?\s?(?:dollars?|usd)\b",
    )
    .expect("money pattern is a valid regex")
});

/// Count case-insensitive, non-overlapping occurrences of `phrase` in `text`.
///
/// An empty phrase never matches.
pub fn count_phrase(text: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&phrase.to_lowercase()).count()
}

/// Occurrences of `phrase` across a title and an optional description.
pub fn count_phrase_in_article(title: &str, description: Option<&str>, phrase: &str) -> usize {
    count_phrase(title, phrase) + description.map_or(0, |d| count_phrase(d, phrase))
}

/// Whether `text` mentions an amount of money.
pub fn detects_money(text: &str) -> bool {
    MONEY_PATTERN.is_match(text)
}

/// Whether a title or an optional description mentions an amount of money.
pub fn article_mentions_money(title: &str, description: Option<&str>) -> bool {
    detects_money(title) || description.is_some_and(detects_money)
}
