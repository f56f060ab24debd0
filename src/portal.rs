//! Site profile for the Los Angeles Times search pages.
//!
//! Page-level selectors are XPath. Item-level lookups happen relative to a
//! result `<li>` and use class names.

use chrono_tz::Tz;

pub const URL: &str = "https://www.latimes.com/";
pub const TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

pub const SEARCH_BUTTON: &str = r#"//button[@data-element="search-button"]"#;
pub const SEARCH_INPUT: &str = r#"//input[@data-element="search-form-input"]"#;
pub const SEARCH_SUBMIT_BUTTON: &str = r#"//button[@data-element="search-submit-button"]"#;

pub const RESULT_SEARCH_INPUT: &str = r#"//input[@class="search-results-module-input"]"#;
pub const RESULT_NEXT_PAGE_ANCHOR: &str = r#"//div[@class="search-results-module-next-page"]//a"#;
pub const RESULTS_LIST: &str = r#"//ul[@class="search-results-module-results-menu"]"#;

pub const RESULT_SORTING_SELECT: &str = r#"//select[@class="select-input"]"#;
pub const RESULT_SORTING_NEWEST_VALUE: &str = "1";

pub const NEWS_TITLE: &str = "promo-title";
pub const NEWS_DESCRIPTION: &str = "promo-description";
pub const NEWS_TIMESTAMP: &str = "promo-timestamp";
pub const NEWS_TIMESTAMP_ATTRIBUTE: &str = "data-timestamp";
pub const NEWS_IMAGE: &str = "image";
pub const NEWS_IMAGE_ATTRIBUTE: &str = "src";

/// Results per page. Also the threshold below which pagination stops.
pub const RESULTS_PER_PAGE: usize = 10;

pub const DEFAULT_IMAGE_EXTENSION: &str = "jpeg";

/// Checkbox input belonging to a topic filter label.
pub fn topic_checkbox(topic: &str) -> String {
    format!(r#"//ul[@data-name="Topics"]//span[text()="{topic}"]/preceding::input[1]"#)
}

/// The same checkbox once it reports itself as checked.
pub fn topic_checked_checkbox(topic: &str) -> String {
    format!(
        r#"//ul[@data-name="Topics"]//span[text()="{topic}"]/preceding::input[@type="checkbox" and @checked][1]"#
    )
}

/// Next-page anchor whose target references `url`.
///
/// It only renders once the result list for `url` has finished loading.
pub fn next_page_anchor_with_url(url: &str) -> String {
    format!(r#"{RESULT_NEXT_PAGE_ANCHOR}[contains(@href, "{url}")]"#)
}
