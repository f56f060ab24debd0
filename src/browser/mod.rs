//! Browser automation seam.
//!
//! The scraper only talks to the page through these two traits, so it can
//! run against a real Chromium session ([`chromium::ChromiumBrowser`]) or an
//! in-memory page in tests.
//!
//! Navigation methods live on [`Browser`] and are called from the controller
//! only. [`PageElement`] reads take `&self`, which lets one page's result items
//! be read concurrently once their handles have been collected.

pub mod chromium;

use crate::error::Result;
use std::time::Duration;

/// Read-only access to an element that has already been located.
pub trait PageElement: Sized {
    /// Direct children with the given tag name.
    async fn children(&self, tag: &str) -> Result<Vec<Self>>;

    /// First descendant carrying `class_name`, if any.
    async fn find_by_class(&self, class_name: &str) -> Result<Option<Self>>;

    /// Value of attribute `name`, if present.
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Rendered text content.
    async fn text(&self) -> Result<String>;
}

/// A single browser session with one current page.
///
/// Page-level selectors are XPath expressions.
pub trait Browser {
    type Element: PageElement;

    async fn open(&mut self, url: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    async fn input_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Tick a checkbox; fails with `ElementNotFound` when it does not exist.
    async fn select_checkbox(&self, selector: &str) -> Result<()>;

    /// Pick the `<option>` with `value` in a `<select>`.
    async fn select_option(&self, selector: &str, value: &str) -> Result<()>;

    /// Block until `selector` is visible, or fail with `Timeout`.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<()>;

    async fn is_visible(&self, selector: &str) -> Result<bool>;

    async fn find_element(&self, selector: &str) -> Result<Self::Element>;

    async fn current_url(&self) -> Result<String>;

    /// Block until the current URL equals `url`, or fail with `Timeout`.
    async fn wait_url(&self, url: &str, timeout: Duration) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}
