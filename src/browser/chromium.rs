//! Chromium driver over the DevTools protocol.
//!
//! Every wait polls the DOM every [`POLL_INTERVAL`] until its deadline passes.
//! Interactions (`click`, `input_text`, `select_option`) first wait for their
//! target to become visible, using the session's default timeout.

use super::{Browser, PageElement};
use crate::error::{Result, ScrapeError};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const IS_VISIBLE_JS: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const style = window.getComputedStyle(this); \
    return rect.width > 0 && rect.height > 0 \
        && style.visibility !== 'hidden' && style.display !== 'none'; \
}";

const IS_CHECKED_JS: &str = "function() { return this.checked === true; }";

/// A launched Chromium process with a single tab.
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    page: Page,
    handler: JoinHandle<()>,
    timeout: Duration,
}

impl ChromiumBrowser {
    /// Launch Chromium and open a blank tab.
    ///
    /// `timeout` bounds the implicit visibility wait before each interaction.
    #[instrument(level = "info")]
    pub async fn launch(headless: bool, timeout: Duration) -> Result<Self> {
        let mut builder = BrowserConfig::builder().window_size(1920, 1080);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = CdpBrowser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        info!(headless, ?timeout, "Chromium launched");
        Ok(Self {
            browser,
            page,
            handler,
            timeout,
        })
    }

    async fn first_match(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.page.find_xpaths(selector).await?.into_iter().next())
    }

    async fn required(&self, selector: &str) -> Result<Element> {
        self.first_match(selector)
            .await?
            .ok_or_else(|| ScrapeError::ElementNotFound(selector.to_string()))
    }

    /// Wait for visibility with the default timeout, then return the element.
    async fn visible(&self, selector: &str) -> Result<Element> {
        self.wait_visible(selector, self.timeout).await?;
        self.required(selector).await
    }
}

async fn element_is_visible(element: &Element) -> Result<bool> {
    js_bool(element, IS_VISIBLE_JS).await
}

async fn js_bool(element: &Element, function: &str) -> Result<bool> {
    let returns = element.call_js_fn(function, false).await?;
    Ok(returns
        .result
        .value
        .and_then(|v| v.as_bool())
        .unwrap_or(false))
}

/// Re-run `check` until it yields `true` or `timeout` elapses.
async fn poll_until<F, Fut>(condition: &str, timeout: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check().await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ScrapeError::Timeout {
                condition: condition.to_string(),
                timeout,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

impl Browser for ChromiumBrowser {
    type Element = ChromiumElement;

    #[instrument(level = "info", skip(self))]
    async fn open(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn click(&self, selector: &str) -> Result<()> {
        self.visible(selector).await?.click().await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, text))]
    async fn input_text(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.visible(selector).await?;
        element.focus().await?;
        element.type_str(text).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_checkbox(&self, selector: &str) -> Result<()> {
        let checkbox = self.required(selector).await?;
        if !js_bool(&checkbox, IS_CHECKED_JS).await? {
            checkbox.click().await?;
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let select = self.visible(selector).await?;
        let quoted = serde_json::to_string(value).map_err(|e| ScrapeError::Browser(e.to_string()))?;
        let function = format!(
            "function() {{ this.value = {quoted}; \
             this.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             this.dispatchEvent(new Event('change', {{ bubbles: true }})); }}"
        );
        select.call_js_fn(function, false).await?;
        Ok(())
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        poll_until(selector, timeout, move || self.is_visible(selector)).await
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        match self.first_match(selector).await? {
            Some(element) => element_is_visible(&element).await,
            None => Ok(false),
        }
    }

    async fn find_element(&self, selector: &str) -> Result<ChromiumElement> {
        self.required(selector).await.map(ChromiumElement)
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await?
            .ok_or_else(|| ScrapeError::Browser("page has no URL".to_string()))
    }

    async fn wait_url(&self, url: &str, timeout: Duration) -> Result<()> {
        let condition = format!("location {url}");
        poll_until(&condition, timeout, move || async move {
            let current = self.current_url().await?;
            Ok::<_, ScrapeError>(current == url)
        })
        .await
    }

    #[instrument(level = "info", skip(self))]
    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Chromium process did not exit cleanly");
        }
        self.handler.abort();
        closed?;
        info!("Chromium closed");
        Ok(())
    }
}

/// Handle to a DOM node on the current Chromium page.
pub struct ChromiumElement(Element);

impl PageElement for ChromiumElement {
    async fn children(&self, tag: &str) -> Result<Vec<Self>> {
        let found = self.0.find_elements(format!(":scope > {tag}")).await?;
        Ok(found.into_iter().map(ChromiumElement).collect())
    }

    async fn find_by_class(&self, class_name: &str) -> Result<Option<Self>> {
        let found = self.0.find_elements(format!(".{class_name}")).await?;
        Ok(found.into_iter().next().map(ChromiumElement))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.0.attribute(name).await?)
    }

    async fn text(&self) -> Result<String> {
        Ok(self
            .0
            .inner_text()
            .await?
            .map(|t| t.trim().to_string())
            .unwrap_or_default())
    }
}
