//! In-memory browser and HTTP fakes for the scraper tests.

use crate::browser::{Browser, PageElement};
use crate::error::{Result, ScrapeError};
use crate::images::FetchBytes;
use crate::portal;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<FakeElement>,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.classes.push(class_name.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_child(mut self, child: FakeElement) -> Self {
        self.children.push(child);
        self
    }

    fn descendant_with_class(&self, class_name: &str) -> Option<&FakeElement> {
        self.children.iter().find_map(|child| {
            if child.classes.iter().any(|c| c == class_name) {
                Some(child)
            } else {
                child.descendant_with_class(class_name)
            }
        })
    }
}

impl PageElement for FakeElement {
    async fn children(&self, tag: &str) -> Result<Vec<Self>> {
        Ok(self
            .children
            .iter()
            .filter(|c| c.tag == tag)
            .cloned()
            .collect())
    }

    async fn find_by_class(&self, class_name: &str) -> Result<Option<Self>> {
        Ok(self.descendant_with_class(class_name).cloned())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attributes.get(name).cloned())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// A search result `<li>` laid out the way the portal renders it.
pub fn result_item(
    timestamp: &str,
    title: Option<&str>,
    description: Option<&str>,
    image_src: Option<&str>,
) -> FakeElement {
    let mut item = FakeElement::new("li").with_child(
        FakeElement::new("p")
            .with_class(portal::NEWS_TIMESTAMP)
            .with_attr(portal::NEWS_TIMESTAMP_ATTRIBUTE, timestamp),
    );
    if let Some(title) = title {
        item = item.with_child(
            FakeElement::new("h3")
                .with_class(portal::NEWS_TITLE)
                .with_child(FakeElement::new("a").with_text(title))
                .with_text(title),
        );
    }
    if let Some(description) = description {
        item = item.with_child(
            FakeElement::new("p")
                .with_class(portal::NEWS_DESCRIPTION)
                .with_text(description),
        );
    }
    if let Some(src) = image_src {
        item = item.with_child(
            FakeElement::new("picture").with_child(
                FakeElement::new("img")
                    .with_class(portal::NEWS_IMAGE)
                    .with_attr(portal::NEWS_IMAGE_ATTRIBUTE, src),
            ),
        );
    }
    item
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub items: Vec<FakeElement>,
    pub has_next: bool,
}

/// Everything the controller did to the fake session.
#[derive(Debug, Default)]
pub struct FakeState {
    pub page_index: usize,
    pub opened: Option<String>,
    pub clicks: Vec<String>,
    pub inputs: Vec<(String, String)>,
    pub checked_topics: Vec<String>,
    pub selected: Vec<(String, String)>,
    pub waits: Vec<String>,
    pub closed: bool,
}

pub struct FakeBrowser {
    pages: Vec<FakePage>,
    topics: Vec<String>,
    hidden: Vec<String>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            topics: vec!["Business".to_string(), "Technology".to_string()],
            hidden: Vec::new(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// Make `selector` never become visible.
    pub fn hide(mut self, selector: &str) -> Self {
        self.hidden.push(selector.to_string());
        self
    }

    pub fn state(&self) -> Arc<Mutex<FakeState>> {
        Arc::clone(&self.state)
    }

    pub fn page_url(index: usize) -> String {
        format!("https://www.latimes.com/search?q=nvidia&s=1&p={}", index + 1)
    }

    fn current_page(&self) -> FakePage {
        let index = self.state.lock().unwrap().page_index;
        self.pages.get(index).cloned().unwrap_or_default()
    }

    fn timeout(selector: &str, timeout: Duration) -> ScrapeError {
        ScrapeError::Timeout {
            condition: selector.to_string(),
            timeout,
        }
    }
}

impl Browser for FakeBrowser {
    type Element = FakeElement;

    async fn open(&mut self, url: &str) -> Result<()> {
        self.state.lock().unwrap().opened = Some(url.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let has_next = self.current_page().has_next;
        let mut state = self.state.lock().unwrap();
        state.clicks.push(selector.to_string());
        if selector == portal::RESULT_NEXT_PAGE_ANCHOR {
            if !has_next {
                return Err(ScrapeError::ElementNotFound(selector.to_string()));
            }
            state.page_index += 1;
        }
        Ok(())
    }

    async fn input_text(&self, selector: &str, text: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .inputs
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn select_checkbox(&self, selector: &str) -> Result<()> {
        let topic = self
            .topics
            .iter()
            .find(|t| portal::topic_checkbox(t) == selector)
            .ok_or_else(|| ScrapeError::ElementNotFound(selector.to_string()))?;
        self.state.lock().unwrap().checked_topics.push(topic.clone());
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .selected
            .push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.state.lock().unwrap().waits.push(selector.to_string());
        if self.hidden.iter().any(|h| h == selector) {
            return Err(Self::timeout(selector, timeout));
        }
        if selector.starts_with(portal::RESULT_NEXT_PAGE_ANCHOR) && selector != portal::RESULT_NEXT_PAGE_ANCHOR {
            let current = self.current_url().await?;
            let page = self.current_page();
            if !page.has_next || selector != portal::next_page_anchor_with_url(&current) {
                return Err(Self::timeout(selector, timeout));
            }
        }
        let checked = self.state.lock().unwrap().checked_topics.clone();
        for topic in &self.topics {
            if selector == portal::topic_checked_checkbox(topic) && !checked.contains(topic) {
                return Err(Self::timeout(selector, timeout));
            }
        }
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        if selector == portal::RESULT_NEXT_PAGE_ANCHOR {
            return Ok(self.current_page().has_next);
        }
        Ok(!self.hidden.iter().any(|h| h == selector))
    }

    async fn find_element(&self, selector: &str) -> Result<FakeElement> {
        let page = self.current_page();
        if selector == portal::RESULTS_LIST {
            let mut list = FakeElement::new("ul");
            list.children = page.items;
            return Ok(list);
        }
        if selector == portal::RESULT_NEXT_PAGE_ANCHOR && page.has_next {
            let index = self.state.lock().unwrap().page_index;
            return Ok(FakeElement::new("a").with_attr("href", &Self::page_url(index + 1)));
        }
        Err(ScrapeError::ElementNotFound(selector.to_string()))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(Self::page_url(self.state.lock().unwrap().page_index))
    }

    async fn wait_url(&self, url: &str, timeout: Duration) -> Result<()> {
        if self.current_url().await? == url {
            Ok(())
        } else {
            Err(Self::timeout(url, timeout))
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Serves canned bodies; unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    unreachable: Vec<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.push(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl FetchBytes for FakeFetcher {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.unreachable.iter().any(|u| u == url) {
            return Err(ScrapeError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}
