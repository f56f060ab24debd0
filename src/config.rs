//! Search inputs: phrase, topic filters and the size of the date window.
//!
//! Values are resolved in order of precedence from the command line (or its
//! environment variables), an optional work-item YAML file, and built-in
//! defaults. Malformed topics or month counts are logged and replaced by the
//! default instead of failing the run.
//!
//! A work-item file looks like:
//!
//! ```yaml
//! SEARCH_PHRASE: Nvidia
//! TOPICS: [Business, Technology]
//! NUMBER_OF_MONTHS: 3
//! ```

use crate::error::{Result, ScrapeError};
use itertools::Itertools;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

pub const DEFAULT_SEARCH_PHRASE: &str = "Nvidia";
pub const DEFAULT_TOPICS: &[&str] = &["Business"];
pub const DEFAULT_NUMBER_OF_MONTHS: u32 = 3;

/// The inputs that drive one scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub search_phrase: String,
    /// Topic filter labels, without duplicates.
    pub topics: Vec<String>,
    /// Months covered by the date window, current month included. At least 1.
    pub number_of_months: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_phrase: DEFAULT_SEARCH_PHRASE.to_string(),
            topics: default_topics(),
            number_of_months: DEFAULT_NUMBER_OF_MONTHS,
        }
    }
}

/// Raw variables from a work-item file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct WorkItem {
    #[serde(rename = "SEARCH_PHRASE")]
    pub search_phrase: Option<String>,
    #[serde(rename = "TOPICS")]
    pub topics: Option<Value>,
    #[serde(rename = "NUMBER_OF_MONTHS")]
    pub number_of_months: Option<Value>,
}

impl WorkItem {
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        info!("Providing inputs from work item");
        let raw = fs::read_to_string(path.as_ref()).await?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| ScrapeError::Config(format!("invalid work item: {e}")))
    }
}

impl SearchConfig {
    /// Merge command-line values over a work item over the defaults.
    ///
    /// `topics` and `number_of_months` are raw strings because they usually
    /// come from environment variables.
    pub fn resolve(
        search_phrase: Option<String>,
        topics: Option<String>,
        number_of_months: Option<String>,
        work_item: WorkItem,
    ) -> Self {
        let search_phrase = search_phrase
            .or(work_item.search_phrase)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_PHRASE.to_string());

        let topics_value = topics.map(Value::String).or(work_item.topics);
        let topics = match topics_value {
            None => default_topics(),
            Some(value) => parse_topics(&value).unwrap_or_else(|| {
                warn!(topics = ?value, "Malformed topics input; using default topics");
                default_topics()
            }),
        };

        let months_value = number_of_months.map(Value::String).or(work_item.number_of_months);
        let number_of_months = match months_value {
            None => DEFAULT_NUMBER_OF_MONTHS,
            Some(value) => parse_months(&value).unwrap_or_else(|| {
                warn!(number_of_months = ?value, "Malformed number of months; using default");
                DEFAULT_NUMBER_OF_MONTHS
            }),
        };

        Self {
            search_phrase,
            topics,
            number_of_months,
        }
    }

    pub fn log_summary(&self) {
        info!(value = %self.search_phrase, "Running with search_phrase");
        info!(value = ?self.topics, "Running with topics");
        info!(value = self.number_of_months, "Running with number_of_months");
    }
}

fn default_topics() -> Vec<String> {
    DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
}

/// A list of strings, given either as YAML or as text holding a YAML/JSON list.
fn parse_topics(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => {
            let topics: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(|s| s.trim().to_string()))
                .collect();
            Some(
                topics?
                    .into_iter()
                    .filter(|t| !t.is_empty())
                    .unique()
                    .collect(),
            )
        }
        Value::String(text) => match serde_yaml::from_str::<Value>(text) {
            Ok(inner @ Value::Sequence(_)) => parse_topics(&inner),
            _ => None,
        },
        _ => None,
    }
}

fn parse_months(value: &Value) -> Option<u32> {
    let months = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(months).ok().filter(|m| *m >= 1)
}
