//! Command-line interface definitions.
//!
//! Search inputs can also come from environment variables or from a
//! work-item YAML file (see [`crate::config`]).

use clap::Parser;

/// Command-line arguments for the news scraper.
///
/// # Examples
///
/// ```sh
/// # Defaults: "Nvidia", [Business], 3 months, written to ./output
/// latimes_news_scraper
///
/// # Explicit search
/// latimes_news_scraper --search-phrase Tesla --topics '[Business, Technology]' --months 2
///
/// # Inputs from a work item file
/// latimes_news_scraper --work-item ./work_item.yaml -o ./artifacts
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Phrase typed into the site search
    #[arg(long, env = "SEARCH_PHRASE")]
    pub search_phrase: Option<String>,

    /// Topic filters as a list, e.g. '[Business, Politics]'
    #[arg(long, env = "TOPICS")]
    pub topics: Option<String>,

    /// Months to cover, current month included
    #[arg(long = "months", env = "NUMBER_OF_MONTHS", allow_hyphen_values = true)]
    pub number_of_months: Option<String>,

    /// YAML file with SEARCH_PHRASE, TOPICS and NUMBER_OF_MONTHS keys
    #[arg(short, long, env = "WORK_ITEM_PATH")]
    pub work_item: Option<String>,

    /// Directory for the spreadsheet, images and log
    #[arg(short, long, default_value = "output")]
    pub output_dir: String,

    /// Spreadsheet file name, without extension
    #[arg(long, default_value = "news")]
    pub spreadsheet_name: String,

    /// Log file path (defaults to <output-dir>/app.log)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Seconds to wait for any page condition before giving up
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}
