//! Run artifacts written after scraping.
//!
//! # Submodules
//!
//! - [`spreadsheet`]: Writes the scraped articles to a CSV spreadsheet
//!
//! # Output Structure
//!
//! ```text
//! output/
//! ├── app.log      # Run log
//! ├── news.csv     # One row per in-window article
//! ├── chip.jpg     # Downloaded images, named after their source
//! └── ...
//! ```

pub mod spreadsheet;
