//! CSV spreadsheet output.
//!
//! Columns follow [`SpreadsheetRow`]: `title`, `description`, `date`
//! (`YYYY-MM-DD`), `image_file_name`, `search_phrase_count`, `contains_money`.
//! Absent values are written as empty cells. The header is written even when
//! there are no records.

use crate::error::Result;
use crate::models::{ArticleRecord, SpreadsheetRow};
use csv::WriterBuilder;
use std::path::Path;
use tracing::{info, instrument};

const HEADER: [&str; 6] = [
    "title",
    "description",
    "date",
    "image_file_name",
    "search_phrase_count",
    "contains_money",
];

/// Write `records` to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub fn write_records(records: &[ArticleRecord], path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(HEADER)?;
    for record in records {
        let row: SpreadsheetRow = record.to_row();
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote spreadsheet");
    Ok(())
}
