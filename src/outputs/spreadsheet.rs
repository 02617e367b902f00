//! Spreadsheet export of extracted records.
//!
//! The workbook has one sheet with a bold header row followed by one row per
//! [`Record`], in extraction order:
//!
//! | Title | Date | Description | Title Count | Description Count | Money Present | Picture Filename |
//! |-------|------|-------------|-------------|-------------------|---------------|------------------|
//!
//! An existing file at the target path is replaced.

use crate::error::ExportError;
use crate::models::Record;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::{info, instrument};

/// Column headers, in order.
pub const COLUMNS: [&str; 7] = [
    "Title",
    "Date",
    "Description",
    "Title Count",
    "Description Count",
    "Money Present",
    "Picture Filename",
];

const COLUMN_WIDTHS: [f64; 7] = [60.0, 20.0, 80.0, 12.0, 18.0, 14.0, 40.0];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Cell values for one record, in [`COLUMNS`] order.
pub fn record_row(record: &Record) -> [Cell; 7] {
    [
        Cell::Text(record.title.clone()),
        Cell::Text(record.published_at.format(DATE_FORMAT).to_string()),
        Cell::Text(record.description.clone()),
        Cell::Number(record.title_match_count as f64),
        Cell::Number(record.description_match_count as f64),
        Cell::Bool(record.money_mentioned),
        Cell::Text(record.picture_filename.clone()),
    ]
}

/// Write `records` to an `.xlsx` workbook at `path`.
///
/// # Arguments
///
/// * `records` - Rows to write, in output order. May be empty, in which case
///   the workbook holds only the header row.
/// * `path` - Target file. Replaced if it already exists.
///
/// # Returns
///
/// `Ok(())` once the workbook has been saved.
///
/// # Errors
///
/// Returns an [`ExportError`] if a cell cannot be written or the file cannot
/// be saved.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display(), count = records.len()))]
pub fn write_records(records: &[Record], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (col, (name, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *name, &header)?;
        worksheet.set_column_width(col, width)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, cell) in record_row(record).into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => worksheet.write_string(row, col, text)?,
                Cell::Number(n) => worksheet.write_number(row, col, n)?,
                Cell::Bool(b) => worksheet.write_boolean(row, col, b)?,
            };
        }
    }

    workbook.save(path.as_ref())?;
    info!("Saved spreadsheet");
    Ok(())
}
