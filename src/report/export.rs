//! CSV and JSON export of sizing results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::table::ReportTable;
use crate::error::ExtractionError;

/// Header of the leading hour column in the wide layout
const HOUR_COLUMN: &str = "hour";

/// Shape of the hourly dispatch CSV
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CsvLayout {
    /// One row per hour, one column per quantity
    #[default]
    Wide,
    /// One row per hour and quantity
    Long,
}

/// Exports the table to a CSV file at `path`
pub fn export_dispatch_csv(
    table: &ReportTable,
    path: &Path,
    layout: CsvLayout,
) -> Result<(), ExtractionError> {
    let file = File::create(path)?;
    let writer = io::BufWriter::new(file);
    match layout {
        CsvLayout::Wide => write_wide_csv(table, writer),
        CsvLayout::Long => write_long_csv(table, writer),
    }
}

/// One row per hour: `hour` followed by every `technology.quantity` column
pub fn write_wide_csv(table: &ReportTable, writer: impl Write) -> Result<(), ExtractionError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec![HOUR_COLUMN.to_string()];
    header.extend(table.headers());
    wtr.write_record(&header)?;

    for (hour, row) in table.wide_rows().enumerate() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(hour.to_string());
        record.extend(row.iter().map(|value| format!("{value:.4}")));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// One row per `(hour, technology, quantity)` cell
pub fn write_long_csv(table: &ReportTable, writer: impl Write) -> Result<(), ExtractionError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for record in table.long_rows() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes any serializable summary as pretty JSON to `path`
pub fn export_summary_json<T: Serialize>(summary: &T, path: &Path) -> Result<(), ExtractionError> {
    let file = File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}
