use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{daily_totals, TimeSeriesProvider};
use crate::error::ConfigurationError;

/// Sampling resolution of a loaded table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Hourly,
    Daily,
}

/// Column-oriented table loaded from a CSV file with a header row.
///
/// Cells are kept as text and parsed when a column is requested, so non-numeric
/// columns (timestamps, labels) can live in the same file.
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    resolution: Resolution,
    columns: BTreeMap<String, Vec<String>>,
}

impl TimeSeriesTable {
    pub fn from_path(path: impl AsRef<Path>, resolution: Resolution) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, resolution)?;
        debug!(
            path = %path.display(),
            rows = table.rows(),
            columns = table.columns.len(),
            "loaded time series"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R, resolution: Resolution) -> Result<Self, ConfigurationError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut columns: BTreeMap<String, Vec<String>> =
            headers.iter().map(|h| (h.clone(), Vec::new())).collect();

        for record in rdr.records() {
            let record = record?;
            for (header, field) in headers.iter().zip(record.iter()) {
                if let Some(column) = columns.get_mut(header) {
                    column.push(field.to_string());
                }
            }
        }

        Ok(Self { resolution, columns })
    }

    /// Number of data rows
    pub fn rows(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }

    fn numeric(&self, column: &str) -> Result<Vec<f64>, ConfigurationError> {
        let raw = self
            .columns
            .get(column)
            .ok_or_else(|| ConfigurationError::MissingSeries {
                technology: "input".to_string(),
                column: column.to_string(),
            })?;

        raw.iter()
            .enumerate()
            .map(|(index, cell)| {
                cell.parse::<f64>()
                    .map_err(|_| ConfigurationError::InvalidSeries {
                        column: column.to_string(),
                        index,
                        value: f64::NAN,
                        reason: "not a number",
                    })
            })
            .collect()
    }
}

impl TimeSeriesProvider for TimeSeriesTable {
    fn hourly(&self, column: &str) -> Result<Vec<f64>, ConfigurationError> {
        match self.resolution {
            Resolution::Hourly => self.numeric(column),
            Resolution::Daily => Err(ConfigurationError::invalid(
                "input",
                "resolution",
                format!("column '{column}' is daily and cannot be read as hourly"),
            )),
        }
    }

    fn daily(&self, column: &str) -> Result<Vec<f64>, ConfigurationError> {
        match self.resolution {
            Resolution::Daily => self.numeric(column),
            Resolution::Hourly => Ok(daily_totals(&self.numeric(column)?)),
        }
    }
}
