use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::provider::{expand_daily, TimeSeriesProvider};
use super::table::{Resolution, TimeSeriesTable};
use crate::error::ConfigurationError;

/// How the hourly demand series is obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandSource {
    /// Demand read directly from a column of the hourly series file
    Hourly { column: String },
    /// Daily totals spread over the day by a normalized hourly profile
    DailyProfile {
        daily_path: PathBuf,
        daily_column: String,
        profile_path: PathBuf,
        profile_column: String,
    },
}

/// Where the time series come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Hourly CSV holding availability columns (and demand, for hourly demand)
    pub series_path: PathBuf,
    pub demand: DemandSource,
    /// Use only the first N hours of every series
    #[serde(default)]
    pub hours: Option<usize>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            series_path: PathBuf::from("data/sample_day.csv"),
            demand: DemandSource::Hourly {
                column: "demand".to_string(),
            },
            hours: None,
        }
    }
}

/// The aligned hourly artifact handed to the model builder.
///
/// Lengths are not checked here; the builder validates every series against
/// the demand horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyInputs {
    pub demand_kw: Vec<f64>,
    pub availability: BTreeMap<String, Vec<f64>>,
}

impl HourlyInputs {
    pub fn new(demand_kw: Vec<f64>) -> Self {
        Self {
            demand_kw,
            availability: BTreeMap::new(),
        }
    }

    pub fn with_availability(mut self, column: impl Into<String>, series: Vec<f64>) -> Self {
        self.availability.insert(column.into(), series);
        self
    }

    pub fn hours(&self) -> usize {
        self.demand_kw.len()
    }

    pub fn availability(&self, column: &str) -> Option<&[f64]> {
        self.availability.get(column).map(Vec::as_slice)
    }

    /// Keep only the first `hours` values of every series
    pub fn truncate(&mut self, hours: usize) {
        self.demand_kw.truncate(hours);
        for series in self.availability.values_mut() {
            series.truncate(hours);
        }
    }

    /// Load demand and the requested availability columns as configured
    pub fn load<'a>(
        config: &InputConfig,
        availability_columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigurationError> {
        let series = TimeSeriesTable::from_path(&config.series_path, Resolution::Hourly)?;
        let mut inputs = Self::from_provider(&series, &config.demand, availability_columns)?;

        if let Some(hours) = config.hours {
            inputs.truncate(hours);
        }

        info!(
            hours = inputs.hours(),
            availability = inputs.availability.len(),
            "time series ready"
        );
        Ok(inputs)
    }

    /// Assemble inputs from an already loaded hourly provider
    pub fn from_provider<'a, P: TimeSeriesProvider>(
        series: &P,
        demand: &DemandSource,
        availability_columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigurationError> {
        let demand_kw = match demand {
            DemandSource::Hourly { column } => series.hourly(column)?,
            DemandSource::DailyProfile {
                daily_path,
                daily_column,
                profile_path,
                profile_column,
            } => {
                let daily = TimeSeriesTable::from_path(daily_path, Resolution::Daily)?;
                let shape = TimeSeriesTable::from_path(profile_path, Resolution::Hourly)?;
                let profile = shape.profile(&shape.hourly(profile_column)?)?;
                expand_daily(&daily.daily(daily_column)?, &profile)
            }
        };

        let mut inputs = Self::new(demand_kw);
        for column in availability_columns {
            inputs = inputs.with_availability(column, series.hourly(column)?);
        }
        Ok(inputs)
    }
}
