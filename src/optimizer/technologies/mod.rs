//! Concrete technologies and the factory that enables them from configuration.

pub mod battery;
pub mod generator;
pub mod grid;
pub mod hydrogen;

pub use battery::{Battery, BATTERY};
pub use generator::Generator;
pub use grid::{GridImport, GRID};
pub use hydrogen::{HydrogenLoop, HYDROGEN};

use tracing::debug;

use super::technology::Technology;
use crate::config::{GeneratorConfig, PortfolioConfig};
use crate::domain::Horizon;
use crate::error::ConfigurationError;
use crate::timeseries::HourlyInputs;

/// Create every enabled technology for one run.
///
/// Generation units are always present. Optional technologies are added
/// according to the portfolio's selection flags; a disabled technology
/// contributes nothing to the model.
pub fn instantiate(
    portfolio: &PortfolioConfig,
    inputs: &HourlyInputs,
    horizon: &Horizon,
) -> Result<Vec<Box<dyn Technology>>, ConfigurationError> {
    let mut enabled: Vec<Box<dyn Technology>> = Vec::new();

    for unit in portfolio.generation.units() {
        enabled.push(Box::new(generator(unit, inputs, horizon)?));
    }

    let selection = &portfolio.technologies;
    if selection.grid {
        enabled.push(Box::new(GridImport::new(portfolio.grid.clone())?));
    }
    if selection.battery {
        enabled.push(Box::new(Battery::new(portfolio.battery.clone())?));
    }
    if selection.hydrogen {
        enabled.push(Box::new(HydrogenLoop::new(portfolio.hydrogen.clone())?));
    }

    debug!(
        technologies = ?enabled.iter().map(|t| t.name()).collect::<Vec<_>>(),
        "technologies enabled"
    );
    Ok(enabled)
}

fn generator(
    config: &GeneratorConfig,
    inputs: &HourlyInputs,
    horizon: &Horizon,
) -> Result<Generator, ConfigurationError> {
    let Some(column) = &config.availability else {
        return Generator::baseload(config.unit(), config.bounds(), horizon);
    };

    let series = inputs
        .availability(column)
        .ok_or_else(|| ConfigurationError::MissingSeries {
            technology: config.name.clone(),
            column: column.clone(),
        })?;

    if series.len() != horizon.len() {
        return Err(ConfigurationError::SeriesLength {
            column: column.clone(),
            expected: horizon.len(),
            actual: series.len(),
        });
    }

    Generator::new(config.unit(), config.bounds(), series.to_vec())
}
