//! Hybrid energy portfolio sizing.
//!
//! Sizes baseload, wind and solar generation, with optional grid import,
//! battery and hydrogen storage, to meet an hourly demand profile at minimum
//! levelized cost. The pipeline is:
//!
//! 1. [`timeseries`] loads demand and capacity factors into [`HourlyInputs`]
//! 2. [`optimizer::ModelBuilder`] turns a [`config::PortfolioConfig`] and the
//!    inputs into a mixed-integer linear model
//! 3. [`optimizer::SolverAdapter`] solves it with a good_lp backend
//! 4. [`report::ResultExtractor`] reads the solution back into a
//!    [`report::SizingReport`]
//!
//! [`engine::SizingEngine`] runs the whole pipeline.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod optimizer;
pub mod report;
pub mod telemetry;
pub mod timeseries;

pub use config::{Config, PortfolioConfig};
pub use engine::{SizingEngine, SizingOutcome, SweepEntry};
pub use error::{ConfigurationError, ExtractionError, SizingError, SolverError};
pub use timeseries::HourlyInputs;
