use std::time::Duration;

use thiserror::Error;

use crate::optimizer::{SolverKind, SolverStatus};

/// Invalid or missing inputs, detected before any solver call.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Horizon is empty: demand series has no hours")]
    EmptyHorizon,

    #[error("Series '{column}' required by '{technology}' is missing")]
    MissingSeries { technology: String, column: String },

    #[error("Series '{column}' has {actual} values, horizon has {expected}")]
    SeriesLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Series '{column}' has invalid value {value} at index {index}: {reason}")]
    InvalidSeries {
        column: String,
        index: usize,
        value: f64,
        reason: &'static str,
    },

    #[error("Bounds for '{technology}' are inverted: min {min} > max {max}")]
    InvertedBounds {
        technology: String,
        min: f64,
        max: f64,
    },

    #[error("Invalid parameter '{parameter}' for '{technology}': {reason}")]
    InvalidParameter {
        technology: String,
        parameter: &'static str,
        reason: String,
    },

    #[error("Variable '{owner}.{name}' was never declared")]
    UndeclaredVariable { owner: String, name: String },

    #[error("Unsupported config schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Config error: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Input error: {0}")]
    Input(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigurationError {
    pub(crate) fn invalid(
        technology: impl Into<String>,
        parameter: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        ConfigurationError::InvalidParameter {
            technology: technology.into(),
            parameter,
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigurationError {
    fn from(err: figment::Error) -> Self {
        ConfigurationError::Load(Box::new(err))
    }
}

/// The solver ran but did not reach an optimal solution.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver terminated with status {status}: {detail}")]
    Terminated { status: SolverStatus, detail: String },

    #[error("Solver backend '{0}' is not compiled into this build")]
    Unavailable(SolverKind),

    #[error("Solver did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("Solver task failed: {0}")]
    Task(String),
}

impl SolverError {
    /// Raw termination status, when the solver reported one
    pub fn status(&self) -> Option<SolverStatus> {
        match self {
            SolverError::Terminated { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A post-solve request that cannot be answered from the solved model.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Quantity '{owner}.{name}' was never declared in the solved model")]
    UndeclaredVariable { owner: String, name: String },

    #[error("No energy was delivered over the horizon; LCOE is undefined")]
    NoDeliveredEnergy,

    #[error("Export error: {0}")]
    Export(String),
}

impl From<csv::Error> for ExtractionError {
    fn from(err: csv::Error) -> Self {
        ExtractionError::Export(err.to_string())
    }
}

impl From<std::io::Error> for ExtractionError {
    fn from(err: std::io::Error) -> Self {
        ExtractionError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::Export(err.to_string())
    }
}

/// Any failure of a sizing run, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error("build failed: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("solve failed: {0}")]
    Solver(#[from] SolverError),

    #[error("extract failed: {0}")]
    Extraction(#[from] ExtractionError),
}

impl SizingError {
    /// Name of the pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            SizingError::Configuration(_) => "build",
            SizingError::Solver(_) => "solve",
            SizingError::Extraction(_) => "extract",
        }
    }
}
