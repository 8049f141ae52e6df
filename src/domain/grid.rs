use serde::{Deserialize, Serialize};
use validator::Validate;

use super::types::ensure_finite;
use crate::error::ConfigurationError;

/// Grid import connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GridParams {
    /// Maximum import power (kW)
    #[validate(range(min = 0.0))]
    pub max_import_kw: f64,
    /// Import price ($/kWh)
    #[validate(range(min = 0.0))]
    pub price_per_kwh: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            max_import_kw: 40_000.0,
            price_per_kwh: 0.14,
        }
    }
}

impl GridParams {
    pub fn validate_physics(&self) -> Result<(), ConfigurationError> {
        ensure_finite(
            "grid",
            &[
                ("max_import_kw", self.max_import_kw),
                ("price_per_kwh", self.price_per_kwh),
            ],
        )?;
        self.validate()?;
        Ok(())
    }
}
