use serde::{Deserialize, Serialize};
use validator::Validate;

use super::types::{ensure_finite, StorageDynamics, STEP_HOURS};
use crate::error::ConfigurationError;

/// Electrochemical battery parameters.
///
/// Energy quantities are in kWh, power in kW. The efficiency is applied on
/// each leg: charging stores `P * eff * dt`, discharging drains `P / eff * dt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BatteryParams {
    /// Minimum state of charge (kWh)
    #[validate(range(min = 0.0))]
    pub min_soc_kwh: f64,
    /// Maximum state of charge (kWh)
    #[validate(range(min = 0.0))]
    pub max_soc_kwh: f64,
    /// State of charge at hour 0 (kWh)
    #[validate(range(min = 0.0))]
    pub initial_soc_kwh: f64,
    /// Maximum charging power (kW)
    #[validate(range(min = 0.0))]
    pub max_charge_kw: f64,
    /// Maximum discharging power (kW)
    #[validate(range(min = 0.0))]
    pub max_discharge_kw: f64,
    /// One-way efficiency, applied on both charge and discharge (0, 1]
    pub efficiency: f64,
    /// Levelized cost per kWh discharged ($/kWh)
    #[validate(range(min = 0.0))]
    pub lcoe_per_kwh: f64,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            min_soc_kwh: 2_000.0,
            max_soc_kwh: 20_000.0,
            initial_soc_kwh: 10_000.0,
            max_charge_kw: 5_000.0,
            max_discharge_kw: 5_000.0,
            efficiency: 0.95,
            lcoe_per_kwh: 0.1,
        }
    }
}

impl BatteryParams {
    /// Reject physically inconsistent parameters before any model is built
    pub fn validate_physics(&self) -> Result<(), ConfigurationError> {
        ensure_finite(
            "battery",
            &[
                ("min_soc_kwh", self.min_soc_kwh),
                ("max_soc_kwh", self.max_soc_kwh),
                ("initial_soc_kwh", self.initial_soc_kwh),
                ("max_charge_kw", self.max_charge_kw),
                ("max_discharge_kw", self.max_discharge_kw),
                ("efficiency", self.efficiency),
                ("lcoe_per_kwh", self.lcoe_per_kwh),
            ],
        )?;
        self.validate()?;

        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(ConfigurationError::invalid(
                "battery",
                "efficiency",
                format!("must be in (0, 1], got {}", self.efficiency),
            ));
        }
        if self.min_soc_kwh > self.max_soc_kwh {
            return Err(ConfigurationError::InvertedBounds {
                technology: "battery".to_string(),
                min: self.min_soc_kwh,
                max: self.max_soc_kwh,
            });
        }
        if self.initial_soc_kwh < self.min_soc_kwh || self.initial_soc_kwh > self.max_soc_kwh {
            return Err(ConfigurationError::invalid(
                "battery",
                "initial_soc_kwh",
                format!(
                    "{} is outside [{}, {}]",
                    self.initial_soc_kwh, self.min_soc_kwh, self.max_soc_kwh
                ),
            ));
        }
        Ok(())
    }
}

impl StorageDynamics for BatteryParams {
    fn initial_level(&self) -> f64 {
        self.initial_soc_kwh
    }

    fn stored_per_input(&self) -> f64 {
        self.efficiency * STEP_HOURS
    }

    fn released_per_output(&self) -> f64 {
        STEP_HOURS / self.efficiency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BatteryParams::default().validate_physics().is_ok());
    }

    #[test]
    fn test_rejects_bad_efficiency() {
        let params = BatteryParams {
            efficiency: -0.5,
            ..Default::default()
        };
        assert!(params.validate_physics().is_err());

        let params = BatteryParams {
            efficiency: 1.2,
            ..Default::default()
        };
        assert!(params.validate_physics().is_err());
    }

    #[test]
    fn test_rejects_inverted_soc_bounds() {
        let params = BatteryParams {
            min_soc_kwh: 500.0,
            max_soc_kwh: 100.0,
            initial_soc_kwh: 200.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate_physics(),
            Err(ConfigurationError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_initial_outside_bounds() {
        let params = BatteryParams {
            initial_soc_kwh: 50_000.0,
            ..Default::default()
        };
        assert!(params.validate_physics().is_err());
    }

    #[test]
    fn test_rejects_nan_power_limits() {
        let params = BatteryParams {
            max_charge_kw: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            params.validate_physics(),
            Err(ConfigurationError::InvalidParameter {
                parameter: "max_charge_kw",
                ..
            })
        ));

        let params = BatteryParams {
            min_soc_kwh: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate_physics().is_err());
    }

    #[test]
    fn test_recurrence_applies_efficiency_on_both_legs() {
        let params = BatteryParams::default();
        // Charge 1000 kW for one hour, then discharge 950 kW for one hour
        let soc = params.simulate(&[1000.0, 0.0, 0.0], &[0.0, 950.0, 0.0]);
        assert_eq!(soc[0], 10_000.0);
        assert_relative_eq!(soc[1], 10_950.0, epsilon = 1e-9);
        assert_relative_eq!(soc[2], 10_950.0 - 1000.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn prop_round_trip_never_gains_energy(power in 0.0f64..5000.0, eff in 0.5f64..1.0) {
            let params = BatteryParams { efficiency: eff, ..Default::default() };
            // Store `power` for one step, then release what was stored
            let stored = power * params.stored_per_input();
            let released_power = stored / params.released_per_output();
            prop_assert!(released_power <= power + 1e-9);
        }
    }
}
