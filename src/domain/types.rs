use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::error::ConfigurationError;

// ============================================================================
// Horizon
// ============================================================================

/// Duration of one optimization step in hours.
///
/// Every power-to-energy conversion in the model multiplies by this constant;
/// there is no implicit half-hour factor anywhere.
pub const STEP_HOURS: f64 = 1.0;

/// Reject NaN and infinite parameters; NaN passes every range validator
pub(crate) fn ensure_finite(
    technology: &str,
    fields: &[(&'static str, f64)],
) -> Result<(), ConfigurationError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(name, value)) => Err(ConfigurationError::invalid(
            technology,
            name,
            format!("must be finite, got {value}"),
        )),
        None => Ok(()),
    }
}

/// Ordered, 0-indexed hourly time steps of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    steps: usize,
}

impl Horizon {
    /// Create a horizon of `steps` hours; an empty horizon is rejected
    pub fn hourly(steps: usize) -> Result<Self, ConfigurationError> {
        if steps == 0 {
            return Err(ConfigurationError::EmptyHorizon);
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    pub fn step_hours(&self) -> f64 {
        STEP_HOURS
    }

    /// Iterate over all step indices
    pub fn steps(&self) -> std::ops::Range<usize> {
        0..self.steps
    }

    /// Total duration covered by the horizon in hours
    pub fn duration_hours(&self) -> f64 {
        self.steps as f64 * STEP_HOURS
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.duration_hours())
    }
}

// ============================================================================
// Generation
// ============================================================================

/// A dispatchable or variable generation unit type.
///
/// Capacity and cost are per installed unit; the number of installed units is
/// the sizing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationUnit {
    /// Technology name, also used as the owner key of its variables
    pub name: String,
    /// Nameplate capacity per unit (kW)
    pub capacity_kw: f64,
    /// Levelized cost of energy ($/kWh)
    pub lcoe_per_kwh: f64,
}

impl GenerationUnit {
    pub fn new(name: impl Into<String>, capacity_kw: f64, lcoe_per_kwh: f64) -> Self {
        Self {
            name: name.into(),
            capacity_kw,
            lcoe_per_kwh,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::invalid("generation", "name", "must not be empty"));
        }
        if !self.capacity_kw.is_finite() || self.capacity_kw <= 0.0 {
            return Err(ConfigurationError::invalid(
                &self.name,
                "capacity_kw",
                format!("must be positive, got {}", self.capacity_kw),
            ));
        }
        if !self.lcoe_per_kwh.is_finite() || self.lcoe_per_kwh < 0.0 {
            return Err(ConfigurationError::invalid(
                &self.name,
                "lcoe_per_kwh",
                format!("must be non-negative, got {}", self.lcoe_per_kwh),
            ));
        }
        Ok(())
    }
}

/// Allowed range for an installed unit count (positive integers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityBounds {
    pub min_units: u32,
    pub max_units: u32,
}

impl CapacityBounds {
    pub fn new(min_units: u32, max_units: u32) -> Self {
        Self { min_units, max_units }
    }

    pub fn validate(&self, technology: &str) -> Result<(), ConfigurationError> {
        if self.min_units > self.max_units {
            return Err(ConfigurationError::InvertedBounds {
                technology: technology.to_string(),
                min: f64::from(self.min_units),
                max: f64::from(self.max_units),
            });
        }
        if self.min_units == 0 {
            return Err(ConfigurationError::invalid(
                technology,
                "min_units",
                "unit counts are positive integers, min must be at least 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Storage state transitions
// ============================================================================

/// Level of a storage technology at one step.
///
/// The first step is pinned to the configured initial level; every later step
/// is derived from the previous level and the flows of the previous step.
#[derive(Debug, Clone, PartialEq)]
pub enum StateTransition<E> {
    Initial(f64),
    Recurrence(E),
}

/// Previous-step inputs of a storage recurrence
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousStep<E> {
    pub level: E,
    /// Charge-side power drawn during the previous step (kW)
    pub input: E,
    /// Discharge-side power delivered during the previous step (kW)
    pub output: E,
}

/// Physics shared by every storage technology.
///
/// `transition` is generic over the numeric type so the same recurrence builds
/// solver expressions and simulates plain `f64` values.
pub trait StorageDynamics {
    /// Level at step 0, in the technology's storage unit
    fn initial_level(&self) -> f64;

    /// Level gained per kW of charge-side power held for one step
    fn stored_per_input(&self) -> f64;

    /// Level lost per kW of discharge-side power held for one step
    fn released_per_output(&self) -> f64;

    fn transition<E>(&self, previous: Option<PreviousStep<E>>) -> StateTransition<E>
    where
        E: Add<Output = E> + Sub<Output = E> + Mul<f64, Output = E>,
    {
        match previous {
            None => StateTransition::Initial(self.initial_level()),
            Some(prev) => StateTransition::Recurrence(
                prev.level + prev.input * self.stored_per_input()
                    - prev.output * self.released_per_output(),
            ),
        }
    }

    /// Simulate the level trajectory for given input/output power series
    fn simulate(&self, input: &[f64], output: &[f64]) -> Vec<f64> {
        let steps = input.len().min(output.len());
        let mut levels = Vec::with_capacity(steps);
        for t in 0..steps {
            let previous = if t == 0 {
                None
            } else {
                Some(PreviousStep {
                    level: levels[t - 1],
                    input: input[t - 1],
                    output: output[t - 1],
                })
            };
            let level = match self.transition(previous) {
                StateTransition::Initial(level) => level,
                StateTransition::Recurrence(level) => level,
            };
            levels.push(level);
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lossless;

    impl StorageDynamics for Lossless {
        fn initial_level(&self) -> f64 {
            10.0
        }
        fn stored_per_input(&self) -> f64 {
            1.0
        }
        fn released_per_output(&self) -> f64 {
            1.0
        }
    }

    #[test]
    fn test_empty_horizon_rejected() {
        assert!(matches!(Horizon::hourly(0), Err(ConfigurationError::EmptyHorizon)));
        let h = Horizon::hourly(24).unwrap();
        assert_eq!(h.len(), 24);
        assert_eq!(h.duration_hours(), 24.0);
        assert_eq!(h.to_string(), "24h");
    }

    #[test]
    fn test_inverted_bounds() {
        let err = CapacityBounds::new(5, 2).validate("smr").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvertedBounds { .. }));
        assert!(CapacityBounds::new(0, 2).validate("smr").is_err());
        assert!(CapacityBounds::new(3, 3).validate("smr").is_ok());
    }

    #[test]
    fn test_generation_unit_validation() {
        assert!(GenerationUnit::new("wind", 2000.0, 0.03).validate().is_ok());
        assert!(GenerationUnit::new("wind", 0.0, 0.03).validate().is_err());
        assert!(GenerationUnit::new("wind", 2000.0, -1.0).validate().is_err());
        assert!(GenerationUnit::new(" ", 2000.0, 0.03).validate().is_err());
    }

    #[test]
    fn test_transition_cases() {
        let first: StateTransition<f64> = Lossless.transition(None);
        assert_eq!(first, StateTransition::Initial(10.0));

        let next = Lossless.transition(Some(PreviousStep {
            level: 10.0,
            input: 3.0,
            output: 1.0,
        }));
        assert_eq!(next, StateTransition::Recurrence(12.0));
    }

    #[test]
    fn test_simulate_trajectory() {
        let levels = Lossless.simulate(&[1.0, 0.0, 0.0], &[0.0, 2.0, 0.0]);
        assert_eq!(levels, vec![10.0, 11.0, 9.0]);
    }
}
