use good_lp::{variable, Expression, ProblemVariables};

use crate::domain::{CapacityBounds, GenerationUnit, Horizon};
use crate::error::{ConfigurationError, ExtractionError};
use crate::optimizer::model::{ConstraintSet, ModelContext, VariableSet};
use crate::optimizer::solver::VariableValues;
use crate::optimizer::technology::{Technology, TechnologyKind, TechnologyReport};
use crate::report::{CostLedger, InstalledCapacity, ReportColumn};

const UNITS: &str = "units";

/// A generation technology sized by an integer unit count.
///
/// Output at step `t` is `units * capacity_kw * availability[t]`. Baseload
/// plants have availability 1 everywhere; wind and solar follow their
/// capacity-factor series.
#[derive(Debug, Clone)]
pub struct Generator {
    unit: GenerationUnit,
    bounds: CapacityBounds,
    availability: Vec<f64>,
}

impl Generator {
    pub fn new(
        unit: GenerationUnit,
        bounds: CapacityBounds,
        availability: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        unit.validate()?;
        bounds.validate(&unit.name)?;

        for (index, &value) in availability.iter().enumerate() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::InvalidSeries {
                    column: unit.name.clone(),
                    index,
                    value,
                    reason: "capacity factor must lie in [0, 1]",
                });
            }
        }

        Ok(Self {
            unit,
            bounds,
            availability,
        })
    }

    /// A plant available at full capacity every hour
    pub fn baseload(
        unit: GenerationUnit,
        bounds: CapacityBounds,
        horizon: &Horizon,
    ) -> Result<Self, ConfigurationError> {
        Self::new(unit, bounds, vec![1.0; horizon.len()])
    }

    pub fn unit(&self) -> &GenerationUnit {
        &self.unit
    }

    pub fn bounds(&self) -> CapacityBounds {
        self.bounds
    }

    /// Output of one installed unit at step `t` (kW)
    fn per_unit_kw(&self, t: usize) -> f64 {
        self.unit.capacity_kw * self.availability[t]
    }
}

impl Technology for Generator {
    fn name(&self) -> &str {
        &self.unit.name
    }

    fn kind(&self) -> TechnologyKind {
        TechnologyKind::Generation
    }

    fn declare_variables(&self, vars: &mut ProblemVariables, _horizon: &Horizon) -> VariableSet {
        let units = vars.add(
            variable()
                .integer()
                .min(self.bounds.min_units)
                .max(self.bounds.max_units),
        );
        VariableSet::new(self.name()).with_scalar(UNITS, units)
    }

    fn constraints(&self, _ctx: &ModelContext) -> Result<ConstraintSet, ConfigurationError> {
        // Unit bounds live on the integer variable itself
        Ok(ConstraintSet::new(self.name()))
    }

    fn supply(&self, ctx: &ModelContext, t: usize) -> Result<Expression, ConfigurationError> {
        let units = ctx.scalar(self.name(), UNITS)?;
        Ok(units * self.per_unit_kw(t))
    }

    fn cost(&self, ctx: &ModelContext) -> Result<Expression, ConfigurationError> {
        let units = ctx.scalar(self.name(), UNITS)?;
        let horizon = ctx.horizon();
        let energy_per_unit_kwh: f64 = horizon
            .steps()
            .map(|t| self.per_unit_kw(t) * horizon.step_hours())
            .sum();
        Ok(units * (self.unit.lcoe_per_kwh * energy_per_unit_kwh))
    }

    fn report(
        &self,
        values: &VariableValues,
        horizon: &Horizon,
    ) -> Result<TechnologyReport, ExtractionError> {
        let units = values.scalar(self.name(), UNITS)?.round().max(0.0) as u32;
        let generation: Vec<f64> = horizon
            .steps()
            .map(|t| f64::from(units) * self.per_unit_kw(t))
            .collect();
        let delivered_kwh = generation.iter().sum::<f64>() * horizon.step_hours();

        Ok(TechnologyReport::new(horizon)
            .with_column(ReportColumn::new(self.name(), "generation_kw", generation.clone()))
            .with_supply(generation)
            .with_ledger(CostLedger::delivered(delivered_kwh, self.unit.lcoe_per_kwh))
            .with_installed(InstalledCapacity::new(
                self.name(),
                units,
                self.unit.capacity_kw,
            )))
    }
}
