use good_lp::{constraint, variable, Expression, ProblemVariables};

use crate::domain::{
    Horizon, HydrogenParams, PreviousStep, StateTransition, StorageDynamics,
};
use crate::error::{ConfigurationError, ExtractionError};
use crate::optimizer::model::{ConstraintSet, ModelContext, VariableSet};
use crate::optimizer::solver::VariableValues;
use crate::optimizer::technology::{Technology, TechnologyKind, TechnologyReport};
use crate::report::{CostLedger, ReportColumn};

pub const HYDROGEN: &str = "hydrogen";
const ELECTROLYZER: &str = "electrolyzer";
const FUEL_CELL: &str = "fuel_cell";
const LEVEL: &str = "level";

/// Power-to-hydrogen-to-power loop: SOEC electrolyzer, pressurized tank and
/// fuel cell.
///
/// The electrolyzer runs only on excess power and its hydrogen is credited at
/// the configured price; the fuel cell covers deficits from the tank.
#[derive(Debug, Clone)]
pub struct HydrogenLoop {
    params: HydrogenParams,
}

impl HydrogenLoop {
    pub fn new(params: HydrogenParams) -> Result<Self, ConfigurationError> {
        params.validate_physics()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &HydrogenParams {
        &self.params
    }
}

impl Technology for HydrogenLoop {
    fn name(&self) -> &str {
        HYDROGEN
    }

    fn kind(&self) -> TechnologyKind {
        TechnologyKind::Storage
    }

    fn declare_variables(&self, vars: &mut ProblemVariables, horizon: &Horizon) -> VariableSet {
        let n = horizon.len();
        VariableSet::new(HYDROGEN)
            .with_series(ELECTROLYZER, vars.add_vector(variable().min(0.0), n))
            .with_series(FUEL_CELL, vars.add_vector(variable().min(0.0), n))
            .with_series(LEVEL, vars.add_vector(variable().min(0.0), n))
    }

    fn constraints(&self, ctx: &ModelContext) -> Result<ConstraintSet, ConfigurationError> {
        let electrolyzer = ctx.series(HYDROGEN, ELECTROLYZER)?;
        let fuel_cell = ctx.series(HYDROGEN, FUEL_CELL)?;
        let level = ctx.series(HYDROGEN, LEVEL)?;
        let p = &self.params;
        let min_kg = p.min_storage_kg();
        let max_kg = p.max_storage_kg();
        let produced = p.stored_per_input();
        let consumed = p.released_per_output();

        let mut set = ConstraintSet::new(HYDROGEN);
        for t in ctx.horizon().steps() {
            set.push(constraint!(electrolyzer[t] <= ctx.excess(t)));
            set.push(constraint!(electrolyzer[t] <= p.electrolyzer_rating_kw()));
            set.push(constraint!(fuel_cell[t] <= p.fuel_cell_rating_kw()));
            set.push(constraint!(fuel_cell[t] * consumed - level[t] <= -min_kg));
            set.push(constraint!(electrolyzer[t] * produced + level[t] <= max_kg));

            let previous = (t > 0).then(|| PreviousStep {
                level: Expression::from(level[t - 1]),
                input: Expression::from(electrolyzer[t - 1]),
                output: Expression::from(fuel_cell[t - 1]),
            });
            set.push(match p.transition(previous) {
                StateTransition::Initial(kg) => constraint!(level[t] == kg),
                StateTransition::Recurrence(kg) => constraint!(level[t] == kg),
            });

            set.push(constraint!(level[t] >= min_kg));
            set.push(constraint!(level[t] <= max_kg));
        }
        Ok(set)
    }

    fn supply(&self, ctx: &ModelContext, t: usize) -> Result<Expression, ConfigurationError> {
        Ok(ctx.series(HYDROGEN, FUEL_CELL)?[t].into())
    }

    fn draw(&self, ctx: &ModelContext, t: usize) -> Result<Expression, ConfigurationError> {
        Ok(ctx.series(HYDROGEN, ELECTROLYZER)?[t].into())
    }

    fn cost(&self, ctx: &ModelContext) -> Result<Expression, ConfigurationError> {
        let electrolyzer = ctx.series(HYDROGEN, ELECTROLYZER)?;
        let fuel_cell = ctx.series(HYDROGEN, FUEL_CELL)?;
        let p = &self.params;
        let fuel_cell_cost = p.fuel_cell_lcoe_per_kwh * ctx.horizon().step_hours();
        let credit_per_kw = p.hydrogen_credit_per_kg * p.stored_per_input();

        Ok(ctx
            .horizon()
            .steps()
            .map(|t| fuel_cell[t] * fuel_cell_cost - electrolyzer[t] * credit_per_kw)
            .sum())
    }

    fn report(
        &self,
        values: &VariableValues,
        horizon: &Horizon,
    ) -> Result<TechnologyReport, ExtractionError> {
        let electrolyzer = values.series(HYDROGEN, ELECTROLYZER)?.to_vec();
        let fuel_cell = values.series(HYDROGEN, FUEL_CELL)?.to_vec();
        let level = values.series(HYDROGEN, LEVEL)?.to_vec();
        let p = &self.params;

        let produced: Vec<f64> = electrolyzer.iter().map(|&kw| p.produced_kg(kw)).collect();
        let byproduct_kg: f64 = produced.iter().sum();
        let delivered_kwh = fuel_cell.iter().sum::<f64>() * horizon.step_hours();

        let ledger = CostLedger {
            credit: byproduct_kg * p.hydrogen_credit_per_kg,
            byproduct_kg,
            ..CostLedger::delivered(delivered_kwh, p.fuel_cell_lcoe_per_kwh)
        };

        Ok(TechnologyReport::new(horizon)
            .with_column(ReportColumn::new(HYDROGEN, "electrolyzer_kw", electrolyzer.clone()))
            .with_column(ReportColumn::new(HYDROGEN, "fuel_cell_kw", fuel_cell.clone()))
            .with_column(ReportColumn::new(HYDROGEN, "level_kg", level))
            .with_column(ReportColumn::new(HYDROGEN, "produced_kg", produced))
            .with_supply(fuel_cell)
            .with_draw(electrolyzer)
            .with_ledger(ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_tank_rejected_before_model() {
        let params = HydrogenParams {
            tank_volume_m3: 0.0,
            ..HydrogenParams::default()
        };
        assert!(HydrogenLoop::new(params).is_err());
    }

    #[test]
    fn test_report_credits_produced_hydrogen() {
        let horizon = Horizon::hourly(2).unwrap();
        let h2 = HydrogenLoop::new(HydrogenParams::default()).unwrap();
        let values = VariableValues::default()
            .with(HYDROGEN, ELECTROLYZER, vec![1000.0, 0.0])
            .with(HYDROGEN, FUEL_CELL, vec![0.0, 300.0])
            .with(HYDROGEN, LEVEL, vec![500.0, 521.0]);

        let report = h2.report(&values, &horizon).unwrap();
        let params = h2.params();
        let produced = params.produced_kg(1000.0);

        assert_relative_eq!(report.ledger.byproduct_kg, produced);
        assert_relative_eq!(report.ledger.credit, produced * params.hydrogen_credit_per_kg);
        assert_relative_eq!(report.ledger.delivered_kwh, 300.0);
        assert_relative_eq!(report.ledger.cost, 300.0 * params.fuel_cell_lcoe_per_kwh);
        assert_eq!(report.supply_kw, vec![0.0, 300.0]);
    }
}
