use good_lp::{constraint, variable, Expression, ProblemVariables};

use crate::domain::{BatteryParams, Horizon, PreviousStep, StateTransition, StorageDynamics};
use crate::error::{ConfigurationError, ExtractionError};
use crate::optimizer::model::{ConstraintSet, ModelContext, VariableSet};
use crate::optimizer::solver::VariableValues;
use crate::optimizer::technology::{Technology, TechnologyKind, TechnologyReport};
use crate::report::{CostLedger, ReportColumn};

pub const BATTERY: &str = "battery";
const CHARGE: &str = "charge";
const DISCHARGE: &str = "discharge";
const SOC: &str = "soc";

/// Battery energy storage.
///
/// Per step: charge (kW), discharge (kW) and state of charge (kWh). Eight
/// constraints per step:
/// - charge and discharge power limits
/// - charge fits in the remaining headroom after losses
/// - discharge is covered by the energy above the floor after losses
/// - the state-of-charge transition (step 0 pinned to the initial level)
/// - state of charge floor and ceiling
/// - charging only from excess power
#[derive(Debug, Clone)]
pub struct Battery {
    params: BatteryParams,
}

impl Battery {
    pub fn new(params: BatteryParams) -> Result<Self, ConfigurationError> {
        params.validate_physics()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BatteryParams {
        &self.params
    }
}

impl Technology for Battery {
    fn name(&self) -> &str {
        BATTERY
    }

    fn kind(&self) -> TechnologyKind {
        TechnologyKind::Storage
    }

    fn declare_variables(&self, vars: &mut ProblemVariables, horizon: &Horizon) -> VariableSet {
        let n = horizon.len();
        VariableSet::new(BATTERY)
            .with_series(CHARGE, vars.add_vector(variable().min(0.0), n))
            .with_series(DISCHARGE, vars.add_vector(variable().min(0.0), n))
            .with_series(SOC, vars.add_vector(variable().min(0.0), n))
    }

    fn constraints(&self, ctx: &ModelContext) -> Result<ConstraintSet, ConfigurationError> {
        let charge = ctx.series(BATTERY, CHARGE)?;
        let discharge = ctx.series(BATTERY, DISCHARGE)?;
        let soc = ctx.series(BATTERY, SOC)?;
        let p = &self.params;
        let stored = p.stored_per_input();
        let released = p.released_per_output();

        let mut set = ConstraintSet::new(BATTERY);
        for t in ctx.horizon().steps() {
            set.push(constraint!(charge[t] <= p.max_charge_kw));
            set.push(constraint!(discharge[t] <= p.max_discharge_kw));
            set.push(constraint!(charge[t] * stored + soc[t] <= p.max_soc_kwh));
            set.push(constraint!(discharge[t] * released - soc[t] <= -p.min_soc_kwh));

            let previous = (t > 0).then(|| PreviousStep {
                level: Expression::from(soc[t - 1]),
                input: Expression::from(charge[t - 1]),
                output: Expression::from(discharge[t - 1]),
            });
            set.push(match p.transition(previous) {
                StateTransition::Initial(level) => constraint!(soc[t] == level),
                StateTransition::Recurrence(level) => constraint!(soc[t] == level),
            });

            set.push(constraint!(soc[t] >= p.min_soc_kwh));
            set.push(constraint!(soc[t] <= p.max_soc_kwh));
            set.push(constraint!(charge[t] <= ctx.excess(t)));
        }
        Ok(set)
    }

    fn supply(&self, ctx: &ModelContext, t: usize) -> Result<Expression, ConfigurationError> {
        Ok(ctx.series(BATTERY, DISCHARGE)?[t].into())
    }

    fn draw(&self, ctx: &ModelContext, t: usize) -> Result<Expression, ConfigurationError> {
        Ok(ctx.series(BATTERY, CHARGE)?[t].into())
    }

    fn cost(&self, ctx: &ModelContext) -> Result<Expression, ConfigurationError> {
        let discharge = ctx.series(BATTERY, DISCHARGE)?;
        let step_cost = self.params.lcoe_per_kwh * ctx.horizon().step_hours();
        Ok(discharge.iter().map(|&d| d * step_cost).sum())
    }

    fn report(
        &self,
        values: &VariableValues,
        horizon: &Horizon,
    ) -> Result<TechnologyReport, ExtractionError> {
        let charge = values.series(BATTERY, CHARGE)?.to_vec();
        let discharge = values.series(BATTERY, DISCHARGE)?.to_vec();
        let soc = values.series(BATTERY, SOC)?.to_vec();
        let delivered_kwh = discharge.iter().sum::<f64>() * horizon.step_hours();

        Ok(TechnologyReport::new(horizon)
            .with_column(ReportColumn::new(BATTERY, "charge_kw", charge.clone()))
            .with_column(ReportColumn::new(BATTERY, "discharge_kw", discharge.clone()))
            .with_column(ReportColumn::new(BATTERY, "soc_kwh", soc))
            .with_supply(discharge)
            .with_draw(charge)
            .with_ledger(CostLedger::delivered(delivered_kwh, self.params.lcoe_per_kwh)))
    }
}
