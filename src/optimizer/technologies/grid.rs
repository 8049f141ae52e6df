use good_lp::{constraint, variable, Expression, ProblemVariables};

use crate::domain::{GridParams, Horizon};
use crate::error::{ConfigurationError, ExtractionError};
use crate::optimizer::model::{ConstraintSet, ModelContext, VariableSet};
use crate::optimizer::solver::VariableValues;
use crate::optimizer::technology::{Technology, TechnologyKind, TechnologyReport};
use crate::report::{CostLedger, ReportColumn};

pub const GRID: &str = "grid";
const IMPORT: &str = "import";

/// Capped power import from the external grid at a flat price
#[derive(Debug, Clone)]
pub struct GridImport {
    params: GridParams,
}

impl GridImport {
    pub fn new(params: GridParams) -> Result<Self, ConfigurationError> {
        params.validate_physics()?;
        Ok(Self { params })
    }
}

impl Technology for GridImport {
    fn name(&self) -> &str {
        GRID
    }

    fn kind(&self) -> TechnologyKind {
        TechnologyKind::Grid
    }

    fn declare_variables(&self, vars: &mut ProblemVariables, horizon: &Horizon) -> VariableSet {
        let import = vars.add_vector(variable().min(0.0), horizon.len());
        VariableSet::new(GRID).with_series(IMPORT, import)
    }

    fn constraints(&self, ctx: &ModelContext) -> Result<ConstraintSet, ConfigurationError> {
        let import = ctx.series(GRID, IMPORT)?;
        let mut set = ConstraintSet::new(GRID);
        for t in ctx.horizon().steps() {
            set.push(constraint!(import[t] <= self.params.max_import_kw));
        }
        Ok(set)
    }

    fn supply(&self, ctx: &ModelContext, t: usize) -> Result<Expression, ConfigurationError> {
        Ok(ctx.series(GRID, IMPORT)?[t].into())
    }

    fn cost(&self, ctx: &ModelContext) -> Result<Expression, ConfigurationError> {
        let import = ctx.series(GRID, IMPORT)?;
        let step_price = self.params.price_per_kwh * ctx.horizon().step_hours();
        Ok(import.iter().map(|&p| p * step_price).sum())
    }

    fn report(
        &self,
        values: &VariableValues,
        horizon: &Horizon,
    ) -> Result<TechnologyReport, ExtractionError> {
        let import = values.series(GRID, IMPORT)?.to_vec();
        let delivered_kwh = import.iter().sum::<f64>() * horizon.step_hours();

        Ok(TechnologyReport::new(horizon)
            .with_column(ReportColumn::new(GRID, "import_kw", import.clone()))
            .with_supply(import)
            .with_ledger(CostLedger::delivered(delivered_kwh, self.params.price_per_kwh)))
    }
}
