use std::fmt;

use good_lp::{Expression, ProblemVariables};

use super::model::{ConstraintSet, ModelContext, VariableSet};
use super::solver::VariableValues;
use crate::domain::Horizon;
use crate::error::{ConfigurationError, ExtractionError};
use crate::report::{CostLedger, InstalledCapacity, ReportColumn};

/// Role a technology plays in the power balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TechnologyKind {
    Generation,
    Grid,
    Storage,
}

/// A supply or storage technology that contributes to the model.
///
/// Every technology owns its variables, its constraints, its share of the
/// objective and the interpretation of its solved values. The builder only
/// iterates over enabled technologies; it never inspects a concrete type.
pub trait Technology: fmt::Debug + Send + Sync {
    /// Owner name of this technology's variables
    fn name(&self) -> &str;

    fn kind(&self) -> TechnologyKind;

    /// Declare decision variables over `horizon`
    fn declare_variables(&self, vars: &mut ProblemVariables, horizon: &Horizon) -> VariableSet;

    /// Operating limits and state transitions of this technology
    fn constraints(&self, ctx: &ModelContext) -> Result<ConstraintSet, ConfigurationError>;

    /// Power delivered to the bus at step `t` (kW)
    fn supply(&self, ctx: &ModelContext, t: usize) -> Result<Expression, ConfigurationError>;

    /// Power drawn from the bus at step `t` (kW)
    fn draw(&self, _ctx: &ModelContext, _t: usize) -> Result<Expression, ConfigurationError> {
        Ok(Expression::default())
    }

    /// Contribution to the minimized objective over the whole horizon
    fn cost(&self, ctx: &ModelContext) -> Result<Expression, ConfigurationError>;

    /// Interpret solved values as report columns and a cost ledger
    fn report(
        &self,
        values: &VariableValues,
        horizon: &Horizon,
    ) -> Result<TechnologyReport, ExtractionError>;
}

/// Post-solve view of one technology
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyReport {
    pub columns: Vec<ReportColumn>,
    /// Power delivered to the bus per step (kW)
    pub supply_kw: Vec<f64>,
    /// Power drawn from the bus per step (kW)
    pub draw_kw: Vec<f64>,
    pub ledger: CostLedger,
    /// Sizing decision, for technologies with one
    pub installed: Option<InstalledCapacity>,
}

impl TechnologyReport {
    pub fn new(horizon: &Horizon) -> Self {
        Self {
            columns: Vec::new(),
            supply_kw: vec![0.0; horizon.len()],
            draw_kw: vec![0.0; horizon.len()],
            ledger: CostLedger::default(),
            installed: None,
        }
    }

    pub fn with_column(mut self, column: ReportColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_supply(mut self, supply_kw: Vec<f64>) -> Self {
        self.supply_kw = supply_kw;
        self
    }

    pub fn with_draw(mut self, draw_kw: Vec<f64>) -> Self {
        self.draw_kw = draw_kw;
        self
    }

    pub fn with_ledger(mut self, ledger: CostLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_installed(mut self, installed: InstalledCapacity) -> Self {
        self.installed = Some(installed);
        self
    }
}
