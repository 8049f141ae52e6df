use good_lp::{variable, Expression, ProblemVariables};
use tracing::{debug, info};

use super::constraints::power_balance;
use super::model::{ModelContext, OptimizationModel, VariableRegistry, VariableSet, EXCESS, SYSTEM_OWNER};
use super::technologies;
use crate::config::PortfolioConfig;
use crate::domain::Horizon;
use crate::error::ConfigurationError;
use crate::timeseries::HourlyInputs;

/// Assembles a fresh [`OptimizationModel`] from a portfolio and hourly inputs.
///
/// Every call produces an independent model; nothing is cached between runs.
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    portfolio: &'a PortfolioConfig,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(portfolio: &'a PortfolioConfig) -> Self {
        Self { portfolio }
    }

    pub fn build(&self, inputs: &HourlyInputs) -> Result<OptimizationModel, ConfigurationError> {
        let horizon = Horizon::hourly(inputs.hours())?;
        validate_demand(&inputs.demand_kw)?;

        let technologies = technologies::instantiate(self.portfolio, inputs, &horizon)?;

        let mut vars = ProblemVariables::new();
        let mut registry = VariableRegistry::default();
        for tech in &technologies {
            registry.insert(tech.declare_variables(&mut vars, &horizon))?;
        }
        let excess = vars.add_vector(variable(), horizon.len());
        registry.insert(VariableSet::new(SYSTEM_OWNER).with_series(EXCESS, excess.clone()))?;

        let ctx = ModelContext::new(horizon, inputs.demand_kw.clone(), registry, excess);

        let mut constraint_sets = Vec::with_capacity(technologies.len() + 1);
        for tech in &technologies {
            let set = tech.constraints(&ctx)?;
            debug!(technology = tech.name(), constraints = set.len(), "constraints generated");
            constraint_sets.push(set);
        }
        constraint_sets.push(power_balance(&ctx, &technologies)?);

        let objective = technologies
            .iter()
            .map(|tech| tech.cost(&ctx))
            .sum::<Result<Expression, _>>()?;

        let model = OptimizationModel::assemble(vars, objective, constraint_sets, ctx, technologies);
        info!(
            horizon = %model.layout().horizon(),
            variables = model.layout().variable_count(),
            constraints = model.layout().constraint_count(),
            "model built"
        );
        Ok(model)
    }
}

fn validate_demand(demand_kw: &[f64]) -> Result<(), ConfigurationError> {
    for (index, &value) in demand_kw.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigurationError::InvalidSeries {
                column: "demand".to_string(),
                index,
                value,
                reason: "demand must be finite and non-negative",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::technologies::{BATTERY, GRID, HYDROGEN};
    use crate::optimizer::TechnologySelection;

    fn portfolio(selection: TechnologySelection) -> PortfolioConfig {
        let mut portfolio = PortfolioConfig::baseload_only();
        portfolio.technologies = selection;
        portfolio
    }

    #[test]
    fn test_empty_horizon_fails() {
        let portfolio = portfolio(TechnologySelection::generation_only());
        let err = ModelBuilder::new(&portfolio)
            .build(&HourlyInputs::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyHorizon));
    }

    #[test]
    fn test_negative_demand_fails() {
        let portfolio = portfolio(TechnologySelection::generation_only());
        let err = ModelBuilder::new(&portfolio)
            .build(&HourlyInputs::new(vec![10.0, -1.0]))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidSeries { index: 1, .. }));
    }

    #[test]
    fn test_battery_adds_three_variables_and_eight_constraints_per_step() {
        let inputs = HourlyInputs::new(vec![100.0; 6]);

        let without = portfolio(TechnologySelection::generation_only());
        let base = ModelBuilder::new(&without).build(&inputs).unwrap();

        let with = portfolio(TechnologySelection::generation_only().with_battery(true));
        let model = ModelBuilder::new(&with).build(&inputs).unwrap();

        let layout = model.layout();
        assert_eq!(layout.variables_for(BATTERY), Some(18));
        assert_eq!(layout.constraints_for(BATTERY), Some(48));
        assert_eq!(layout.variable_count(), base.layout().variable_count() + 18);
        assert_eq!(layout.constraint_count(), base.layout().constraint_count() + 48);

        assert!(!base.layout().contains(BATTERY));
        assert_eq!(base.layout().constraints_for(BATTERY), None);
    }

    #[test]
    fn test_disabled_technologies_are_absent() {
        let inputs = HourlyInputs::new(vec![100.0; 3]);
        let portfolio = portfolio(TechnologySelection::generation_only());
        let model = ModelBuilder::new(&portfolio).build(&inputs).unwrap();
        let owners: Vec<&str> = model.layout().owners().collect();

        assert_eq!(owners, vec!["baseload", "system"]);
        for absent in [GRID, BATTERY, HYDROGEN] {
            assert!(!model.layout().contains(absent));
        }
    }

    #[test]
    fn test_missing_availability_series() {
        let mut portfolio = portfolio(TechnologySelection::generation_only());
        portfolio.generation.wind.enabled = true;

        let err = ModelBuilder::new(&portfolio)
            .build(&HourlyInputs::new(vec![100.0; 3]))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingSeries { .. }));
    }

    #[test]
    fn test_short_availability_series() {
        let mut portfolio = portfolio(TechnologySelection::generation_only());
        portfolio.generation.wind.enabled = true;
        let inputs = HourlyInputs::new(vec![100.0; 3]).with_availability("wind", vec![0.5; 2]);

        let err = ModelBuilder::new(&portfolio).build(&inputs).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::SeriesLength {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }
}
