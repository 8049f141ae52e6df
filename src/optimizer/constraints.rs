use good_lp::{constraint, Expression};

use super::model::{ConstraintSet, ModelContext, SYSTEM_OWNER};
use super::technology::Technology;
use crate::error::ConfigurationError;

/// System-level constraints, two per step.
///
/// `excess[t]` is defined as everything delivered to the bus minus demand.
/// Everything drawn from the bus (battery charging, electrolysis) must fit in
/// that excess, so demand is always met in full.
pub fn power_balance(
    ctx: &ModelContext,
    technologies: &[Box<dyn Technology>],
) -> Result<ConstraintSet, ConfigurationError> {
    let mut set = ConstraintSet::new(SYSTEM_OWNER);

    for t in ctx.horizon().steps() {
        let supply = technologies
            .iter()
            .map(|tech| tech.supply(ctx, t))
            .sum::<Result<Expression, _>>()?;
        let draw = technologies
            .iter()
            .map(|tech| tech.draw(ctx, t))
            .sum::<Result<Expression, _>>()?;
        let excess = ctx.excess(t);

        set.push(constraint!(excess == supply - ctx.demand_kw(t)));
        set.push(constraint!(draw <= excess));
    }

    Ok(set)
}
