//! Solver-independent model representation.
//!
//! Technologies declare their decision variables into a shared
//! [`ProblemVariables`] pool and register them here under an owner name.
//! Constraint generators and the objective then look variables up by
//! `(owner, name)` instead of holding references to each other.

use std::collections::BTreeMap;
use std::fmt;

use good_lp::{Constraint, Expression, ProblemVariables, Variable};

use super::technology::Technology;
use crate::domain::Horizon;
use crate::error::ConfigurationError;

/// Owner name of system-level variables
pub const SYSTEM_OWNER: &str = "system";

/// Name of the per-step excess power variable
pub const EXCESS: &str = "excess";

// ============================================================================
// Variables
// ============================================================================

/// Named decision variables declared by one owner.
///
/// Each name maps to a series of variables: one per time step for dispatch
/// quantities, a single entry for scalar sizing decisions.
#[derive(Debug, Clone)]
pub struct VariableSet {
    owner: String,
    entries: BTreeMap<String, Vec<Variable>>,
}

impl VariableSet {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn with_series(mut self, name: impl Into<String>, variables: Vec<Variable>) -> Self {
        self.entries.insert(name.into(), variables);
        self
    }

    pub fn with_scalar(self, name: impl Into<String>, variable: Variable) -> Self {
        self.with_series(name, vec![variable])
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get(&self, name: &str) -> Option<&[Variable]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Total number of scalar variables in this set
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Variable])> {
        self.entries
            .iter()
            .map(|(name, vars)| (name.as_str(), vars.as_slice()))
    }
}

/// Registry of every declared variable, keyed by owner
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    sets: BTreeMap<String, VariableSet>,
}

impl VariableRegistry {
    /// Register a variable set; owners must be unique within a model
    pub fn insert(&mut self, set: VariableSet) -> Result<(), ConfigurationError> {
        if self.sets.contains_key(set.owner()) {
            return Err(ConfigurationError::invalid(
                set.owner(),
                "name",
                "another technology already declared variables under this name",
            ));
        }
        self.sets.insert(set.owner().to_string(), set);
        Ok(())
    }

    pub fn series(&self, owner: &str, name: &str) -> Result<&[Variable], ConfigurationError> {
        self.sets
            .get(owner)
            .and_then(|set| set.get(name))
            .ok_or_else(|| ConfigurationError::UndeclaredVariable {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    pub fn scalar(&self, owner: &str, name: &str) -> Result<Variable, ConfigurationError> {
        let series = self.series(owner, name)?;
        series
            .first()
            .copied()
            .ok_or_else(|| ConfigurationError::UndeclaredVariable {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    pub fn contains_owner(&self, owner: &str) -> bool {
        self.sets.contains_key(owner)
    }

    /// Number of scalar variables declared by `owner`
    pub fn count_for(&self, owner: &str) -> Option<usize> {
        self.sets.get(owner).map(VariableSet::len)
    }

    pub fn total_count(&self) -> usize {
        self.sets.values().map(VariableSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableSet> {
        self.sets.values()
    }
}

// ============================================================================
// Constraints
// ============================================================================

/// Constraints contributed by one owner
pub struct ConstraintSet {
    owner: String,
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            constraints: Vec::new(),
        }
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
    }
}

impl fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("owner", &self.owner)
            .field("len", &self.constraints.len())
            .finish()
    }
}

// ============================================================================
// Build context
// ============================================================================

/// Read-only view handed to technologies while constraints and the
/// objective are generated
#[derive(Debug)]
pub struct ModelContext {
    horizon: Horizon,
    demand_kw: Vec<f64>,
    registry: VariableRegistry,
    excess: Vec<Variable>,
}

impl ModelContext {
    pub fn new(
        horizon: Horizon,
        demand_kw: Vec<f64>,
        registry: VariableRegistry,
        excess: Vec<Variable>,
    ) -> Self {
        Self {
            horizon,
            demand_kw,
            registry,
            excess,
        }
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn demand_kw(&self, t: usize) -> f64 {
        self.demand_kw[t]
    }

    /// Excess power variable at step `t`
    pub fn excess(&self, t: usize) -> Variable {
        self.excess[t]
    }

    pub fn series(&self, owner: &str, name: &str) -> Result<&[Variable], ConfigurationError> {
        self.registry.series(owner, name)
    }

    pub fn scalar(&self, owner: &str, name: &str) -> Result<Variable, ConfigurationError> {
        self.registry.scalar(owner, name)
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }
}

// ============================================================================
// Assembled model
// ============================================================================

/// Structural description of a built model, kept alongside the solution so
/// results can be interpreted without the solver handles.
#[derive(Debug)]
pub struct ModelLayout {
    horizon: Horizon,
    demand_kw: Vec<f64>,
    technologies: Vec<Box<dyn Technology>>,
    registry: VariableRegistry,
    constraint_counts: BTreeMap<String, usize>,
}

impl ModelLayout {
    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn demand_kw(&self) -> &[f64] {
        &self.demand_kw
    }

    pub fn technologies(&self) -> &[Box<dyn Technology>] {
        &self.technologies
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Names of all owners with declared variables, technologies and system
    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.registry.iter().map(VariableSet::owner)
    }

    pub fn contains(&self, owner: &str) -> bool {
        self.registry.contains_owner(owner)
    }

    pub fn variable_count(&self) -> usize {
        self.registry.total_count()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraint_counts.values().sum()
    }

    pub fn variables_for(&self, owner: &str) -> Option<usize> {
        self.registry.count_for(owner)
    }

    pub fn constraints_for(&self, owner: &str) -> Option<usize> {
        self.constraint_counts.get(owner).copied()
    }
}

/// The variables, objective and constraints of one run, ready for a solver
pub struct OptimizationModel {
    variables: ProblemVariables,
    objective: Expression,
    constraints: Vec<ConstraintSet>,
    layout: ModelLayout,
}

/// Solver-facing parts of an [`OptimizationModel`]
pub(crate) struct Problem {
    pub variables: ProblemVariables,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
}

impl OptimizationModel {
    pub(crate) fn assemble(
        variables: ProblemVariables,
        objective: Expression,
        constraints: Vec<ConstraintSet>,
        context: ModelContext,
        technologies: Vec<Box<dyn Technology>>,
    ) -> Self {
        let mut constraint_counts = BTreeMap::new();
        for set in &constraints {
            *constraint_counts.entry(set.owner().to_string()).or_insert(0) += set.len();
        }

        let ModelContext {
            horizon,
            demand_kw,
            registry,
            ..
        } = context;

        Self {
            variables,
            objective,
            constraints,
            layout: ModelLayout {
                horizon,
                demand_kw,
                technologies,
                registry,
                constraint_counts,
            },
        }
    }

    pub fn layout(&self) -> &ModelLayout {
        &self.layout
    }

    pub(crate) fn into_parts(self) -> (Problem, ModelLayout) {
        let constraints = self
            .constraints
            .into_iter()
            .flat_map(ConstraintSet::into_constraints)
            .collect();
        (
            Problem {
                variables: self.variables,
                objective: self.objective,
                constraints,
            },
            self.layout,
        )
    }
}

impl fmt::Debug for OptimizationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizationModel")
            .field("variables", &self.layout.variable_count())
            .field("constraints", &self.layout.constraint_count())
            .field("layout", &self.layout)
            .finish()
    }
}
