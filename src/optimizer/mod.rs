//! Sizing and dispatch model: variables, constraints, objective and solve.

pub mod builder;
pub mod constraints;
pub mod model;
pub mod solver;
pub mod technologies;
pub mod technology;
pub mod types;

pub use builder::ModelBuilder;
pub use model::{
    ConstraintSet, ModelContext, ModelLayout, OptimizationModel, VariableRegistry, VariableSet,
    EXCESS, SYSTEM_OWNER,
};
pub use solver::{SolvedModel, SolverAdapter, SolverKind, SolverResult, SolverStatus, VariableValues};
pub use technology::{Technology, TechnologyKind, TechnologyReport};
pub use types::TechnologySelection;
