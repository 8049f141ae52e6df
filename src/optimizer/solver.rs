//! Solver adapter
//!
//! Hands an assembled [`OptimizationModel`] to one of the good_lp backends and
//! translates the outcome into solver-independent types. The pure-Rust
//! `microlp` backend is the default; `highs` and `cbc` are opt-in features for
//! long horizons.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use good_lp::solvers::{Solver, SolverModel};
use good_lp::{ResolutionError, Solution};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::model::{ModelLayout, OptimizationModel, Problem, VariableRegistry};
use crate::error::{ExtractionError, SolverError};

/// Horizon length above which branch and bound in microlp gets slow
const MICROLP_COMFORT_HOURS: usize = 168;

/// Available solver backends
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SolverKind {
    /// Pure-Rust simplex with branch and bound
    #[default]
    Microlp,
    /// HiGHS (requires the `highs` feature)
    Highs,
    /// COIN-OR CBC (requires the `cbc` feature)
    Cbc,
}

/// Raw termination status reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    Unbounded,
    SolverError,
}

/// Solved values of every registered variable, keyed by owner and name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableValues {
    values: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

impl VariableValues {
    pub fn insert(&mut self, owner: impl Into<String>, name: impl Into<String>, values: Vec<f64>) {
        self.values
            .entry(owner.into())
            .or_default()
            .insert(name.into(), values);
    }

    pub fn with(mut self, owner: impl Into<String>, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(owner, name, values);
        self
    }

    pub fn series(&self, owner: &str, name: &str) -> Result<&[f64], ExtractionError> {
        self.values
            .get(owner)
            .and_then(|named| named.get(name))
            .map(Vec::as_slice)
            .ok_or_else(|| ExtractionError::UndeclaredVariable {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    pub fn scalar(&self, owner: &str, name: &str) -> Result<f64, ExtractionError> {
        self.series(owner, name)?
            .first()
            .copied()
            .ok_or_else(|| ExtractionError::UndeclaredVariable {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    fn read<S: Solution>(registry: &VariableRegistry, solution: &S) -> Self {
        let mut values = Self::default();
        for set in registry.iter() {
            for (name, vars) in set.iter() {
                values.insert(
                    set.owner(),
                    name,
                    vars.iter().map(|&v| solution.value(v)).collect(),
                );
            }
        }
        values
    }
}

/// Outcome of a successful solve
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub status: SolverStatus,
    pub objective_value: f64,
    pub values: VariableValues,
    pub solve_time: Duration,
}

/// A solved model together with the layout needed to interpret it
#[derive(Debug)]
pub struct SolvedModel {
    pub layout: ModelLayout,
    pub result: SolverResult,
}

/// Runs models on the configured backend
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverAdapter {
    kind: SolverKind,
    time_limit: Option<Duration>,
}

impl SolverAdapter {
    pub fn new(kind: SolverKind) -> Self {
        Self {
            kind,
            time_limit: None,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn kind(&self) -> SolverKind {
        self.kind
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Solve `model` on the current thread.
    ///
    /// Any termination other than an optimal solution is returned as
    /// [`SolverError::Terminated`] carrying the raw status.
    pub fn solve(&self, model: OptimizationModel) -> Result<SolvedModel, SolverError> {
        let (problem, layout) = model.into_parts();

        if self.kind == SolverKind::Microlp && layout.horizon().len() > MICROLP_COMFORT_HOURS {
            warn!(
                hours = layout.horizon().len(),
                "microlp received a long horizon; consider the highs or cbc backend"
            );
        }

        info!(
            solver = %self.kind,
            variables = layout.variable_count(),
            constraints = layout.constraint_count(),
            "solving sizing model"
        );

        let started = Instant::now();
        let (objective_value, values) = match self.kind {
            #[cfg(feature = "microlp")]
            SolverKind::Microlp => run_backend(problem, layout.registry(), good_lp::microlp)?,
            #[cfg(feature = "highs")]
            SolverKind::Highs => run_backend(problem, layout.registry(), good_lp::highs)?,
            #[cfg(feature = "cbc")]
            SolverKind::Cbc => run_backend(problem, layout.registry(), good_lp::coin_cbc)?,
            #[allow(unreachable_patterns)]
            other => return Err(SolverError::Unavailable(other)),
        };
        let solve_time = started.elapsed();

        debug!(objective = objective_value, ?solve_time, "solver finished");

        Ok(SolvedModel {
            layout,
            result: SolverResult {
                status: SolverStatus::Optimal,
                objective_value,
                values,
                solve_time,
            },
        })
    }

    /// Solve on the blocking pool, giving up after `limit`.
    ///
    /// The backend cannot be interrupted, so a timed-out solve keeps running
    /// on its worker thread until it returns; its result is discarded.
    pub async fn solve_with_timeout(
        &self,
        model: OptimizationModel,
        limit: Duration,
    ) -> Result<SolvedModel, SolverError> {
        match tokio::time::timeout(limit, self.solve_blocking(model)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?limit, solver = %self.kind, "solver timed out");
                Err(SolverError::TimedOut(limit))
            }
        }
    }

    /// Solve on the blocking pool without a time limit
    pub async fn solve_blocking(&self, model: OptimizationModel) -> Result<SolvedModel, SolverError> {
        let adapter = *self;
        tokio::task::spawn_blocking(move || adapter.solve(model))
            .await
            .map_err(|join_err| SolverError::Task(join_err.to_string()))?
    }
}

fn run_backend<S>(
    problem: Problem,
    registry: &VariableRegistry,
    solver: S,
) -> Result<(f64, VariableValues), SolverError>
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let Problem {
        variables,
        objective,
        constraints,
    } = problem;

    let mut model = variables.minimise(objective.clone()).using(solver);
    for constraint in constraints {
        model = model.with(constraint);
    }

    let solution = model.solve().map_err(terminated)?;
    let objective_value = solution.eval(objective);
    Ok((objective_value, VariableValues::read(registry, &solution)))
}

fn terminated(err: ResolutionError) -> SolverError {
    let status = match &err {
        ResolutionError::Infeasible => SolverStatus::Infeasible,
        ResolutionError::Unbounded => SolverStatus::Unbounded,
        _ => SolverStatus::SolverError,
    };
    SolverError::Terminated {
        status,
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_solver_kind_parsing() {
        assert_eq!(SolverKind::from_str("highs").unwrap(), SolverKind::Highs);
        assert_eq!(SolverKind::from_str("MicroLP").unwrap(), SolverKind::Microlp);
        assert!(SolverKind::from_str("glpk").is_err());
        assert_eq!(SolverKind::Cbc.to_string(), "cbc");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SolverStatus::Infeasible.to_string(), "infeasible");
        assert_eq!(SolverStatus::SolverError.to_string(), "solver_error");
    }

    #[test]
    fn test_resolution_errors_map_to_status() {
        assert_eq!(
            terminated(ResolutionError::Infeasible).status(),
            Some(SolverStatus::Infeasible)
        );
        assert_eq!(
            terminated(ResolutionError::Unbounded).status(),
            Some(SolverStatus::Unbounded)
        );
        assert_eq!(
            terminated(ResolutionError::Str("numerical trouble".to_string())).status(),
            Some(SolverStatus::SolverError)
        );
    }

    #[test]
    fn test_values_lookup() {
        let values = VariableValues::default()
            .with("wind", "units", vec![4.0])
            .with("battery", "soc", vec![1.0, 2.0]);
        assert_eq!(values.scalar("wind", "units").unwrap(), 4.0);
        assert_eq!(values.series("battery", "soc").unwrap(), &[1.0, 2.0]);
        assert!(values.series("hydrogen", "level").is_err());
    }
}
