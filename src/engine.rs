//! Sizing pipeline: build, solve, extract.
//!
//! Each run builds a fresh model from the portfolio and the inputs, so runs
//! never share solver state. Sweeps repeat the pipeline over technology
//! combinations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use itertools::iproduct;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{Config, PortfolioConfig};
use crate::error::SizingError;
use crate::optimizer::{ModelBuilder, SolvedModel, SolverAdapter, SolverKind, TechnologySelection};
use crate::report::{ResultExtractor, SizingReport};
use crate::timeseries::HourlyInputs;

/// Result of one sizing run with its metadata
#[derive(Debug, Clone, Serialize)]
pub struct SizingOutcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub solver: SolverKind,
    pub selection: TechnologySelection,
    pub variable_count: usize,
    pub constraint_count: usize,
    pub solve_seconds: f64,
    pub report: SizingReport,
}

/// One technology combination of a sweep
#[derive(Debug)]
pub struct SweepEntry {
    pub selection: TechnologySelection,
    pub outcome: Result<SizingOutcome, SizingError>,
}

#[derive(Debug, Clone)]
pub struct SizingEngine {
    portfolio: PortfolioConfig,
    solver: SolverAdapter,
    extractor: ResultExtractor,
}

impl SizingEngine {
    pub fn new(portfolio: PortfolioConfig, solver: SolverAdapter) -> Self {
        Self {
            portfolio,
            solver,
            extractor: ResultExtractor,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.portfolio.clone(), config.solver.adapter())
    }

    pub fn portfolio(&self) -> &PortfolioConfig {
        &self.portfolio
    }

    pub fn solver(&self) -> &SolverAdapter {
        &self.solver
    }

    /// Same engine with a different technology selection
    pub fn with_selection(&self, selection: TechnologySelection) -> Self {
        Self {
            portfolio: self.portfolio.clone().with_selection(selection),
            ..self.clone()
        }
    }

    /// Build, solve and extract on the current thread
    pub fn run(&self, inputs: &HourlyInputs) -> Result<SizingOutcome, SizingError> {
        let started_at = Utc::now();
        let model = ModelBuilder::new(&self.portfolio).build(inputs)?;
        let solved = self.solver.solve(model)?;
        self.finish(started_at, solved)
    }

    /// Like [`run`](Self::run), but the solve is abandoned after `limit`
    pub async fn run_with_timeout(
        &self,
        inputs: &HourlyInputs,
        limit: Duration,
    ) -> Result<SizingOutcome, SizingError> {
        let started_at = Utc::now();
        let model = ModelBuilder::new(&self.portfolio).build(inputs)?;
        let solved = self.solver.solve_with_timeout(model, limit).await?;
        self.finish(started_at, solved)
    }

    /// Run on the blocking pool with the solver's configured time limit, if it
    /// has one
    pub async fn run_configured(&self, inputs: &HourlyInputs) -> Result<SizingOutcome, SizingError> {
        let Some(limit) = self.solver.time_limit() else {
            let started_at = Utc::now();
            let model = ModelBuilder::new(&self.portfolio).build(inputs)?;
            let solved = self.solver.solve_blocking(model).await?;
            return self.finish(started_at, solved);
        };
        self.run_with_timeout(inputs, limit).await
    }

    /// Run every combination of battery and hydrogen on top of the configured
    /// grid and generation; failed cases are reported, not fatal
    pub fn sweep(&self, inputs: &HourlyInputs) -> Vec<SweepEntry> {
        let base = self.portfolio.technologies;
        iproduct!([false, true], [false, true])
            .map(|(battery, hydrogen)| {
                let selection = base.with_battery(battery).with_hydrogen(hydrogen);
                let outcome = self.with_selection(selection).run(inputs);
                if let Err(err) = &outcome {
                    warn!(%selection, stage = err.stage(), error = %err, "sweep case failed");
                }
                SweepEntry { selection, outcome }
            })
            .collect()
    }

    fn finish(
        &self,
        started_at: DateTime<Utc>,
        solved: SolvedModel,
    ) -> Result<SizingOutcome, SizingError> {
        let SolvedModel { layout, result } = solved;
        let report = self.extractor.extract(&layout, &result)?;

        let outcome = SizingOutcome {
            run_id: Uuid::new_v4(),
            started_at,
            solver: self.solver.kind(),
            selection: self.portfolio.technologies,
            variable_count: layout.variable_count(),
            constraint_count: layout.constraint_count(),
            solve_seconds: result.solve_time.as_secs_f64(),
            report,
        };

        info!(
            run_id = %outcome.run_id,
            selection = %outcome.selection,
            lcoe_per_mwh = outcome.report.metrics.lcoe_per_mwh(),
            "sizing run complete"
        );
        Ok(outcome)
    }
}
