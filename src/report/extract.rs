use serde::Serialize;
use tracing::info;

use super::metrics::{CostLedger, InstalledCapacity, SystemMetrics};
use super::table::{ReportColumn, ReportTable};
use crate::error::ExtractionError;
use crate::optimizer::{ModelLayout, SolverResult, SolverStatus, EXCESS, SYSTEM_OWNER};

/// Economics of one technology over the horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologySummary {
    pub technology: String,
    pub kind: String,
    #[serde(flatten)]
    pub ledger: CostLedger,
    /// Undefined when the technology delivered nothing
    pub lcoe_per_kwh: Option<f64>,
}

/// Everything a sizing run reports
#[derive(Debug, Clone, Serialize)]
pub struct SizingReport {
    pub status: SolverStatus,
    pub objective_value: f64,
    pub hours: usize,
    pub capacities: Vec<InstalledCapacity>,
    pub technologies: Vec<TechnologySummary>,
    pub metrics: SystemMetrics,
    #[serde(skip)]
    pub table: ReportTable,
}

impl SizingReport {
    pub fn capacity(&self, technology: &str) -> Option<&InstalledCapacity> {
        self.capacities.iter().find(|c| c.technology == technology)
    }

    pub fn column(&self, technology: &str, quantity: &str) -> Result<&[f64], ExtractionError> {
        self.table.column(technology, quantity)
    }
}

/// Reads a solved model back into report columns and cost metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultExtractor;

impl ResultExtractor {
    pub fn extract(
        &self,
        layout: &ModelLayout,
        result: &SolverResult,
    ) -> Result<SizingReport, ExtractionError> {
        let horizon = layout.horizon();
        let hours = horizon.len();

        let mut table = ReportTable::new(hours);
        let mut supply_kw = vec![0.0; hours];
        let mut draw_kw = vec![0.0; hours];
        let mut capacities = Vec::new();
        let mut technologies = Vec::new();

        for tech in layout.technologies() {
            let report = tech.report(&result.values, horizon)?;

            for (total, value) in supply_kw.iter_mut().zip(&report.supply_kw) {
                *total += value;
            }
            for (total, value) in draw_kw.iter_mut().zip(&report.draw_kw) {
                *total += value;
            }
            for column in report.columns {
                table.push(column);
            }
            capacities.extend(report.installed);
            technologies.push(TechnologySummary {
                technology: tech.name().to_string(),
                kind: tech.kind().to_string(),
                ledger: report.ledger,
                lcoe_per_kwh: report.ledger.lcoe_per_kwh(),
            });
        }

        let excess_kw = result.values.series(SYSTEM_OWNER, EXCESS)?.to_vec();
        table.push(ReportColumn::new(SYSTEM_OWNER, "demand_kw", layout.demand_kw().to_vec()));
        table.push(ReportColumn::new(SYSTEM_OWNER, "supply_kw", supply_kw));
        table.push(ReportColumn::new(SYSTEM_OWNER, "draw_kw", draw_kw));
        table.push(ReportColumn::new(SYSTEM_OWNER, "excess_kw", excess_kw));

        let metrics = SystemMetrics::from_ledgers(technologies.iter().map(|t| t.ledger))?;

        info!(
            lcoe_per_mwh = metrics.lcoe_per_mwh(),
            delivered_kwh = metrics.delivered_kwh,
            objective = result.objective_value,
            "results extracted"
        );

        Ok(SizingReport {
            status: result.status,
            objective_value: result.objective_value,
            hours,
            capacities,
            technologies,
            metrics,
            table,
        })
    }
}
