use comfy_table::{modifiers, presets, Attribute, Cell, CellAlignment, Color, Table};

use super::extract::SizingReport;
use crate::engine::SweepEntry;

pub fn build_capacity_table(report: &SizingReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Technology", "Units", "Unit kW", "Installed kW"]);
    for capacity in &report.capacities {
        table.add_row(vec![
            Cell::new(&capacity.technology),
            Cell::new(capacity.units).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.0}", capacity.unit_capacity_kw)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.0}", capacity.installed_kw)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_cost_table(report: &SizingReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Technology", "Delivered MWh", "Cost $", "Credit $", "$/MWh"]);
    for summary in &report.technologies {
        let lcoe = summary
            .lcoe_per_kwh
            .map_or_else(|| "-".to_string(), |lcoe| format!("{:.2}", lcoe * 1000.0));
        table.add_row(vec![
            Cell::new(&summary.technology),
            Cell::new(format!("{:.1}", summary.ledger.delivered_kwh / 1000.0))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.0}", summary.ledger.cost)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.0}", summary.ledger.credit)).set_alignment(CellAlignment::Right),
            Cell::new(lcoe).set_alignment(CellAlignment::Right),
        ]);
    }

    let metrics = &report.metrics;
    table.add_row(vec![
        Cell::new("system").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}", metrics.delivered_kwh / 1000.0))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.0}", metrics.total_cost))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.0}", metrics.total_credit))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", metrics.lcoe_per_mwh()))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

/// Horizon total and peak of every hourly quantity
pub fn build_dispatch_table(report: &SizingReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Quantity", "Total", "Peak"]);
    for column in report.table.columns() {
        table.add_row(vec![
            Cell::new(column.header()),
            Cell::new(format!("{:.1}", column.total())).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}", column.peak())).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_sweep_table(entries: &[SweepEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Battery", "Hydrogen", "Outcome", "$/MWh", "Net cost $"]);
    for entry in entries {
        let flag = |on: bool| if on { "yes" } else { "no" };
        let row = match &entry.outcome {
            Ok(outcome) => vec![
                Cell::new("optimal").fg(Color::Green),
                Cell::new(format!("{:.2}", outcome.report.metrics.lcoe_per_mwh()))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.0}", outcome.report.objective_value))
                    .set_alignment(CellAlignment::Right),
            ],
            Err(err) => vec![
                Cell::new(format!("{} failed", err.stage())).fg(Color::Red),
                Cell::new("-").set_alignment(CellAlignment::Right),
                Cell::new("-").set_alignment(CellAlignment::Right),
            ],
        };
        let mut cells = vec![
            Cell::new(flag(entry.selection.battery)),
            Cell::new(flag(entry.selection.hydrogen)),
        ];
        cells.extend(row);
        table.add_row(cells);
    }
    table
}
