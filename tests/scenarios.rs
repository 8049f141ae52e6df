//! End-to-end sizing runs on small, hand-checkable systems.

mod common;

use std::time::Duration;

use approx::assert_relative_eq;
use hybrid_sizing::domain::StorageDynamics;
use hybrid_sizing::optimizer::{SolverStatus, TechnologySelection};
use hybrid_sizing::{ExtractionError, HourlyInputs, SizingError, SolverError};
use rstest::rstest;

use common::*;

fn zero_renewables(hours: usize) -> HourlyInputs {
    constant_demand(50_000.0, hours)
        .with_availability("wind", vec![0.0; hours])
        .with_availability("solar", vec![0.0; hours])
}

#[test]
fn test_minimum_baseload_covers_flat_demand() {
    let mut portfolio = baseload_portfolio(77_000.0, 0.064, 1, 10);
    portfolio.generation.wind.enabled = true;
    portfolio.generation.solar.enabled = true;

    let outcome = engine(portfolio).run(&zero_renewables(24)).unwrap();
    let report = &outcome.report;

    assert_eq!(report.status, SolverStatus::Optimal);
    assert_eq!(report.capacity("baseload").unwrap().units, 1);
    assert_relative_eq!(report.objective_value, 0.064 * 77_000.0 * 24.0, max_relative = 1e-6);
    assert_relative_eq!(report.metrics.lcoe_per_kwh, 0.064, max_relative = 1e-6);

    let supply = report.column("system", "supply_kw").unwrap();
    assert!(supply.iter().all(|&kw| (kw - 77_000.0).abs() < EPS));
}

#[test]
fn test_energy_balance_holds_every_hour() {
    let mut portfolio = baseload_portfolio(1000.0, 0.05, 1, 3);
    portfolio.technologies = TechnologySelection::generation_only().with_battery(true);
    portfolio.battery = small_battery();

    let outcome = engine(portfolio).run(&spiky_demand()).unwrap();
    let table = &outcome.report.table;
    let demand = table.column("system", "demand_kw").unwrap();
    let supply = table.column("system", "supply_kw").unwrap();
    let draw = table.column("system", "draw_kw").unwrap();

    for t in 0..demand.len() {
        assert!(
            supply[t] - draw[t] >= demand[t] - EPS,
            "hour {t}: supply {} - draw {} < demand {}",
            supply[t],
            draw[t],
            demand[t]
        );
    }
}

#[test]
fn test_battery_discharges_only_in_spike_hours() {
    let mut portfolio = baseload_portfolio(1000.0, 0.05, 1, 3);
    portfolio.technologies = TechnologySelection::generation_only().with_battery(true);
    portfolio.battery = small_battery();
    let params = portfolio.battery.clone();

    let outcome = engine(portfolio).run(&spiky_demand()).unwrap();
    let report = &outcome.report;
    assert_eq!(report.capacity("baseload").unwrap().units, 1);

    let discharge = report.column("battery", "discharge_kw").unwrap();
    let charge = report.column("battery", "charge_kw").unwrap();
    let soc = report.column("battery", "soc_kwh").unwrap();

    for (t, &kw) in discharge.iter().enumerate() {
        if t == 10 || t == 11 {
            assert!((kw - 200.0).abs() < EPS, "hour {t}: discharge {kw}");
        } else {
            assert!(kw.abs() < EPS, "hour {t}: unexpected discharge {kw}");
        }
        assert!(kw <= params.max_discharge_kw + EPS);
    }

    assert!((soc[0] - params.initial_soc_kwh).abs() < EPS);
    for &level in soc {
        assert!(level >= params.min_soc_kwh - EPS && level <= params.max_soc_kwh + EPS);
    }

    let simulated = params.simulate(charge, discharge);
    for (t, (&solved, &expected)) in soc.iter().zip(&simulated).enumerate() {
        assert!((solved - expected).abs() < 1e-3, "hour {t}: soc {solved} vs {expected}");
    }

    // The reported cost mirrors the objective
    let metrics = &report.metrics;
    assert_relative_eq!(
        metrics.total_cost - metrics.total_credit,
        report.objective_value,
        max_relative = 1e-6
    );
}

#[test]
fn test_hydrogen_store_drains_monotonically_without_surplus() {
    let mut portfolio = baseload_portfolio(1000.0, 0.05, 1, 1);
    portfolio.technologies = TechnologySelection::generation_only().with_hydrogen(true);
    portfolio.hydrogen = hydrogen_without_credit(2000.0);
    let params = portfolio.hydrogen.clone();

    let outcome = engine(portfolio).run(&constant_demand(2000.0, 24)).unwrap();
    let report = &outcome.report;

    let level = report.column("hydrogen", "level_kg").unwrap();
    let fuel_cell = report.column("hydrogen", "fuel_cell_kw").unwrap();
    let electrolyzer = report.column("hydrogen", "electrolyzer_kw").unwrap();

    assert!((level[0] - 0.5 * params.capacity_kg()).abs() < EPS);
    for pair in level.windows(2) {
        assert!(pair[1] < pair[0], "level rose from {} to {}", pair[0], pair[1]);
    }
    assert!(level.iter().all(|&kg| kg >= params.min_storage_kg() - EPS));
    assert!(fuel_cell.iter().all(|&kw| (kw - 1000.0).abs() < EPS));
    assert!(electrolyzer.iter().all(|&kw| kw.abs() < EPS));
}

#[test]
fn test_hydrogen_store_fills_from_surplus_within_tank_limits() {
    let mut portfolio = baseload_portfolio(1000.0, 0.05, 1, 1);
    portfolio.technologies = TechnologySelection::generation_only().with_hydrogen(true);
    portfolio.hydrogen = small_credited_tank();
    let params = portfolio.hydrogen.clone();

    let outcome = engine(portfolio).run(&constant_demand(200.0, 24)).unwrap();
    let report = &outcome.report;

    let level = report.column("hydrogen", "level_kg").unwrap();
    let electrolyzer = report.column("hydrogen", "electrolyzer_kw").unwrap();
    let produced = report.column("hydrogen", "produced_kg").unwrap();
    let excess = report.column("system", "excess_kw").unwrap();

    assert!((level[0] - 0.5 * params.capacity_kg()).abs() < EPS);
    for (t, &kg) in level.iter().enumerate() {
        assert!(kg <= params.max_storage_kg() + EPS, "hour {t}: level {kg}");
        assert!(
            kg + produced[t] <= params.max_storage_kg() + EPS,
            "hour {t}: production {} overflows level {kg}",
            produced[t]
        );
    }
    for (t, (&kw, &surplus)) in electrolyzer.iter().zip(excess).enumerate() {
        assert!(kw <= surplus + EPS, "hour {t}: electrolyzer {kw} above excess {surplus}");
    }
    assert!(electrolyzer.iter().sum::<f64>() > 0.0);

    let metrics = &report.metrics;
    assert!(metrics.total_credit > 0.0);
    assert_relative_eq!(
        metrics.total_cost - metrics.total_credit,
        report.objective_value,
        epsilon = 1e-6,
        max_relative = 1e-6
    );
}

#[rstest]
#[case::tank_runs_dry(100.0, 2000.0)]
#[case::fuel_cell_undersized(2000.0, 5000.0)]
fn test_unservable_deficit_is_infeasible(#[case] tank_volume_m3: f64, #[case] demand_kw: f64) {
    let mut portfolio = baseload_portfolio(1000.0, 0.05, 1, 1);
    portfolio.technologies = TechnologySelection::generation_only().with_hydrogen(true);
    portfolio.hydrogen = hydrogen_without_credit(tank_volume_m3);

    let err = engine(portfolio)
        .run(&constant_demand(demand_kw, 24))
        .unwrap_err();

    assert_eq!(err.stage(), "solve");
    match err {
        SizingError::Solver(solver_err @ SolverError::Terminated { .. }) => {
            assert_eq!(solver_err.status(), Some(SolverStatus::Infeasible));
        }
        other => panic!("expected an infeasible termination, got {other:?}"),
    }
}

#[test]
fn test_disabled_hydrogen_cannot_be_reported() {
    let portfolio = baseload_portfolio(77_000.0, 0.064, 1, 2);
    let outcome = engine(portfolio).run(&constant_demand(50_000.0, 6)).unwrap();

    assert!(matches!(
        outcome.report.column("hydrogen", "level_kg"),
        Err(ExtractionError::UndeclaredVariable { .. })
    ));
    assert!(outcome.report.capacity("wind").is_none());
}

#[test]
fn test_repeated_runs_are_identical() {
    let mut portfolio = baseload_portfolio(1000.0, 0.05, 1, 3);
    portfolio.technologies = TechnologySelection::generation_only().with_battery(true);
    portfolio.battery = small_battery();
    let engine = engine(portfolio);
    let inputs = spiky_demand();

    let first = engine.run(&inputs).unwrap();
    let second = engine.run(&inputs).unwrap();

    assert_eq!(first.variable_count, second.variable_count);
    assert_eq!(first.constraint_count, second.constraint_count);
    assert_relative_eq!(
        first.report.objective_value,
        second.report.objective_value,
        max_relative = 1e-9
    );
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn test_sweep_storage_never_raises_cost() {
    let portfolio = baseload_portfolio(77_000.0, 0.064, 1, 3);
    let entries = engine(portfolio).sweep(&constant_demand(50_000.0, 24));
    assert_eq!(entries.len(), 4);

    let objective = |battery: bool, hydrogen: bool| {
        entries
            .iter()
            .find(|e| e.selection.battery == battery && e.selection.hydrogen == hydrogen)
            .and_then(|e| e.outcome.as_ref().ok())
            .map(|o| o.report.objective_value)
            .unwrap()
    };

    let baseline = objective(false, false);
    for (battery, hydrogen) in [(true, false), (false, true), (true, true)] {
        assert!(objective(battery, hydrogen) <= baseline + 1e-6);
    }
    assert!(entries.iter().all(|e| !e.selection.grid));
}

#[tokio::test]
async fn test_run_with_timeout_completes_small_model() {
    let portfolio = baseload_portfolio(77_000.0, 0.064, 1, 10);
    let outcome = engine(portfolio)
        .run_with_timeout(&constant_demand(50_000.0, 24), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(outcome.report.capacity("baseload").unwrap().units, 1);
}

#[tokio::test]
async fn test_run_configured_without_limit_matches_run() {
    let engine = engine(baseload_portfolio(77_000.0, 0.064, 1, 10));
    let inputs = constant_demand(50_000.0, 24);
    assert!(engine.solver().time_limit().is_none());

    let background = engine.run_configured(&inputs).await.unwrap();
    let inline = engine.run(&inputs).unwrap();
    assert_relative_eq!(
        background.report.objective_value,
        inline.report.objective_value,
        max_relative = 1e-9
    );
}
