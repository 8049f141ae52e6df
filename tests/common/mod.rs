#![allow(dead_code)]

use hybrid_sizing::domain::{BatteryParams, HydrogenParams};
use hybrid_sizing::optimizer::{SolverAdapter, TechnologySelection};
use hybrid_sizing::{HourlyInputs, PortfolioConfig, SizingEngine};

/// Absolute tolerance for solved values
pub const EPS: f64 = 1e-4;

/// Portfolio with a single baseload unit type and nothing else enabled
pub fn baseload_portfolio(capacity_kw: f64, lcoe_per_kwh: f64, min_units: u32, max_units: u32) -> PortfolioConfig {
    let mut portfolio =
        PortfolioConfig::baseload_only().with_selection(TechnologySelection::generation_only());
    let baseload = &mut portfolio.generation.baseload;
    baseload.capacity_kw = capacity_kw;
    baseload.lcoe_per_kwh = lcoe_per_kwh;
    baseload.min_units = min_units;
    baseload.max_units = max_units;
    portfolio
}

pub fn engine(portfolio: PortfolioConfig) -> SizingEngine {
    SizingEngine::new(portfolio, SolverAdapter::default())
}

pub fn constant_demand(kw: f64, hours: usize) -> HourlyInputs {
    HourlyInputs::new(vec![kw; hours])
}

/// 800 kW all day with 1200 kW spikes at hours 10 and 11
pub fn spiky_demand() -> HourlyInputs {
    let demand = (0..24)
        .map(|h| if h == 10 || h == 11 { 1200.0 } else { 800.0 })
        .collect();
    HourlyInputs::new(demand)
}

pub fn small_battery() -> BatteryParams {
    BatteryParams {
        min_soc_kwh: 0.0,
        max_soc_kwh: 1000.0,
        initial_soc_kwh: 500.0,
        max_charge_kw: 300.0,
        max_discharge_kw: 300.0,
        efficiency: 0.95,
        lcoe_per_kwh: 0.01,
    }
}

/// Hydrogen loop with a tank of `tank_volume_m3` at 30 bar, half full, no credit
pub fn hydrogen_without_credit(tank_volume_m3: f64) -> HydrogenParams {
    HydrogenParams {
        tank_volume_m3,
        initial_fill_fraction: 0.5,
        min_fill_fraction: 0.0,
        hydrogen_credit_per_kg: 0.0,
        ..HydrogenParams::default()
    }
}

/// Hydrogen loop with a 20 m3 tank (about 49 kg) and the default credit
pub fn small_credited_tank() -> HydrogenParams {
    HydrogenParams {
        tank_volume_m3: 20.0,
        initial_fill_fraction: 0.5,
        min_fill_fraction: 0.0,
        ..HydrogenParams::default()
    }
}
