use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::error::ExtractionError;

/// Energy and money attributed to one technology over the horizon
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostLedger {
    /// Energy delivered to the bus (kWh)
    pub delivered_kwh: f64,
    /// Cost of the delivered energy ($)
    pub cost: f64,
    /// Revenue credited against the cost, e.g. sold hydrogen ($)
    pub credit: f64,
    /// Byproduct mass produced (kg)
    pub byproduct_kg: f64,
}

impl CostLedger {
    pub fn delivered(delivered_kwh: f64, cost_per_kwh: f64) -> Self {
        Self {
            delivered_kwh,
            cost: delivered_kwh * cost_per_kwh,
            ..Self::default()
        }
    }

    pub fn net_cost(&self) -> f64 {
        self.cost - self.credit
    }

    /// Cost per delivered kWh, when anything was delivered
    pub fn lcoe_per_kwh(&self) -> Option<f64> {
        (self.delivered_kwh > 0.0).then(|| self.cost / self.delivered_kwh)
    }
}

impl Add for CostLedger {
    type Output = CostLedger;

    fn add(self, rhs: CostLedger) -> CostLedger {
        CostLedger {
            delivered_kwh: self.delivered_kwh + rhs.delivered_kwh,
            cost: self.cost + rhs.cost,
            credit: self.credit + rhs.credit,
            byproduct_kg: self.byproduct_kg + rhs.byproduct_kg,
        }
    }
}

impl AddAssign for CostLedger {
    fn add_assign(&mut self, rhs: CostLedger) {
        *self = *self + rhs;
    }
}

impl Sum for CostLedger {
    fn sum<I: Iterator<Item = CostLedger>>(iter: I) -> Self {
        iter.fold(CostLedger::default(), Add::add)
    }
}

/// Chosen unit count of a sized technology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstalledCapacity {
    pub technology: String,
    pub units: u32,
    pub unit_capacity_kw: f64,
    pub installed_kw: f64,
}

impl InstalledCapacity {
    pub fn new(technology: impl Into<String>, units: u32, unit_capacity_kw: f64) -> Self {
        Self {
            technology: technology.into(),
            units,
            unit_capacity_kw,
            installed_kw: f64::from(units) * unit_capacity_kw,
        }
    }
}

/// System-wide economics of a solved run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemMetrics {
    pub delivered_kwh: f64,
    pub total_cost: f64,
    pub total_credit: f64,
    pub byproduct_kg: f64,
    /// Net cost (cost minus credits) per delivered kWh
    pub lcoe_per_kwh: f64,
    pub lcoe_without_credit_per_kwh: f64,
}

impl SystemMetrics {
    pub fn from_ledgers(ledgers: impl IntoIterator<Item = CostLedger>) -> Result<Self, ExtractionError> {
        let total: CostLedger = ledgers.into_iter().sum();
        if total.delivered_kwh <= 0.0 {
            return Err(ExtractionError::NoDeliveredEnergy);
        }

        Ok(Self {
            delivered_kwh: total.delivered_kwh,
            total_cost: total.cost,
            total_credit: total.credit,
            byproduct_kg: total.byproduct_kg,
            lcoe_per_kwh: total.net_cost() / total.delivered_kwh,
            lcoe_without_credit_per_kwh: total.cost / total.delivered_kwh,
        })
    }

    pub fn lcoe_per_mwh(&self) -> f64 {
        self.lcoe_per_kwh * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_system_lcoe_nets_out_credit() {
        let smr = CostLedger::delivered(1000.0, 0.064);
        let hydrogen = CostLedger {
            delivered_kwh: 100.0,
            cost: 20.0,
            credit: 16.0,
            byproduct_kg: 2.0,
        };

        let metrics = SystemMetrics::from_ledgers([smr, hydrogen]).unwrap();
        assert_relative_eq!(metrics.delivered_kwh, 1100.0);
        assert_relative_eq!(metrics.total_cost, 84.0);
        assert_relative_eq!(metrics.lcoe_per_kwh, 68.0 / 1100.0);
        assert_relative_eq!(metrics.lcoe_without_credit_per_kwh, 84.0 / 1100.0);
        assert_relative_eq!(metrics.byproduct_kg, 2.0);
    }

    #[test]
    fn test_no_delivered_energy() {
        assert!(matches!(
            SystemMetrics::from_ledgers(Vec::new()),
            Err(ExtractionError::NoDeliveredEnergy)
        ));
    }

    #[test]
    fn test_installed_capacity() {
        let installed = InstalledCapacity::new("wind", 12, 2000.0);
        assert_eq!(installed.installed_kw, 24_000.0);
        assert_eq!(CostLedger::default().lcoe_per_kwh(), None);
    }
}
