//! Concurrency-factor sweep: how the observed peak grows with fleet size.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::error::SimError;
use crate::sim::charger::Charger;
use crate::sim::orchestrator::{RunOrchestrator, SimulationInput};
use crate::sim::types::SimConfig;

/// One fleet size in a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcurrencyRow {
    /// Number of chargers simulated.
    pub chargers: usize,
    /// Installed power, `chargers * power_kw`.
    pub theoretical_kw: f64,
    /// Observed fleet-wide peak over the horizon.
    pub actual_kw: f64,
    /// `actual_kw / theoretical_kw`, or 0 with no installed power.
    pub factor: f64,
}

impl ConcurrencyRow {
    fn new(chargers: usize, theoretical_kw: f64, actual_kw: f64) -> Self {
        let factor = if theoretical_kw > 0.0 {
            actual_kw / theoretical_kw
        } else {
            0.0
        };
        Self {
            chargers,
            theoretical_kw,
            actual_kw,
            factor,
        }
    }
}

impl fmt::Display for ConcurrencyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4} chargers | installed {:>9.2} kW | peak {:>9.2} kW | factor {:.3}",
            self.chargers, self.theoretical_kw, self.actual_kw, self.factor
        )
    }
}

/// Runs the full simulation for 1..=`max_chargers` identical chargers rated
/// at `power_kw`, reusing the demand and arrival model of `template`.
///
/// # Errors
///
/// Returns the first `SimError` raised by any run.
pub fn concurrency_sweep(
    config: &SimConfig,
    template: &SimulationInput,
    max_chargers: usize,
    power_kw: f64,
) -> Result<Vec<ConcurrencyRow>, SimError> {
    let orchestrator = RunOrchestrator::new(config.clone());
    let mut input = template.clone();

    (1..=max_chargers)
        .map(|n| {
            input.chargers = vec![Charger::new(power_kw); n];
            let result = orchestrator.run(&input)?;
            let row = ConcurrencyRow::new(n, n as f64 * power_kw, result.total_max_power_kw);
            info!(chargers = n, factor = row.factor, "sweep point finished");
            Ok(row)
        })
        .collect()
}
