//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use ev_fleet_sim::config::ScenarioConfig;
use ev_fleet_sim::sim::charger::Charger;
use ev_fleet_sim::sim::orchestrator::SimulationInput;
use ev_fleet_sim::sim::random::{DemandTable, HOURS_PER_DAY};
use ev_fleet_sim::sim::types::{DayBoundary, SimConfig};

/// Quarter-hour ticks, shared seed 1, legacy day boundary.
pub fn config(days: usize, workers: usize, boundary: DayBoundary) -> SimConfig {
    SimConfig::new(15, days, workers, 1).with_day_boundary(boundary)
}

/// Chargers that always receive a vehicle wanting 12.5 kWh.
///
/// A 12.5 kW charger delivers 3.125 kWh per quarter hour, so each vehicle
/// takes exactly four ticks and the next one plugs in on the fifth.
pub fn always_busy_input(chargers: usize, power_kw: f64) -> SimulationInput {
    SimulationInput {
        chargers: vec![Charger::new(power_kw); chargers],
        demand: DemandTable::from([(100, 1.0)]),
        arrival: vec![1.0; HOURS_PER_DAY],
        ev_consumption: 12.5,
    }
}

/// The baseline preset's arrival and demand model with `chargers` 11 kW chargers.
pub fn reference_input(chargers: usize) -> SimulationInput {
    let (_, mut input) = ScenarioConfig::baseline()
        .prepare()
        .expect("baseline preset should prepare");
    input.chargers = vec![Charger::new(11.0); chargers];
    input
}
