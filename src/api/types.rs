//! API request, response, and registry types.
//!
//! Field names are camelCase to match the JSON result export.

use serde::{Deserialize, Serialize};

use crate::config::{
    ChargerGroupConfig, ScenarioConfig, SimulationConfig, VehicleConfig, default_demand,
};
use crate::sim::types::{DaySummary, GlobalResult};

/// A batch of identical chargers in a run request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChargerRequest {
    /// Free-form label.
    pub id: String,
    /// Number of chargers in the batch.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Rated power of each charger (kW).
    pub power: f64,
}

fn default_count() -> usize {
    1
}

/// Body of `POST /simulations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunRequest {
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Charger batches, expanded in order.
    pub chargers: Vec<ChargerRequest>,
    /// Arrival probability per hour of day, in percent (24 values).
    pub arrival_probabilities: Vec<f64>,
    /// Energy per 100 demand units (kWh).
    pub energy_consumption: f64,
}

impl RunRequest {
    /// Builds a scenario from the request, taking timing from `simulation`
    /// and the reference demand table.
    pub fn to_scenario(&self, simulation: &SimulationConfig) -> ScenarioConfig {
        ScenarioConfig {
            simulation: simulation.clone(),
            vehicles: VehicleConfig {
                ev_consumption: self.energy_consumption,
                arrival_pct: self.arrival_probabilities.clone(),
            },
            chargers: self
                .chargers
                .iter()
                .map(|c| ChargerGroupConfig::new(c.id.clone(), c.count, c.power))
                .collect(),
            demand: default_demand(),
        }
    }
}

/// Terminal state of a recorded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// A run held in the in-memory registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub id: u64,
    pub name: Option<String>,
    pub status: RunStatus,
    /// Failure reason when `status` is `FAILED`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub chargers: Vec<ChargerRequest>,
    pub arrival_probabilities: Vec<f64>,
    pub energy_consumption: f64,
    /// Compensated total over every reported day (kWh).
    pub total_consumed_energy: f64,
    pub total_max_power_kw: f64,
    /// Day summaries, empty for failed runs.
    pub results: Vec<DaySummary>,
}

impl SimulationRun {
    /// Records a finished simulation.
    pub fn completed(id: u64, request: RunRequest, result: GlobalResult) -> Self {
        Self {
            id,
            name: request.name,
            status: RunStatus::Completed,
            error: None,
            chargers: request.chargers,
            arrival_probabilities: request.arrival_probabilities,
            energy_consumption: request.energy_consumption,
            total_consumed_energy: result.total_energy_consumed,
            total_max_power_kw: result.total_max_power_kw,
            results: result.days,
        }
    }

    /// Records a simulation that aborted after validation passed.
    pub fn failed(id: u64, request: RunRequest, error: String) -> Self {
        Self {
            id,
            name: request.name,
            status: RunStatus::Failed,
            error: Some(error),
            chargers: request.chargers,
            arrival_probabilities: request.arrival_probabilities,
            energy_consumption: request.energy_consumption,
            total_consumed_energy: 0.0,
            total_max_power_kw: 0.0,
            results: Vec::new(),
        }
    }
}

/// List entry for `GET /simulations`: a run without its day summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub id: u64,
    pub name: Option<String>,
    pub status: RunStatus,
    pub chargers: usize,
    pub total_consumed_energy: f64,
    pub total_max_power_kw: f64,
}

impl From<&SimulationRun> for RunSummary {
    fn from(run: &SimulationRun) -> Self {
        Self {
            id: run.id,
            name: run.name.clone(),
            status: run.status,
            chargers: run.chargers.iter().map(|c| c.count).sum(),
            total_consumed_energy: run.total_consumed_energy,
            total_max_power_kw: run.total_max_power_kw,
        }
    }
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
