//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimError;
use crate::sim::charger::Charger;
use crate::sim::orchestrator::SimulationInput;
use crate::sim::random::{DemandTable, HOURS_PER_DAY};
use crate::sim::types::{
    DEFAULT_DAYS, DEFAULT_SEED, DEFAULT_TICK_MINUTES, DEFAULT_WORKERS, DayBoundary, SeedStrategy,
    SimConfig,
};

/// Reference hourly arrival probabilities (percent), midnight first.
pub const REFERENCE_ARRIVAL_PCT: [f64; HOURS_PER_DAY] = [
    0.94, 0.94, 0.94, 0.94, 0.94, 0.94, 0.94, 0.94, 2.83, 2.83, 5.66, 5.66, 5.66, 7.55, 7.55,
    7.55, 10.38, 10.38, 10.38, 4.72, 4.72, 4.72, 0.94, 0.94,
];

/// Reference charging demand (km to recharge, probability percent).
pub const REFERENCE_DEMAND_PCT: [(u32, f64); 9] = [
    (0, 34.31),
    (5, 4.90),
    (10, 9.80),
    (20, 11.76),
    (30, 8.82),
    (50, 11.76),
    (100, 10.78),
    (200, 4.90),
    (300, 2.94),
];

/// Upper bound on chargers in one group and in the whole fleet.
pub const MAX_CHARGERS: usize = 100_000;

/// Reference vehicle consumption (kWh per 100 km).
pub const REFERENCE_EV_CONSUMPTION: f64 = 18.0;

/// Top-level scenario configuration parsed from TOML.
///
/// Every section has defaults matching the baseline scenario. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or start from
/// [`ScenarioConfig::baseline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Timing, parallelism, and seeding.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Vehicle behaviour: consumption and hourly arrivals.
    #[serde(default)]
    pub vehicles: VehicleConfig,
    /// Charger groups, expanded in order into the fleet.
    #[serde(default = "default_chargers")]
    pub chargers: Vec<ChargerGroupConfig>,
    /// Discrete charging-demand distribution.
    #[serde(default = "default_demand")]
    pub demand: Vec<DemandConfig>,
}

/// Timing, parallelism, and seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Tick duration in minutes (must divide 60).
    pub tick_minutes: u32,
    /// Days to simulate (must be > 0).
    pub days: usize,
    /// Parallel charger groups (must be > 0).
    pub workers: usize,
    /// Master random seed.
    pub seed: u64,
    /// `"shared"` or `"per_group"`.
    pub seed_strategy: SeedStrategy,
    /// `"legacy"` or `"calendar"`.
    pub day_boundary: DayBoundary,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_minutes: DEFAULT_TICK_MINUTES,
            days: DEFAULT_DAYS,
            workers: DEFAULT_WORKERS,
            seed: DEFAULT_SEED,
            seed_strategy: SeedStrategy::default(),
            day_boundary: DayBoundary::default(),
        }
    }
}

/// Vehicle behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleConfig {
    /// Energy per 100 demand units, e.g. kWh per 100 km (must be > 0).
    pub ev_consumption: f64,
    /// Arrival probability per hour of day, in percent (exactly 24 values).
    pub arrival_pct: Vec<f64>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            ev_consumption: REFERENCE_EV_CONSUMPTION,
            arrival_pct: REFERENCE_ARRIVAL_PCT.to_vec(),
        }
    }
}

/// A batch of identical chargers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChargerGroupConfig {
    /// Free-form label.
    pub id: String,
    /// Number of chargers in the batch.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Rated power of each charger (kW).
    pub power_kw: f64,
}

impl ChargerGroupConfig {
    /// Creates a batch of `count` chargers rated at `power_kw`.
    pub fn new(id: impl Into<String>, count: usize, power_kw: f64) -> Self {
        Self {
            id: id.into(),
            count,
            power_kw,
        }
    }
}

/// One outcome of the charging-demand distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandConfig {
    /// Demand magnitude, e.g. km to recharge.
    pub magnitude: u32,
    /// Probability in percent. Weights are normalized, so they need not sum to 100.
    pub probability_pct: f64,
}

fn default_count() -> usize {
    1
}

fn default_chargers() -> Vec<ChargerGroupConfig> {
    vec![ChargerGroupConfig::new("ac-11", 10, 11.0)]
}

/// The reference demand table as configuration entries.
pub fn default_demand() -> Vec<DemandConfig> {
    REFERENCE_DEMAND_PCT
        .iter()
        .map(|&(magnitude, probability_pct)| DemandConfig {
            magnitude,
            probability_pct,
        })
        .collect()
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.tick_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    /// Creates an error for the dotted `field` path.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Ten 11 kW AC chargers with the reference arrival and demand tables.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            vehicles: VehicleConfig::default(),
            chargers: default_chargers(),
            demand: default_demand(),
        }
    }

    /// Mixed AC/DC depot with heavier evening arrivals and longer trips.
    pub fn depot() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            vehicles: VehicleConfig {
                ev_consumption: 20.0,
                arrival_pct: vec![
                    0.5, 0.5, 0.5, 0.5, 0.5, 1.0, 2.0, 4.0, 6.0, 5.0, 4.0, 4.0, 5.0, 5.0, 4.0,
                    5.0, 8.0, 12.0, 14.0, 12.0, 8.0, 4.0, 2.0, 1.0,
                ],
            },
            chargers: vec![
                ChargerGroupConfig::new("ac-22", 6, 22.0),
                ChargerGroupConfig::new("dc-50", 4, 50.0),
                ChargerGroupConfig::new("dc-150", 2, 150.0),
            ],
            demand: vec![
                DemandConfig {
                    magnitude: 20,
                    probability_pct: 15.0,
                },
                DemandConfig {
                    magnitude: 50,
                    probability_pct: 25.0,
                },
                DemandConfig {
                    magnitude: 100,
                    probability_pct: 30.0,
                },
                DemandConfig {
                    magnitude: 200,
                    probability_pct: 20.0,
                },
                DemandConfig {
                    magnitude: 350,
                    probability_pct: 10.0,
                },
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "depot"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "depot" => Ok(Self::depot()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.tick_minutes == 0 || 60 % s.tick_minutes != 0 {
            errors.push(ConfigError::new(
                "simulation.tick_minutes",
                format!("must be > 0 and divide 60, got {}", s.tick_minutes),
            ));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if s.workers == 0 {
            errors.push(ConfigError::new("simulation.workers", "must be > 0"));
        }

        let v = &self.vehicles;
        if !(v.ev_consumption.is_finite() && v.ev_consumption > 0.0) {
            errors.push(ConfigError::new(
                "vehicles.ev_consumption",
                "must be finite and > 0",
            ));
        }
        if v.arrival_pct.len() != HOURS_PER_DAY {
            errors.push(ConfigError::new(
                "vehicles.arrival_pct",
                format!(
                    "must contain exactly {HOURS_PER_DAY} values, got {}",
                    v.arrival_pct.len()
                ),
            ));
        }
        for (hour, pct) in v.arrival_pct.iter().enumerate() {
            if !(0.0..=100.0).contains(pct) {
                errors.push(ConfigError::new(
                    format!("vehicles.arrival_pct[{hour}]"),
                    format!("must be in [0, 100], got {pct}"),
                ));
            }
        }

        for (i, group) in self.chargers.iter().enumerate() {
            if !(group.power_kw.is_finite() && group.power_kw >= 0.0) {
                errors.push(ConfigError::new(
                    format!("chargers[{i}].power_kw"),
                    format!("must be finite and >= 0, got {}", group.power_kw),
                ));
            }
            if group.count > MAX_CHARGERS {
                errors.push(ConfigError::new(
                    format!("chargers[{i}].count"),
                    format!("must be <= {MAX_CHARGERS}, got {}", group.count),
                ));
            }
        }
        if self.charger_count() > MAX_CHARGERS {
            errors.push(ConfigError::new(
                "chargers",
                format!(
                    "fleet must hold <= {MAX_CHARGERS} chargers, got {}",
                    self.charger_count()
                ),
            ));
        }

        if self.demand.is_empty() {
            errors.push(ConfigError::new("demand", "must not be empty"));
        }
        let mut seen = HashSet::new();
        for (i, d) in self.demand.iter().enumerate() {
            if !(d.probability_pct.is_finite() && d.probability_pct >= 0.0) {
                errors.push(ConfigError::new(
                    format!("demand[{i}].probability_pct"),
                    format!("must be finite and >= 0, got {}", d.probability_pct),
                ));
            }
            if !seen.insert(d.magnitude) {
                errors.push(ConfigError::new(
                    format!("demand[{i}].magnitude"),
                    format!("duplicate magnitude {}", d.magnitude),
                ));
            }
        }
        if !self.demand.is_empty() && self.demand.iter().all(|d| d.probability_pct <= 0.0) {
            errors.push(ConfigError::new(
                "demand",
                "at least one probability must be > 0",
            ));
        }

        errors
    }

    /// Total number of chargers after expanding every group.
    pub fn charger_count(&self) -> usize {
        self.chargers
            .iter()
            .fold(0, |total: usize, g| total.saturating_add(g.count))
    }

    /// Validates the scenario and converts it into the simulation's inputs.
    ///
    /// Percentages become probabilities and charger groups are expanded in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` listing every validation failure.
    pub fn prepare(&self) -> Result<(SimConfig, SimulationInput), SimError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SimError::InvalidConfig(errors));
        }

        let s = &self.simulation;
        let config = SimConfig::new(s.tick_minutes, s.days, s.workers, s.seed)
            .with_seed_strategy(s.seed_strategy)
            .with_day_boundary(s.day_boundary);

        let chargers = self
            .chargers
            .iter()
            .flat_map(|g| std::iter::repeat_n(Charger::new(g.power_kw), g.count))
            .collect();
        let demand: DemandTable = self
            .demand
            .iter()
            .map(|d| (d.magnitude, d.probability_pct / 100.0))
            .collect();
        let arrival = self.vehicles.arrival_pct.iter().map(|p| p / 100.0).collect();

        Ok((
            config,
            SimulationInput {
                chargers,
                demand,
                arrival,
                ev_consumption: self.vehicles.ev_consumption,
            },
        ))
    }
}
