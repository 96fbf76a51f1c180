//! Stochastic arrival and charging-demand model.

use std::collections::BTreeMap;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::ConfigError;

use super::clock::TickClock;

/// Number of hourly arrival probabilities a model needs.
pub const HOURS_PER_DAY: usize = 24;

/// Demand magnitude (e.g. kilometres to recharge) mapped to a relative weight.
pub type DemandTable = BTreeMap<u32, f64>;

/// Arrival and demand sampler owned by exactly one charger group.
///
/// All draws come from one [`StdRng`]; the same seed and the same sequence of
/// calls reproduce the same outcomes bit for bit.
#[derive(Debug, Clone)]
pub struct RandomModel {
    outcomes: Vec<u32>,
    demand: WeightedIndex<f64>,
    arrival: [f64; HOURS_PER_DAY],
    clock: TickClock,
    rng: StdRng,
}

impl RandomModel {
    /// Builds a model from a demand table and 24 hourly arrival probabilities.
    ///
    /// Outcomes are drawn in ascending magnitude order. Weights need not sum
    /// to one.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the demand table is empty or has no usable
    /// weights, or if `arrival` does not hold exactly 24 values in `[0, 1]`.
    pub fn new(
        demand: &DemandTable,
        arrival: &[f64],
        clock: TickClock,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if demand.is_empty() {
            return Err(ConfigError::new("demand", "demand table cannot be empty"));
        }
        let arrival: [f64; HOURS_PER_DAY] = arrival.try_into().map_err(|_| {
            ConfigError::new(
                "arrival_pct",
                format!(
                    "arrival probabilities must contain {HOURS_PER_DAY} values, got {}",
                    arrival.len()
                ),
            )
        })?;
        if let Some(hour) = arrival.iter().position(|p| !(0.0..=1.0).contains(p)) {
            return Err(ConfigError::new(
                format!("arrival_pct[{hour}]"),
                format!("probability must be in [0, 1], got {}", arrival[hour]),
            ));
        }

        let outcomes: Vec<u32> = demand.keys().copied().collect();
        let demand = WeightedIndex::new(demand.values().copied())
            .map_err(|e| ConfigError::new("demand", format!("unusable weights: {e}")))?;

        Ok(Self {
            outcomes,
            demand,
            arrival,
            clock,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Draws one demand magnitude from the weighted table.
    pub fn sample_demand(&mut self) -> u32 {
        self.outcomes[self.demand.sample(&mut self.rng)]
    }

    /// Decides whether a vehicle shows up at an idle charger on `tick`.
    pub fn arrives(&mut self, tick: usize) -> bool {
        let hour = self.clock.hour_of_day(tick);
        self.rng.random::<f64>() < self.arrival[hour]
    }
}
