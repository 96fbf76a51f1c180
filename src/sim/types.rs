//! Core simulation types: timing configuration, per-tick records, and results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default tick duration in minutes.
pub const DEFAULT_TICK_MINUTES: u32 = 15;
/// Default horizon: one non-leap year.
pub const DEFAULT_DAYS: usize = 365;
/// Default number of parallel charger groups.
pub const DEFAULT_WORKERS: usize = 4;
/// Fixed seed every worker's generator starts from.
pub const DEFAULT_SEED: u64 = 1;

/// Offset between consecutive group seeds under [`SeedStrategy::PerGroup`].
const GROUP_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// How each charger group's generator is seeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// Every group uses the master seed. Reproducible, not independent.
    #[default]
    Shared,
    /// Each group mixes its index into the master seed.
    PerGroup,
}

/// When the aggregator closes a day bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundary {
    /// Fold tick `i` first, then emit if `i` is a positive multiple of
    /// ticks-per-day. The trailing accumulator is never flushed, so a horizon
    /// of whole days yields one summary fewer than it has days.
    #[default]
    Legacy,
    /// Emit before folding the first tick of each new day and flush the
    /// final day after the loop. Each summary covers exactly its own ticks.
    Calendar,
}

/// Timing and scheduling parameters shared by every component of a run.
///
/// # Examples
///
/// ```
/// use ev_fleet_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(15, 365, 4, 1);
/// assert_eq!(cfg.ticks_per_day, 96);
/// assert_eq!(cfg.total_ticks(), 35_040);
/// assert_eq!(cfg.dt_hours, 0.25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    /// Duration of one tick in minutes.
    pub tick_minutes: u32,
    /// Number of days to simulate.
    pub days: usize,
    /// Number of charger groups run in parallel.
    pub workers: usize,
    /// Master random seed.
    pub seed: u64,
    /// Per-group seed derivation.
    pub seed_strategy: SeedStrategy,
    /// Day bucketing rule used by the aggregator.
    pub day_boundary: DayBoundary,
    /// Ticks in one hour, `60 / tick_minutes`.
    pub ticks_per_hour: usize,
    /// Ticks in one day, `ticks_per_hour * 24`.
    pub ticks_per_day: usize,
    /// Duration of one tick in hours.
    pub dt_hours: f64,
}

impl SimConfig {
    /// Creates a timing configuration with the shared seed strategy and the
    /// legacy day boundary.
    ///
    /// # Panics
    ///
    /// Panics if `tick_minutes` is zero or does not divide 60, or if `days`
    /// or `workers` is zero.
    pub fn new(tick_minutes: u32, days: usize, workers: usize, seed: u64) -> Self {
        assert!(
            tick_minutes > 0 && 60 % tick_minutes == 0,
            "tick_minutes must divide 60"
        );
        assert!(days > 0, "days must be > 0");
        assert!(workers > 0, "workers must be > 0");

        let ticks_per_hour = (60 / tick_minutes) as usize;
        Self {
            tick_minutes,
            days,
            workers,
            seed,
            seed_strategy: SeedStrategy::Shared,
            day_boundary: DayBoundary::Legacy,
            ticks_per_hour,
            ticks_per_day: ticks_per_hour * 24,
            dt_hours: f64::from(tick_minutes) / 60.0,
        }
    }

    /// Returns a copy using the given seed strategy.
    pub fn with_seed_strategy(mut self, strategy: SeedStrategy) -> Self {
        self.seed_strategy = strategy;
        self
    }

    /// Returns a copy using the given day boundary rule.
    pub fn with_day_boundary(mut self, boundary: DayBoundary) -> Self {
        self.day_boundary = boundary;
        self
    }

    /// Total number of ticks across the horizon.
    pub fn total_ticks(&self) -> usize {
        self.ticks_per_day * self.days
    }

    /// Seed for the generator owned by charger group `group`.
    pub fn seed_for_group(&self, group: usize) -> u64 {
        match self.seed_strategy {
            SeedStrategy::Shared => self.seed,
            SeedStrategy::PerGroup => self
                .seed
                .wrapping_add(GROUP_SEED_STRIDE.wrapping_mul(group as u64 + 1)),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_MINUTES, DEFAULT_DAYS, DEFAULT_WORKERS, DEFAULT_SEED)
    }
}

/// One simulator's aggregate output for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickRecord {
    /// Sum of rated power over chargers that delivered energy this tick (kW).
    pub total_power_kw: f64,
    /// Energy delivered by all owned chargers during this tick (kWh).
    pub total_energy_kwh: f64,
    /// Number of vehicles that arrived this tick.
    pub arrivals: u32,
}

/// Peak power and delivered energy for one simulated day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    /// Highest fleet-wide instantaneous power seen during the day (kW).
    pub max_power_kw: f64,
    /// Energy delivered during the day (kWh).
    pub energy_consumed_kwh: f64,
}

/// Final answer of one simulation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalResult {
    /// Day summaries in day order.
    #[serde(rename = "results")]
    pub days: Vec<DaySummary>,
    /// Compensated sum of every emitted day's energy (kWh).
    pub total_energy_consumed: f64,
    /// Highest fleet-wide instantaneous power across the horizon (kW).
    pub total_max_power_kw: f64,
}

impl fmt::Display for GlobalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Fleet Load Report ---")?;
        writeln!(f, "Days reported:         {}", self.days.len())?;
        writeln!(f, "Peak power:            {:.2} kW", self.total_max_power_kw)?;
        writeln!(
            f,
            "Energy consumed:       {:.2} kWh",
            self.total_energy_consumed
        )?;
        let busiest = self
            .days
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.energy_consumed_kwh.total_cmp(&b.1.energy_consumed_kwh));
        match busiest {
            Some((day, summary)) => write!(
                f,
                "Busiest day:           #{day} ({:.2} kWh, peak {:.2} kW)",
                summary.energy_consumed_kwh, summary.max_power_kw
            ),
            None => write!(f, "Busiest day:           n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_one_year_of_quarter_hours() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.tick_minutes, 15);
        assert_eq!(cfg.ticks_per_hour, 4);
        assert_eq!(cfg.ticks_per_day, 96);
        assert_eq!(cfg.total_ticks(), 35_040);
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.seed, 1);
    }

    #[test]
    fn hourly_ticks() {
        let cfg = SimConfig::new(60, 2, 1, 0);
        assert_eq!(cfg.ticks_per_day, 24);
        assert_eq!(cfg.total_ticks(), 48);
        assert_eq!(cfg.dt_hours, 1.0);
    }

    #[test]
    #[should_panic]
    fn tick_minutes_must_divide_an_hour() {
        SimConfig::new(7, 1, 1, 0);
    }

    #[test]
    #[should_panic]
    fn zero_workers_panics() {
        SimConfig::new(15, 1, 0, 0);
    }

    #[test]
    fn shared_seed_is_identical_for_every_group() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.seed_for_group(0), cfg.seed_for_group(3));
    }

    #[test]
    fn per_group_seeds_differ() {
        let cfg = SimConfig::default().with_seed_strategy(SeedStrategy::PerGroup);
        assert_ne!(cfg.seed_for_group(0), cfg.seed_for_group(1));
        assert_ne!(cfg.seed_for_group(0), cfg.seed);
    }

    #[test]
    fn result_serializes_with_host_field_names() {
        let result = GlobalResult {
            days: vec![DaySummary {
                max_power_kw: 22.0,
                energy_consumed_kwh: 40.5,
            }],
            total_energy_consumed: 40.5,
            total_max_power_kw: 22.0,
        };
        let json = serde_json::to_value(&result).ok();
        let json = json.as_ref();
        assert!(json.and_then(|j| j.get("results")).is_some());
        assert!(json.and_then(|j| j.get("totalEnergyConsumed")).is_some());
        assert!(json.and_then(|j| j.get("totalMaxPowerKw")).is_some());
        assert_eq!(
            json.and_then(|j| j["results"][0].get("energyConsumedKwh"))
                .and_then(serde_json::Value::as_f64),
            Some(40.5)
        );
    }

    #[test]
    fn report_display_does_not_panic_when_empty() {
        let s = format!("{}", GlobalResult::default());
        assert!(s.contains("n/a"));
    }
}
