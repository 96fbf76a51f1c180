//! Splits the fleet into groups, runs them in parallel, and aggregates once.

use std::thread;

use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::error::SimError;

use super::aggregate::ResultAggregator;
use super::charger::Charger;
use super::clock::TickClock;
use super::random::{DemandTable, RandomModel};
use super::types::{GlobalResult, SimConfig};
use super::worker::{ChargerSimulator, RunOutput};

/// Validated model inputs for one simulation request.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInput {
    /// Every charger in the fleet, in configuration order.
    pub chargers: Vec<Charger>,
    /// Demand magnitude to relative weight.
    pub demand: DemandTable,
    /// Hourly arrival probabilities in `[0, 1]`.
    pub arrival: Vec<f64>,
    /// Energy per 100 demand-magnitude units (kWh).
    pub ev_consumption: f64,
}

/// Splits `chargers` into `groups` contiguous slices whose sizes differ by at
/// most one. Leading groups take the remainder; surplus groups are empty.
///
/// # Panics
///
/// Panics if `groups` is zero.
///
/// # Examples
///
/// ```
/// use ev_fleet_sim::sim::orchestrator::partition;
///
/// let items: Vec<u32> = (0..10).collect();
/// let sizes: Vec<usize> = partition(&items, 4).iter().map(|g| g.len()).collect();
/// assert_eq!(sizes, vec![3, 3, 2, 2]);
/// ```
pub fn partition<T>(chargers: &[T], groups: usize) -> Vec<&[T]> {
    assert!(groups > 0, "groups must be > 0");
    let base = chargers.len() / groups;
    let remainder = chargers.len() % groups;

    let mut start = 0;
    (0..groups)
        .map(|group| {
            let len = base + usize::from(group < remainder);
            let slice = &chargers[start..start + len];
            start += len;
            slice
        })
        .collect()
}

/// Runs one simulation request across parallel charger groups.
#[derive(Debug, Clone)]
pub struct RunOrchestrator {
    config: SimConfig,
}

impl RunOrchestrator {
    /// Creates an orchestrator that runs every request under `config`.
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Timing and scheduling applied to every run.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Builds one simulator per group. The consumption figure and every random
    /// model are validated here, so nothing runs if any of them is rejected.
    fn build_simulators(&self, input: &SimulationInput) -> Result<Vec<ChargerSimulator>, SimError> {
        if !(input.ev_consumption.is_finite() && input.ev_consumption > 0.0) {
            return Err(ConfigError::new(
                "ev_consumption",
                format!("must be finite and > 0, got {}", input.ev_consumption),
            )
            .into());
        }

        let config = &self.config;
        partition(&input.chargers, config.workers)
            .into_iter()
            .enumerate()
            .map(|(group, chargers)| -> Result<ChargerSimulator, SimError> {
                let clock = TickClock::new(config.total_ticks(), config.ticks_per_hour);
                let model = RandomModel::new(
                    &input.demand,
                    &input.arrival,
                    clock,
                    config.seed_for_group(group),
                )?;
                Ok(ChargerSimulator::new(
                    chargers,
                    model,
                    config,
                    input.ev_consumption,
                ))
            })
            .collect()
    }

    /// Runs every group to completion and aggregates their records.
    ///
    /// Each group runs on its own named OS thread and hands its records back
    /// over a channel. Aggregation starts only after every thread has been
    /// joined, and runs exactly once.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` if the consumption figure or the
    /// random model rejects the input, `SimError::Spawn` if a thread cannot start, and
    /// `SimError::WorkerPanicked` if any group fails mid-run.
    pub fn run(&self, input: &SimulationInput) -> Result<GlobalResult, SimError> {
        let simulators = self.build_simulators(input)?;
        let groups = simulators.len();

        if input.chargers.len() < groups {
            warn!(
                chargers = input.chargers.len(),
                groups, "more groups than chargers; surplus groups run empty"
            );
        }
        info!(
            chargers = input.chargers.len(),
            groups,
            ticks = self.config.total_ticks(),
            "starting fleet simulation"
        );

        let runs = thread::scope(|scope| -> Result<Vec<RunOutput>, SimError> {
            let (tx, rx) = crossbeam_channel::bounded::<(usize, RunOutput)>(groups);

            let mut handles = Vec::with_capacity(groups);
            for (group, simulator) in simulators.into_iter().enumerate() {
                let tx = tx.clone();
                let handle = thread::Builder::new()
                    .name(format!("charger-group-{group}"))
                    .spawn_scoped(scope, move || {
                        let output = simulator.run();
                        // The receiver lives until every handle is joined.
                        let _ = tx.send((group, output));
                    })
                    .map_err(|source| SimError::Spawn { group, source })?;
                handles.push(handle);
            }
            drop(tx);

            let mut outputs: Vec<Option<RunOutput>> = (0..groups).map(|_| None).collect();
            for (group, output) in rx.iter() {
                debug!(group, ticks = output.len(), "charger group finished");
                outputs[group] = Some(output);
            }

            for (group, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    return Err(SimError::WorkerPanicked { group });
                }
            }

            outputs
                .into_iter()
                .enumerate()
                .map(|(group, output)| output.ok_or(SimError::MissingOutput { group }))
                .collect()
        })?;

        let result = ResultAggregator::new(&self.config).aggregate(&runs)?;
        info!(
            days = result.days.len(),
            max_power_kw = result.total_max_power_kw,
            energy_kwh = result.total_energy_consumed,
            "fleet simulation finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::HOURS_PER_DAY;
    use crate::sim::types::{DayBoundary, SeedStrategy};

    fn input(powers: &[f64], arrival: f64) -> SimulationInput {
        SimulationInput {
            chargers: powers.iter().copied().map(Charger::new).collect(),
            demand: DemandTable::from([(0, 34.31), (10, 9.8), (50, 11.76), (100, 10.78)]),
            arrival: vec![arrival; HOURS_PER_DAY],
            ev_consumption: 18.0,
        }
    }

    #[test]
    fn partition_ten_over_four() {
        let items: Vec<usize> = (0..10).collect();
        let groups = partition(&items, 4);
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);

        let flattened: Vec<usize> = groups.concat();
        assert_eq!(flattened, items);
    }

    #[test]
    fn partition_more_groups_than_items() {
        let items = [1, 2];
        let sizes: Vec<usize> = partition(&items, 4).iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0]);
    }

    #[test]
    fn partition_sizes_differ_by_at_most_one() {
        for n in 0..40 {
            let items: Vec<usize> = (0..n).collect();
            for groups in 1..9 {
                let parts = partition(&items, groups);
                assert_eq!(parts.len(), groups);
                let max = parts.iter().map(|p| p.len()).max().unwrap_or(0);
                let min = parts.iter().map(|p| p.len()).min().unwrap_or(0);
                assert!(max - min <= 1, "n={n} groups={groups}");
                assert_eq!(parts.concat(), items);
            }
        }
    }

    #[test]
    #[should_panic]
    fn partition_zero_groups_panics() {
        partition(&[1, 2, 3], 0);
    }

    #[test]
    fn rejects_bad_arrival_before_running() {
        let orchestrator = RunOrchestrator::new(SimConfig::new(15, 1, 4, 1));
        let mut bad = input(&[11.0], 0.1);
        bad.arrival.pop();
        assert!(matches!(
            orchestrator.run(&bad),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_unusable_consumption_before_running() {
        let orchestrator = RunOrchestrator::new(SimConfig::new(15, 1, 4, 1));
        for consumption in [0.0, -18.0, f64::NAN, f64::INFINITY] {
            let mut bad = input(&[11.0, 22.0], 1.0);
            bad.ev_consumption = consumption;
            match orchestrator.run(&bad) {
                Err(SimError::InvalidConfig(errors)) => {
                    assert_eq!(errors.len(), 1);
                    assert_eq!(errors[0].field, "ev_consumption");
                }
                other => panic!("consumption {consumption}: expected InvalidConfig, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_chargers_yield_all_zero_days() {
        let orchestrator = RunOrchestrator::new(SimConfig::new(15, 3, 4, 1));
        let result = orchestrator.run(&input(&[], 0.5));
        assert!(result.is_ok());
        let result = result.unwrap_or_default();
        assert_eq!(result.days.len(), 2);
        assert!(result.days.iter().all(|d| d.max_power_kw == 0.0));
        assert!(result.days.iter().all(|d| d.energy_consumed_kwh == 0.0));
        assert_eq!(result.total_max_power_kw, 0.0);
        assert_eq!(result.total_energy_consumed, 0.0);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let orchestrator = RunOrchestrator::new(SimConfig::new(15, 14, 4, 1));
        let fleet = input(&[11.0; 10], 0.08);
        let a = orchestrator.run(&fleet).unwrap_or_default();
        let b = orchestrator.run(&fleet).unwrap_or_default();
        assert_eq!(a, b);
        assert!(a.total_energy_consumed > 0.0);
    }

    #[test]
    fn peak_never_exceeds_installed_power() {
        let orchestrator = RunOrchestrator::new(
            SimConfig::new(15, 14, 4, 1).with_day_boundary(DayBoundary::Calendar),
        );
        let powers = [11.0, 11.0, 22.0, 50.0, 7.4];
        let result = orchestrator.run(&input(&powers, 0.2)).unwrap_or_default();
        let installed: f64 = powers.iter().sum();
        assert!(result.total_max_power_kw <= installed);
        assert!(result.days.iter().all(|d| d.max_power_kw <= result.total_max_power_kw));
    }

    #[test]
    fn per_group_seeds_change_the_outcome() {
        let shared = RunOrchestrator::new(SimConfig::new(15, 14, 4, 1));
        let per_group = RunOrchestrator::new(
            SimConfig::new(15, 14, 4, 1).with_seed_strategy(SeedStrategy::PerGroup),
        );
        let fleet = input(&[11.0; 8], 0.1);
        assert_ne!(
            shared.run(&fleet).unwrap_or_default(),
            per_group.run(&fleet).unwrap_or_default()
        );
    }

    #[test]
    fn shared_seed_groups_of_equal_shape_mirror_each_other() {
        // With a shared seed, two identical groups draw identical sequences,
        // so an 8-charger fleet over 2 groups doubles a 4-charger fleet.
        let two = RunOrchestrator::new(SimConfig::new(15, 7, 2, 1));
        let one = RunOrchestrator::new(SimConfig::new(15, 7, 1, 1));
        let doubled = two.run(&input(&[11.0; 8], 0.1)).unwrap_or_default();
        let single = one.run(&input(&[11.0; 4], 0.1)).unwrap_or_default();
        assert_eq!(doubled.total_max_power_kw, 2.0 * single.total_max_power_kw);
    }
}
