//! Merges per-group tick records into day summaries and fleet-wide totals.

use tracing::debug;

use crate::error::SimError;

use super::summation::kahan_sum;
use super::types::{DayBoundary, DaySummary, GlobalResult, SimConfig};
use super::worker::RunOutput;

/// Running max power and energy for the day being accumulated.
#[derive(Debug, Clone, Copy, Default)]
struct DayAccumulator {
    max_power_kw: f64,
    energy_kwh: f64,
}

impl DayAccumulator {
    fn fold(&mut self, power_kw: f64, energy_kwh: f64) {
        self.energy_kwh += energy_kwh;
        if power_kw > self.max_power_kw {
            self.max_power_kw = power_kw;
        }
    }

    /// Emits the accumulated day and resets to zero.
    fn take(&mut self) -> DaySummary {
        let day = DaySummary {
            max_power_kw: self.max_power_kw,
            energy_consumed_kwh: self.energy_kwh,
        };
        *self = Self::default();
        day
    }
}

/// Folds the tick records of every charger group into a [`GlobalResult`].
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    total_ticks: usize,
    ticks_per_day: usize,
    boundary: DayBoundary,
}

impl ResultAggregator {
    /// Creates an aggregator for the horizon and day boundary of `config`.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            total_ticks: config.total_ticks(),
            ticks_per_day: config.ticks_per_day,
            boundary: config.day_boundary,
        }
    }

    /// Aggregates the outputs of all groups, indexed identically by tick.
    ///
    /// # Errors
    ///
    /// Returns `SimError::TickCountMismatch` if any group produced a record
    /// count other than the configured number of ticks.
    pub fn aggregate(&self, runs: &[RunOutput]) -> Result<GlobalResult, SimError> {
        for (group, run) in runs.iter().enumerate() {
            if run.len() != self.total_ticks {
                return Err(SimError::TickCountMismatch {
                    group,
                    expected: self.total_ticks,
                    actual: run.len(),
                });
            }
        }

        let mut days = Vec::with_capacity(self.total_ticks / self.ticks_per_day + 1);
        let mut day = DayAccumulator::default();
        let mut max_power_kw = 0.0_f64;

        for tick in 0..self.total_ticks {
            let (power_kw, energy_kwh) = runs.iter().fold((0.0, 0.0), |(p, e), run| {
                let r = &run.records()[tick];
                (p + r.total_power_kw, e + r.total_energy_kwh)
            });

            if power_kw > max_power_kw {
                max_power_kw = power_kw;
            }

            let new_day = tick > 0 && tick % self.ticks_per_day == 0;
            match self.boundary {
                DayBoundary::Legacy => {
                    day.fold(power_kw, energy_kwh);
                    if new_day {
                        days.push(day.take());
                    }
                }
                DayBoundary::Calendar => {
                    if new_day {
                        days.push(day.take());
                    }
                    day.fold(power_kw, energy_kwh);
                }
            }
        }

        if self.boundary == DayBoundary::Calendar && self.total_ticks > 0 {
            days.push(day.take());
        }

        let total_energy_consumed = kahan_sum(days.iter().map(|d| d.energy_consumed_kwh));
        debug!(
            groups = runs.len(),
            days = days.len(),
            max_power_kw,
            total_energy_consumed,
            "aggregated tick records"
        );

        Ok(GlobalResult {
            days,
            total_energy_consumed,
            total_max_power_kw: max_power_kw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::TickRecord;

    fn cfg(days: usize, boundary: DayBoundary) -> SimConfig {
        // Hourly ticks keep the fixtures small: 24 ticks per day.
        SimConfig::new(60, days, 2, 1).with_day_boundary(boundary)
    }

    fn constant_run(ticks: usize, power_kw: f64, energy_kwh: f64) -> RunOutput {
        RunOutput::from(vec![
            TickRecord {
                total_power_kw: power_kw,
                total_energy_kwh: energy_kwh,
                arrivals: 0,
            };
            ticks
        ])
    }

    #[test]
    fn legacy_boundary_drops_final_day() {
        let c = cfg(3, DayBoundary::Legacy);
        let runs = [constant_run(72, 1.0, 1.0), constant_run(72, 2.0, 1.0)];
        let result = ResultAggregator::new(&c).aggregate(&runs);
        let result = result.unwrap_or_default();

        assert_eq!(result.days.len(), 2);
        // Day 0 folds ticks 0..=24, later days ticks 24k+1..=24(k+1).
        assert_eq!(result.days[0].energy_consumed_kwh, 50.0);
        assert_eq!(result.days[1].energy_consumed_kwh, 48.0);
        assert_eq!(result.total_energy_consumed, 98.0);
        assert_eq!(result.total_max_power_kw, 3.0);
    }

    #[test]
    fn calendar_boundary_flushes_every_day() {
        let c = cfg(3, DayBoundary::Calendar);
        let runs = [constant_run(72, 1.0, 1.0), constant_run(72, 2.0, 1.0)];
        let result = ResultAggregator::new(&c)
            .aggregate(&runs)
            .unwrap_or_default();

        assert_eq!(result.days.len(), 3);
        assert!(result.days.iter().all(|d| d.energy_consumed_kwh == 48.0));
        assert_eq!(result.total_energy_consumed, 144.0);
    }

    #[test]
    fn day_peak_is_per_day_and_global_peak_is_per_horizon() {
        let c = cfg(2, DayBoundary::Calendar);
        let mut records = vec![TickRecord::default(); 48];
        records[5].total_power_kw = 7.0;
        records[30].total_power_kw = 22.0;
        let runs = [RunOutput::from(records), constant_run(48, 0.0, 0.0)];

        let result = ResultAggregator::new(&c)
            .aggregate(&runs)
            .unwrap_or_default();
        assert_eq!(result.days[0].max_power_kw, 7.0);
        assert_eq!(result.days[1].max_power_kw, 22.0);
        assert_eq!(result.total_max_power_kw, 22.0);
    }

    #[test]
    fn power_is_summed_across_groups_before_taking_the_max() {
        let c = cfg(1, DayBoundary::Calendar);
        let mut a = vec![TickRecord::default(); 24];
        let mut b = vec![TickRecord::default(); 24];
        a[3].total_power_kw = 11.0;
        b[3].total_power_kw = 11.0;
        b[4].total_power_kw = 20.0;

        let result = ResultAggregator::new(&c)
            .aggregate(&[RunOutput::from(a), RunOutput::from(b)])
            .unwrap_or_default();
        assert_eq!(result.total_max_power_kw, 22.0);
    }

    #[test]
    fn mismatched_record_count_is_rejected() {
        let c = cfg(1, DayBoundary::Legacy);
        let runs = [constant_run(24, 1.0, 1.0), constant_run(23, 1.0, 1.0)];
        let err = ResultAggregator::new(&c).aggregate(&runs);
        assert!(matches!(
            err,
            Err(SimError::TickCountMismatch {
                group: 1,
                expected: 24,
                actual: 23
            })
        ));
    }

    #[test]
    fn no_groups_yields_zero_days() {
        let c = cfg(2, DayBoundary::Calendar);
        let result = ResultAggregator::new(&c).aggregate(&[]).unwrap_or_default();
        assert_eq!(result.days.len(), 2);
        assert!(result.days.iter().all(|d| *d == DaySummary::default()));
    }
}
