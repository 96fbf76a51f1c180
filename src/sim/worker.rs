//! Tick loop for one group of chargers.

use super::charger::{Charger, ChargerState};
use super::clock::TickClock;
use super::random::RandomModel;
use super::types::{SimConfig, TickRecord};

/// Simulates a group of chargers over the whole horizon.
///
/// Owns its charger states and its [`RandomModel`] outright, so a run needs no
/// synchronization and can be moved onto any thread. [`ChargerSimulator::run`]
/// consumes the simulator, which makes a second run impossible.
#[derive(Debug)]
pub struct ChargerSimulator {
    chargers: Vec<ChargerState>,
    model: RandomModel,
    clock: TickClock,
    dt_hours: f64,
    ev_consumption: f64,
}

/// Tick records produced by one finished [`ChargerSimulator`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    records: Vec<TickRecord>,
}

impl RunOutput {
    /// Per-tick records in tick order.
    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    /// Number of tick records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no ticks were recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<TickRecord>> for RunOutput {
    fn from(records: Vec<TickRecord>) -> Self {
        Self { records }
    }
}

impl ChargerSimulator {
    /// Creates a simulator for `chargers`, all starting idle.
    ///
    /// # Arguments
    ///
    /// * `chargers` - Chargers owned by this group (may be empty)
    /// * `model` - Arrival and demand sampler, not shared with any other group
    /// * `config` - Timing configuration
    /// * `ev_consumption` - Energy per 100 demand-magnitude units (kWh)
    ///
    /// # Panics
    ///
    /// Panics if `ev_consumption` is not finite and positive.
    pub fn new(
        chargers: &[Charger],
        model: RandomModel,
        config: &SimConfig,
        ev_consumption: f64,
    ) -> Self {
        assert!(
            ev_consumption.is_finite() && ev_consumption > 0.0,
            "ev_consumption must be finite and > 0"
        );

        Self {
            chargers: chargers.iter().map(ChargerState::new).collect(),
            model,
            clock: TickClock::new(config.total_ticks(), config.ticks_per_hour),
            dt_hours: config.dt_hours,
            ev_consumption,
        }
    }

    /// Converts a sampled demand magnitude into required energy (kWh).
    pub fn demand_to_kwh(&self, magnitude: u32) -> f64 {
        f64::from(magnitude) * self.ev_consumption / 100.0
    }

    /// Current charger states, in processing order.
    pub fn chargers(&self) -> &[ChargerState] {
        &self.chargers
    }

    /// Advances every owned charger by one tick and returns the tick's totals.
    fn step(&mut self, tick: usize) -> TickRecord {
        let mut record = TickRecord::default();

        for i in 0..self.chargers.len() {
            // 1. Departure check
            let idle = self.chargers[i].release_if_satisfied();

            // 2. Arrival; a fresh vehicle charges in this same tick
            if idle && self.model.arrives(tick) {
                record.arrivals += 1;
                let magnitude = self.model.sample_demand();
                let demand_kwh = self.demand_to_kwh(magnitude);
                self.chargers[i].plug_in(demand_kwh);
            }

            // 3. Delivery at full rated power, overshoot allowed
            let charger = &mut self.chargers[i];
            if let Some(delivered_kwh) = charger.deliver(self.dt_hours) {
                record.total_energy_kwh += delivered_kwh;
                record.total_power_kw += charger.power_kw;
            }
        }

        record
    }

    /// Runs every tick of the horizon and returns the per-tick records.
    pub fn run(mut self) -> RunOutput {
        let mut clock = self.clock.clone();
        let mut records = Vec::with_capacity(clock.total());
        clock.run(|tick| records.push(self.step(tick)));
        RunOutput { records }
    }
}
