//! Static charger capability and its mutable per-run state.

/// A charging point with a fixed rated power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charger {
    power_kw: f64,
}

impl Charger {
    /// Creates a charger rated at `power_kw`.
    ///
    /// # Panics
    ///
    /// Panics if `power_kw` is negative or not finite. Configuration
    /// validation rejects such values before chargers are built.
    pub fn new(power_kw: f64) -> Self {
        assert!(
            power_kw.is_finite() && power_kw >= 0.0,
            "charger power must be finite and >= 0, got {power_kw}"
        );
        Self { power_kw }
    }

    /// Rated charging power in kilowatts.
    pub fn power_kw(&self) -> f64 {
        self.power_kw
    }
}

/// Runtime state of one charger inside a simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargerState {
    /// Rated power copied from the [`Charger`].
    pub power_kw: f64,
    /// Whether a vehicle is plugged in.
    pub occupied: bool,
    /// Energy the plugged-in vehicle still needs (kWh). Goes negative for one
    /// tick when the last delivery overshoots.
    pub remaining_kwh: f64,
}

impl ChargerState {
    /// Creates an idle state for `charger` with no outstanding demand.
    pub fn new(charger: &Charger) -> Self {
        Self {
            power_kw: charger.power_kw,
            occupied: false,
            remaining_kwh: 0.0,
        }
    }

    /// Releases the charger once its demand is met.
    ///
    /// Returns `true` if the charger is free after the check.
    pub fn release_if_satisfied(&mut self) -> bool {
        if self.remaining_kwh <= 0.0 {
            self.occupied = false;
            self.remaining_kwh = 0.0;
        }
        !self.occupied
    }

    /// Plugs in a vehicle needing `demand_kwh`.
    pub fn plug_in(&mut self, demand_kwh: f64) {
        self.occupied = true;
        self.remaining_kwh = demand_kwh;
    }

    /// Delivers one tick of energy at rated power if a vehicle still needs it.
    ///
    /// Returns the delivered energy in kWh, or `None` if nothing was charged.
    pub fn deliver(&mut self, dt_hours: f64) -> Option<f64> {
        if !self.occupied || self.remaining_kwh <= 0.0 {
            return None;
        }
        let delivered_kwh = self.power_kw * dt_hours;
        self.remaining_kwh -= delivered_kwh;
        Some(delivered_kwh)
    }
}
