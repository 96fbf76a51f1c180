/// A fixed-step simulation clock that also knows the calendar geometry of a
/// tick: which hour of the day and which day it falls in.
///
/// # Examples
///
/// ```
/// use ev_fleet_sim::sim::clock::TickClock;
///
/// let mut clock = TickClock::new(3, 4);
/// let mut ticks = Vec::new();
///
/// clock.run(|tick| ticks.push(tick));
/// assert_eq!(ticks, vec![0, 1, 2]);
/// assert_eq!(clock.hour_of_day(95), 23);
/// ```
#[derive(Debug, Clone)]
pub struct TickClock {
    /// Next tick to hand out.
    current: usize,
    /// Ticks in the whole horizon.
    total: usize,
    ticks_per_hour: usize,
    ticks_per_day: usize,
}

impl TickClock {
    /// Creates a clock covering `total` ticks of `ticks_per_hour` ticks each hour.
    ///
    /// # Panics
    ///
    /// Panics if `ticks_per_hour` is zero.
    pub fn new(total: usize, ticks_per_hour: usize) -> Self {
        assert!(ticks_per_hour > 0, "ticks_per_hour must be > 0");
        Self {
            current: 0,
            total,
            ticks_per_hour,
            ticks_per_day: ticks_per_hour * 24,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// Returns the tick index before advancing, or `None` once the horizon is
    /// exhausted.
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.total {
            let tick = self.current;
            self.current += 1;
            Some(tick)
        } else {
            None
        }
    }

    /// Calls `f` for every remaining tick in order.
    pub fn run(&mut self, mut f: impl FnMut(usize)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }

    /// Hour of day (`0..24`) the given tick falls in.
    pub fn hour_of_day(&self, tick: usize) -> usize {
        (tick % self.ticks_per_day) / self.ticks_per_hour
    }

    /// Day index the given tick falls in.
    pub fn day_of(&self, tick: usize) -> usize {
        tick / self.ticks_per_day
    }

    /// Total ticks this clock covers.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Ticks in one day.
    pub fn ticks_per_day(&self) -> usize {
        self.ticks_per_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick() {
        let mut clock = TickClock::new(2, 4);
        assert_eq!(clock.tick(), Some(0));
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = TickClock::new(0, 4);
        assert_eq!(clock.tick(), None);

        let mut was_called = false;
        clock.run(|_| was_called = true);
        assert!(!was_called);
    }

    #[test]
    fn hour_wraps_every_day() {
        let clock = TickClock::new(192, 4);
        assert_eq!(clock.hour_of_day(0), 0);
        assert_eq!(clock.hour_of_day(3), 0);
        assert_eq!(clock.hour_of_day(4), 1);
        assert_eq!(clock.hour_of_day(95), 23);
        assert_eq!(clock.hour_of_day(96), 0);
        assert_eq!(clock.hour_of_day(100), 1);
    }

    #[test]
    fn day_index() {
        let clock = TickClock::new(192, 4);
        assert_eq!(clock.day_of(95), 0);
        assert_eq!(clock.day_of(96), 1);
        assert_eq!(clock.ticks_per_day(), 96);
    }
}
