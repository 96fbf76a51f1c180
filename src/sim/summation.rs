//! Kahan compensated summation.

/// Running sum that carries the low-order bits lost by each addition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// Creates an empty sum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`, correcting it by the error left over from the previous add.
    pub fn add(&mut self, value: f64) {
        let corrected = value - self.compensation;
        let total = self.sum + corrected;
        self.compensation = (total - self.sum) - corrected;
        self.sum = total;
    }

    /// Compensated total of every value added so far.
    pub fn total(&self) -> f64 {
        self.sum
    }
}

impl Extend<f64> for KahanSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for KahanSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

/// Sums `values` with Kahan compensation.
///
/// # Examples
///
/// ```
/// use ev_fleet_sim::sim::summation::kahan_sum;
///
/// assert_eq!(kahan_sum([0.5, 0.25, 0.25]), 1.0);
/// ```
pub fn kahan_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().collect::<KahanSum>().total()
}
