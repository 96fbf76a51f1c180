//! Post-hoc weekly and monthly roll-ups of day summaries.

use std::fmt;

use serde::Serialize;

use super::summation::kahan_sum;
use super::types::DaySummary;

/// Days in each month of a non-leap year.
const DAYS_IN_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Highest daily peak within one 7-day chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyPeak {
    /// 1-based week number.
    pub week: usize,
    pub max_power_kw: f64,
    /// Days covered; the last week may be short.
    pub days: usize,
}

/// Energy delivered within one 7-day chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyEnergy {
    /// 1-based week number.
    pub week: usize,
    pub energy_kwh: f64,
    /// Days covered; the last week may be short.
    pub days: usize,
}

/// Energy delivered within one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyEnergy {
    pub month: &'static str,
    pub energy_kwh: f64,
    /// Days covered; a truncated horizon leaves the last month short.
    pub days: usize,
}

/// Groups day summaries into consecutive weeks and keeps each week's peak.
pub fn weekly_peaks(days: &[DaySummary]) -> Vec<WeeklyPeak> {
    days.chunks(7)
        .enumerate()
        .map(|(i, week)| WeeklyPeak {
            week: i + 1,
            max_power_kw: week.iter().map(|d| d.max_power_kw).fold(0.0, f64::max),
            days: week.len(),
        })
        .collect()
}

/// Groups day summaries into consecutive weeks and sums each week's energy.
pub fn weekly_energy(days: &[DaySummary]) -> Vec<WeeklyEnergy> {
    days.chunks(7)
        .enumerate()
        .map(|(i, week)| WeeklyEnergy {
            week: i + 1,
            energy_kwh: kahan_sum(week.iter().map(|d| d.energy_consumed_kwh)),
            days: week.len(),
        })
        .collect()
}

/// Groups day summaries into calendar months starting in January.
///
/// Days beyond December are ignored.
pub fn monthly_energy(days: &[DaySummary]) -> Vec<MonthlyEnergy> {
    let mut months = Vec::with_capacity(12);
    let mut start = 0;

    for (name, len) in MONTH_NAMES.iter().zip(DAYS_IN_MONTH) {
        if start >= days.len() {
            break;
        }
        let end = (start + len).min(days.len());
        let month = &days[start..end];
        months.push(MonthlyEnergy {
            month: name,
            energy_kwh: kahan_sum(month.iter().map(|d| d.energy_consumed_kwh)),
            days: month.len(),
        });
        start = end;
    }

    months
}

impl fmt::Display for MonthlyEnergy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:>10.2} kWh ({} days)",
            self.month, self.energy_kwh, self.days
        )
    }
}

impl fmt::Display for WeeklyPeak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "week {:>2} | peak {:>8.2} kW ({} days)",
            self.week, self.max_power_kw, self.days
        )
    }
}

impl fmt::Display for WeeklyEnergy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "week {:>2} | {:>10.2} kWh ({} days)",
            self.week, self.energy_kwh, self.days
        )
    }
}
