use chrono::NaiveDate;

use crate::models::entry::{finite_or_zero, PerformanceEntry};
use crate::models::series::{ProjectionPoint, RunningPoint};

/// Growth projection engine shared by the dashboard charts and the
/// investment calculator.
///
/// Pure arithmetic with no I/O or state. Every function is total over
/// finite inputs and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionService;

impl ProjectionService {
    pub fn new() -> Self {
        Self
    }

    /// Fold `entries` onto `starting_balance`, in the order given.
    ///
    /// Each step applies `balance += growth_amount + deposit - withdrawal`
    /// (missing or non-finite amounts count as zero) and emits one point.
    /// The caller owns chronological ordering; entries are not re-sorted.
    pub fn build_running_series<F>(
        &self,
        starting_balance: f64,
        entries: &[PerformanceEntry],
        label_fn: F,
    ) -> Vec<RunningPoint>
    where
        F: Fn(i32, u32) -> String,
    {
        let mut balance = starting_balance;
        entries
            .iter()
            .map(|entry| {
                balance = balance + finite_or_zero(entry.growth_amount)
                    + finite_or_zero(entry.deposit)
                    - finite_or_zero(entry.withdrawal);
                RunningPoint {
                    label: label_fn(entry.year, entry.month),
                    balance,
                    growth: entry.growth_amount,
                    growth_percentage: entry.growth_percentage,
                    deposit: entry.deposit,
                    withdrawal: entry.withdrawal,
                }
            })
            .collect()
    }

    /// Arithmetic mean of the entries' growth percentages.
    ///
    /// Missing and non-finite percentages are left out of the mean (not
    /// counted as zero). Returns 0.0 when nothing usable remains.
    pub fn average_growth_rate(&self, entries: &[PerformanceEntry]) -> f64 {
        let (sum, count) = entries
            .iter()
            .filter_map(|e| e.growth_percentage)
            .filter(|p| p.is_finite())
            .fold((0.0, 0u32), |(sum, count), p| (sum + p, count + 1));

        if count == 0 {
            0.0
        } else {
            sum / f64::from(count)
        }
    }

    /// Compound `last_balance` forward for `horizon_periods` periods.
    ///
    /// Every period applies growth first, then adds the contribution:
    /// `balance = balance * (1 + rate / 100) + periodic_contribution`.
    /// A zero or negative horizon yields an empty projection.
    pub fn project_forward(
        &self,
        last_balance: f64,
        avg_growth_rate_percent: f64,
        periodic_contribution: f64,
        horizon_periods: i64,
    ) -> Vec<ProjectionPoint> {
        let horizon = clamp_horizon(horizon_periods);
        let factor = 1.0 + avg_growth_rate_percent / 100.0;

        let mut balance = last_balance;
        (1..=horizon)
            .map(|period_index| {
                balance *= factor;
                balance += periodic_contribution;
                ProjectionPoint {
                    period_index,
                    balance,
                }
            })
            .collect()
    }

    /// Capital put in over a projection: the initial amount plus one
    /// contribution per period. A negative horizon counts as zero periods.
    pub fn total_contributed(
        &self,
        initial: f64,
        periodic_contribution: f64,
        horizon_periods: i64,
    ) -> f64 {
        initial + periodic_contribution * f64::from(clamp_horizon(horizon_periods))
    }
}

/// Default period label: abbreviated month and year, e.g. "Mar 2024".
/// Months outside 1–12 fall back to "13/2024".
pub fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%b %Y").to_string(),
        None => format!("{month}/{year}"),
    }
}

fn clamp_horizon(horizon_periods: i64) -> u32 {
    u32::try_from(horizon_periods.max(0)).unwrap_or(u32::MAX)
}
