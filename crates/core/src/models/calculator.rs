use serde::{Deserialize, Serialize};

use super::series::ProjectionPoint;

/// Inputs of the public investment calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorParams {
    /// Lump sum invested at the start
    pub initial_amount: f64,

    /// Amount added at the end of every period
    pub periodic_contribution: f64,

    /// Growth rate per period, in percent (2.0 means 2%)
    pub growth_rate_percent: f64,

    /// Number of periods to project
    pub horizon_periods: i64,
}

/// Result of a calculator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorSummary {
    /// Balance after every period
    pub points: Vec<ProjectionPoint>,

    /// Balance after the last period (the initial amount when the horizon is 0)
    pub final_balance: f64,

    /// Initial amount plus all periodic contributions
    pub total_contributed: f64,

    /// final_balance - total_contributed
    pub growth: f64,
}
