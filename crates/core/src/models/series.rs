use serde::{Deserialize, Serialize};

use super::entry::Subject;

/// One point of a historical running-balance series.
///
/// Derived on demand from performance entries, never persisted.
/// The entry's own growth and flow figures are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningPoint {
    /// Display label for the period (e.g., "Mar 2024")
    pub label: String,

    /// Balance after applying this period's growth and flows
    pub balance: f64,

    pub growth: Option<f64>,

    pub growth_percentage: Option<f64>,

    pub deposit: Option<f64>,

    pub withdrawal: Option<f64>,
}

/// One point of a forward projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    /// 1-based index of the projected period
    pub period_index: u32,

    pub balance: f64,
}

/// Chart-ready data for a dashboard: history followed by projection.
///
/// The core computes every number; the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthChart {
    pub subject: Subject,

    /// Running balance per recorded month, oldest first
    pub history: Vec<RunningPoint>,

    /// Projected balances after the last recorded month
    pub projection: Vec<ProjectionPoint>,

    /// Mean monthly growth rate used for the projection, in percent
    pub average_growth_rate: f64,

    /// Balance the projection starts from
    pub last_balance: f64,
}
