use serde::{Deserialize, Serialize};

/// Number of months projected on the dashboards unless configured otherwise.
pub const DEFAULT_PROJECTION_HORIZON: u32 = 12;

/// Fund-wide settings, stored inside the encrypted ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Currency code all amounts are expressed in (e.g., "USD").
    pub currency: String,

    /// Balance the aggregate portfolio series starts from.
    pub portfolio_starting_balance: f64,

    /// Fixed contribution added every projected month on dashboard charts.
    pub projection_contribution: f64,

    /// Number of months projected on dashboard charts.
    pub projection_horizon: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            portfolio_starting_balance: 0.0,
            projection_contribution: 0.0,
            projection_horizon: DEFAULT_PROJECTION_HORIZON,
        }
    }
}
