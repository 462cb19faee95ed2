use serde::{Deserialize, Serialize};

use super::entry::PerformanceEntry;
use super::investor::Investor;
use super::settings::Settings;

/// The main data container. Everything in here gets serialized,
/// encrypted, and saved to a portable `.invt` snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Investor accounts
    pub investors: Vec<Investor>,

    /// Monthly performance entries for the portfolio and every investor
    pub entries: Vec<PerformanceEntry>,

    pub settings: Settings,

    /// Entries that have been removed but can be restored (undo support).
    #[serde(default)]
    pub trash: Vec<PerformanceEntry>,
}
