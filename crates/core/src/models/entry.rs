use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whose performance a monthly entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    /// The aggregate fund / portfolio
    Portfolio,
    /// A single investor's account
    Investor(Uuid),
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Portfolio => write!(f, "Portfolio"),
            Subject::Investor(id) => write!(f, "Investor({id})"),
        }
    }
}

/// One month of recorded performance for the portfolio or an investor.
///
/// Amount fields are optional: records coming from the document store may
/// omit them. The projection engine treats a missing or non-finite amount as
/// zero and leaves a missing percentage out of averages.
///
/// `(year, month)` pairs are not unique per subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    pub id: Uuid,

    pub subject: Subject,

    pub year: i32,

    /// Calendar month, 1–12
    pub month: u32,

    /// Growth contributed this period (signed)
    #[serde(default)]
    pub growth_amount: Option<f64>,

    /// Growth rate this period relative to the prior balance, in percent
    #[serde(default)]
    pub growth_percentage: Option<f64>,

    /// Capital added this period
    #[serde(default)]
    pub deposit: Option<f64>,

    /// Capital removed this period
    #[serde(default)]
    pub withdrawal: Option<f64>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl PerformanceEntry {
    pub fn new(subject: Subject, year: i32, month: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            year,
            month,
            growth_amount: None,
            growth_percentage: None,
            deposit: None,
            withdrawal: None,
            notes: None,
        }
    }

    /// Builder-style setter for the period's growth figures.
    pub fn with_growth(mut self, amount: f64, percentage: f64) -> Self {
        self.growth_amount = Some(amount);
        self.growth_percentage = Some(percentage);
        self
    }

    /// Builder-style setter for the period's capital flows.
    pub fn with_flows(mut self, deposit: f64, withdrawal: f64) -> Self {
        self.deposit = Some(deposit);
        self.withdrawal = Some(withdrawal);
        self
    }

    /// Sort key for chronological ordering.
    pub fn period(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

/// Coerce an optional amount to a finite number, defaulting to zero.
pub(crate) fn finite_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
