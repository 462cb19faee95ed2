use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::entry::Subject;
use crate::models::ledger::Ledger;
use crate::models::series::GrowthChart;
use crate::services::entry_service::EntryService;
use crate::services::investor_service::InvestorService;
use crate::services::projection_service::{month_label, ProjectionService};

/// Generates chart-ready growth data for the admin and investor dashboards.
///
/// Both dashboards go through the same projection engine:
/// 1. Order the subject's entries by `(year, month)`
/// 2. Fold them onto the subject's starting balance
/// 3. Average the recorded growth rates
/// 4. Project the last balance forward with the configured contribution
pub struct ChartService {
    entry_service: EntryService,
    investor_service: InvestorService,
    projection: ProjectionService,
}

impl ChartService {
    pub fn new() -> Self {
        Self {
            entry_service: EntryService::new(),
            investor_service: InvestorService::new(),
            projection: ProjectionService::new(),
        }
    }

    /// Chart for the aggregate portfolio, starting from the configured
    /// portfolio balance.
    pub fn portfolio_chart(&self, ledger: &Ledger) -> GrowthChart {
        self.build_chart(
            ledger,
            Subject::Portfolio,
            ledger.settings.portfolio_starting_balance,
        )
    }

    /// Chart for one investor, starting from their recorded starting balance.
    pub fn investor_chart(&self, ledger: &Ledger, investor_id: Uuid) -> Result<GrowthChart, CoreError> {
        let investor = self
            .investor_service
            .find(ledger, investor_id)
            .ok_or_else(|| CoreError::InvestorNotFound(investor_id.to_string()))?;

        Ok(self.build_chart(
            ledger,
            Subject::Investor(investor_id),
            investor.starting_balance,
        ))
    }

    fn build_chart(&self, ledger: &Ledger, subject: Subject, starting_balance: f64) -> GrowthChart {
        let entries = self.entry_service.series_input(ledger, &subject);

        let history = self
            .projection
            .build_running_series(starting_balance, &entries, month_label);
        let last_balance = history.last().map_or(starting_balance, |p| p.balance);
        let average_growth_rate = self.projection.average_growth_rate(&entries);

        let projection = self.projection.project_forward(
            last_balance,
            average_growth_rate,
            ledger.settings.projection_contribution,
            i64::from(ledger.settings.projection_horizon),
        );

        GrowthChart {
            subject,
            history,
            projection,
            average_growth_rate,
            last_balance,
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
