use crate::errors::CoreError;
use crate::models::calculator::{CalculatorParams, CalculatorSummary};
use crate::services::projection_service::ProjectionService;

/// Longest horizon the public calculator accepts (100 years of months).
pub const MAX_CALCULATOR_HORIZON: i64 = 1200;

/// The public compound-interest calculator.
///
/// Validates form input once, then defers to the projection engine so the
/// calculator and the dashboards can never disagree.
pub struct CalculatorService {
    projection: ProjectionService,
}

impl CalculatorService {
    pub fn new() -> Self {
        Self {
            projection: ProjectionService::new(),
        }
    }

    /// Run the calculator.
    ///
    /// `growth = final_balance - total_contributed`. With a zero horizon the
    /// final balance is the initial amount and growth is zero.
    pub fn calculate(&self, params: &CalculatorParams) -> Result<CalculatorSummary, CoreError> {
        Self::validate(params)?;

        let points = self.projection.project_forward(
            params.initial_amount,
            params.growth_rate_percent,
            params.periodic_contribution,
            params.horizon_periods,
        );
        let final_balance = points.last().map_or(params.initial_amount, |p| p.balance);
        let total_contributed = self.projection.total_contributed(
            params.initial_amount,
            params.periodic_contribution,
            params.horizon_periods,
        );

        Ok(CalculatorSummary {
            points,
            final_balance,
            total_contributed,
            growth: final_balance - total_contributed,
        })
    }

    fn validate(params: &CalculatorParams) -> Result<(), CoreError> {
        let inputs = [
            ("Initial amount", params.initial_amount),
            ("Periodic contribution", params.periodic_contribution),
            ("Growth rate", params.growth_rate_percent),
        ];
        for (name, value) in inputs {
            if !value.is_finite() {
                return Err(CoreError::ValidationError(format!(
                    "{name} must be a finite number"
                )));
            }
        }

        if !(0..=MAX_CALCULATOR_HORIZON).contains(&params.horizon_periods) {
            return Err(CoreError::ValidationError(format!(
                "Horizon must be between 0 and {MAX_CALCULATOR_HORIZON} periods, got {}",
                params.horizon_periods
            )));
        }

        Ok(())
    }
}

impl Default for CalculatorService {
    fn default() -> Self {
        Self::new()
    }
}
