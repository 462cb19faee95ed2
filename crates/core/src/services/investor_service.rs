use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::entry::{PerformanceEntry, Subject};
use crate::models::investor::{Investor, InvestorProfile};
use crate::models::ledger::Ledger;

/// Manages investor accounts.
///
/// Usernames are unique across investors, compared case-insensitively.
pub struct InvestorService;

impl InvestorService {
    pub fn new() -> Self {
        Self
    }

    /// Validate and add a new investor.
    pub fn add_investor(&self, ledger: &mut Ledger, investor: Investor) -> Result<(), CoreError> {
        self.validate_profile(
            ledger,
            &investor.name,
            &investor.email,
            &investor.username,
            investor.starting_balance,
            None,
        )?;
        log::info!("Adding investor {} ({})", investor.username, investor.id);
        ledger.investors.push(investor);
        Ok(())
    }

    /// Replace an investor's editable profile fields.
    pub fn update_profile(
        &self,
        ledger: &mut Ledger,
        investor_id: Uuid,
        profile: InvestorProfile,
    ) -> Result<(), CoreError> {
        self.validate_profile(
            ledger,
            &profile.name,
            &profile.email,
            &profile.username,
            profile.starting_balance,
            Some(investor_id),
        )?;

        let investor = Self::find_mut(ledger, investor_id)?;
        investor.name = profile.name;
        investor.email = profile.email;
        investor.username = profile.username;
        investor.starting_balance = profile.starting_balance;
        investor.joined = profile.joined;
        Ok(())
    }

    /// Remove an investor together with all of their performance entries.
    /// Returns the removed investor and entries.
    pub fn remove_investor(
        &self,
        ledger: &mut Ledger,
        investor_id: Uuid,
    ) -> Result<(Investor, Vec<PerformanceEntry>), CoreError> {
        let idx = ledger
            .investors
            .iter()
            .position(|i| i.id == investor_id)
            .ok_or_else(|| CoreError::InvestorNotFound(investor_id.to_string()))?;
        let investor = ledger.investors.remove(idx);

        let subject = Subject::Investor(investor_id);
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut ledger.entries)
            .into_iter()
            .partition(|e| e.subject == subject);
        ledger.entries = kept;

        log::info!(
            "Removed investor {} and {} performance entries",
            investor.username,
            removed.len()
        );
        Ok((investor, removed))
    }

    pub fn find<'a>(&self, ledger: &'a Ledger, investor_id: Uuid) -> Option<&'a Investor> {
        ledger.investors.iter().find(|i| i.id == investor_id)
    }

    /// Case-insensitive lookup by login name.
    pub fn find_by_username<'a>(&self, ledger: &'a Ledger, username: &str) -> Option<&'a Investor> {
        let wanted = username.trim();
        ledger
            .investors
            .iter()
            .find(|i| i.username.eq_ignore_ascii_case(wanted))
    }

    /// Investors sorted by display name.
    pub fn list<'a>(&self, ledger: &'a Ledger) -> Vec<&'a Investor> {
        let mut investors: Vec<&Investor> = ledger.investors.iter().collect();
        investors.sort_by_key(|i| i.name.to_lowercase());
        investors
    }

    pub(crate) fn find_mut(ledger: &mut Ledger, investor_id: Uuid) -> Result<&mut Investor, CoreError> {
        ledger
            .investors
            .iter_mut()
            .find(|i| i.id == investor_id)
            .ok_or_else(|| CoreError::InvestorNotFound(investor_id.to_string()))
    }

    /// Validate profile fields. `existing` is the id being edited, which is
    /// allowed to keep its own username.
    fn validate_profile(
        &self,
        ledger: &Ledger,
        name: &str,
        email: &str,
        username: &str,
        starting_balance: f64,
        existing: Option<Uuid>,
    ) -> Result<(), CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::ValidationError("Investor name cannot be empty".into()));
        }
        if username.trim().is_empty() {
            return Err(CoreError::ValidationError("Username cannot be empty".into()));
        }
        if !is_plausible_email(email) {
            return Err(CoreError::ValidationError(format!(
                "'{email}' is not a valid email address"
            )));
        }
        if !starting_balance.is_finite() {
            return Err(CoreError::ValidationError(
                "Starting balance must be a finite number".into(),
            ));
        }

        let taken = ledger.investors.iter().any(|i| {
            Some(i.id) != existing && i.username.eq_ignore_ascii_case(username.trim())
        });
        if taken {
            return Err(CoreError::DuplicateUsername(username.to_string()));
        }

        Ok(())
    }
}

impl Default for InvestorService {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal shape check: something before and after a single '@', and a dot
/// in the domain.
pub(crate) fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
