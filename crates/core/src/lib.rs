pub mod documents;
pub mod errors;
pub mod mail;
pub mod models;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use uuid::Uuid;

use documents::decode::{decode_entry, decode_investor, encode_entry, encode_investor};
use documents::traits::{Collection, DocumentStore};
use errors::CoreError;
use models::{
    calculator::{CalculatorParams, CalculatorSummary},
    entry::{PerformanceEntry, Subject},
    investor::{Investor, InvestorProfile},
    ledger::Ledger,
    series::GrowthChart,
    session::{Role, Session},
    settings::Settings,
};
use services::{
    auth_service::{hash_password, validate_new_password, AdminCredentials, AuthService},
    calculator_service::CalculatorService,
    chart_service::ChartService,
    entry_service::EntryService,
    investor_service::InvestorService,
};
use storage::manager::SnapshotManager;

/// Longest dashboard projection that can be configured (10 years of months).
const MAX_PROJECTION_HORIZON: u32 = 120;

/// Outcome of pulling records from a document store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub investors: usize,
    pub entries: usize,
    /// Documents that failed to decode or validate, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Main entry point for the investor dashboard core.
/// Holds the ledger and every service needed to operate on it.
///
/// Identity is never looked up ambiently: operations that depend on who is
/// asking take the [`Session`] returned by [`InvestorTracker::login`].
#[must_use]
pub struct InvestorTracker {
    ledger: Ledger,
    entry_service: EntryService,
    investor_service: InvestorService,
    chart_service: ChartService,
    calculator_service: CalculatorService,
    auth_service: AuthService,
    snapshots: SnapshotManager,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for InvestorTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestorTracker")
            .field("investors", &self.ledger.investors.len())
            .field("entries", &self.ledger.entries.len())
            .field("settings", &self.ledger.settings)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl InvestorTracker {
    /// Start with an empty ledger and default settings.
    pub fn create_new(admin: AdminCredentials) -> Self {
        Self::build(Ledger::default(), admin, SnapshotManager::new())
    }

    /// Wrap an existing ledger.
    pub fn from_ledger(ledger: Ledger, admin: AdminCredentials) -> Self {
        Self::build(ledger, admin, SnapshotManager::new())
    }

    /// Use a specific snapshot manager (e.g., cheaper KDF costs).
    pub fn with_snapshot_manager(mut self, snapshots: SnapshotManager) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Load a ledger from encrypted snapshot bytes.
    pub fn load_from_bytes(encrypted: &[u8], password: &str, admin: AdminCredentials) -> Result<Self, CoreError> {
        let snapshots = SnapshotManager::new();
        let ledger = snapshots.load_from_bytes(encrypted, password)?;
        Ok(Self::build(ledger, admin, snapshots))
    }

    /// Save the ledger to encrypted snapshot bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = self.snapshots.save_to_bytes(&self.ledger, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    pub fn load_from_file(path: &str, password: &str, admin: AdminCredentials) -> Result<Self, CoreError> {
        let snapshots = SnapshotManager::new();
        let ledger = snapshots.load_from_file(path, password)?;
        Ok(Self::build(ledger, admin, snapshots))
    }

    /// Clears the unsaved-changes flag on success.
    pub fn save_to_file(&mut self, path: &str, password: &str) -> Result<(), CoreError> {
        self.snapshots.save_to_file(&self.ledger, path, password)?;
        self.dirty = false;
        Ok(())
    }

    // ── Sessions ────────────────────────────────────────────────────

    /// Authenticate as the admin or an investor.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, CoreError> {
        self.auth_service.login(&self.ledger, username, password)
    }

    // ── Investors ───────────────────────────────────────────────────

    /// Create an investor account (admin only). With `password` set the
    /// investor can sign in immediately.
    #[allow(clippy::too_many_arguments)]
    pub fn add_investor(
        &mut self,
        session: &Session,
        name: &str,
        email: &str,
        username: &str,
        starting_balance: f64,
        joined: NaiveDate,
        password: Option<&str>,
    ) -> Result<Uuid, CoreError> {
        self.auth_service.require_admin(session)?;
        self.auth_service.ensure_not_admin_username(username)?;

        let mut investor = Investor::new(name.trim(), email.trim(), username.trim(), starting_balance, joined);
        if let Some(password) = password {
            validate_new_password(password)?;
            investor.password_hash = hash_password(password)?;
        }
        let id = investor.id;
        self.investor_service.add_investor(&mut self.ledger, investor)?;
        self.dirty = true;
        Ok(id)
    }

    /// Replace an investor's profile (admin only).
    pub fn update_investor(
        &mut self,
        session: &Session,
        investor_id: Uuid,
        profile: InvestorProfile,
    ) -> Result<(), CoreError> {
        self.auth_service.require_admin(session)?;
        self.auth_service.ensure_not_admin_username(&profile.username)?;
        self.investor_service
            .update_profile(&mut self.ledger, investor_id, profile)?;
        self.dirty = true;
        Ok(())
    }

    /// Delete an investor and their entries (admin only).
    pub fn remove_investor(&mut self, session: &Session, investor_id: Uuid) -> Result<Investor, CoreError> {
        self.auth_service.require_admin(session)?;
        let (investor, _entries) = self
            .investor_service
            .remove_investor(&mut self.ledger, investor_id)?;
        self.dirty = true;
        Ok(investor)
    }

    /// All investors, by name (admin only).
    pub fn list_investors(&self, session: &Session) -> Result<Vec<&Investor>, CoreError> {
        self.auth_service.require_admin(session)?;
        Ok(self.investor_service.list(&self.ledger))
    }

    /// One investor's record. Investors may only read their own.
    pub fn get_investor(&self, session: &Session, investor_id: Uuid) -> Result<&Investor, CoreError> {
        self.auth_service
            .require_view(session, &Subject::Investor(investor_id))?;
        self.investor_service
            .find(&self.ledger, investor_id)
            .ok_or_else(|| CoreError::InvestorNotFound(investor_id.to_string()))
    }

    /// Set an investor's password. Admins may reset anyone's; investors
    /// change their own by presenting the current password.
    pub fn set_investor_password(
        &mut self,
        session: &Session,
        investor_id: Uuid,
        current_password: Option<&str>,
        new_password: &str,
    ) -> Result<(), CoreError> {
        self.auth_service.set_investor_password(
            &mut self.ledger,
            session,
            investor_id,
            current_password,
            new_password,
        )?;
        self.dirty = true;
        Ok(())
    }

    // ── Performance Entries ─────────────────────────────────────────

    /// Record a monthly entry (admin only).
    pub fn add_entry(&mut self, session: &Session, entry: PerformanceEntry) -> Result<Uuid, CoreError> {
        self.auth_service.require_admin(session)?;
        let id = entry.id;
        self.entry_service.add_entry(&mut self.ledger, entry)?;
        self.dirty = true;
        Ok(id)
    }

    /// Record several entries atomically (admin only). If any entry is
    /// invalid, none are added.
    pub fn add_entries(&mut self, session: &Session, entries: Vec<PerformanceEntry>) -> Result<Vec<Uuid>, CoreError> {
        self.auth_service.require_admin(session)?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut staged = self.ledger.clone();
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            ids.push(entry.id);
            self.entry_service.add_entry(&mut staged, entry)?;
        }

        self.ledger = staged;
        self.dirty = true;
        Ok(ids)
    }

    /// Replace an entry's period and figures (admin only).
    pub fn update_entry(
        &mut self,
        session: &Session,
        entry_id: Uuid,
        updated: PerformanceEntry,
    ) -> Result<(), CoreError> {
        self.auth_service.require_admin(session)?;
        self.entry_service
            .update_entry(&mut self.ledger, entry_id, updated)?;
        self.dirty = true;
        Ok(())
    }

    /// Set or clear an entry's notes (admin only).
    pub fn set_entry_notes(
        &mut self,
        session: &Session,
        entry_id: Uuid,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        self.auth_service.require_admin(session)?;
        self.entry_service
            .set_notes(&mut self.ledger, entry_id, notes)?;
        self.dirty = true;
        Ok(())
    }

    /// Entries recorded for a subject, oldest period first.
    pub fn entries_for(&self, session: &Session, subject: &Subject) -> Result<Vec<&PerformanceEntry>, CoreError> {
        self.auth_service.require_view(session, subject)?;
        Ok(self.entry_service.entries_for(&self.ledger, subject))
    }

    /// One entry by id, if the session may view its subject.
    pub fn get_entry(&self, session: &Session, entry_id: Uuid) -> Result<&PerformanceEntry, CoreError> {
        let entry = self
            .entry_service
            .find(&self.ledger, entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        self.auth_service.require_view(session, &entry.subject)?;
        Ok(entry)
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.ledger.entries.len()
    }

    // ── Undo (Trash) ────────────────────────────────────────────────

    /// Remove an entry and keep it in the trash for undo (admin only).
    pub fn remove_entry_to_trash(&mut self, session: &Session, entry_id: Uuid) -> Result<PerformanceEntry, CoreError> {
        self.auth_service.require_admin(session)?;
        let removed = self
            .entry_service
            .remove_entry(&mut self.ledger, entry_id)?;
        self.ledger.trash.push(removed.clone());
        self.dirty = true;
        Ok(removed)
    }

    /// Restore the most recently trashed entry. Returns `None` if the trash
    /// is empty (admin only).
    pub fn undo_last_removal(&mut self, session: &Session) -> Result<Option<PerformanceEntry>, CoreError> {
        self.auth_service.require_admin(session)?;
        let Some(entry) = self.ledger.trash.pop() else {
            return Ok(None);
        };
        if let Err(e) = self.entry_service.add_entry(&mut self.ledger, entry.clone()) {
            // The entry's investor may be gone; keep it in the trash.
            self.ledger.trash.push(entry);
            return Err(e);
        }
        self.dirty = true;
        Ok(Some(entry))
    }

    /// Removed entries, oldest removal first (admin only).
    pub fn get_trash(&self, session: &Session) -> Result<&[PerformanceEntry], CoreError> {
        self.auth_service.require_admin(session)?;
        Ok(&self.ledger.trash)
    }

    /// Permanently drop everything in the trash (admin only).
    pub fn clear_trash(&mut self, session: &Session) -> Result<(), CoreError> {
        self.auth_service.require_admin(session)?;
        if !self.ledger.trash.is_empty() {
            self.ledger.trash.clear();
            self.dirty = true;
        }
        Ok(())
    }

    // ── Charts & Calculator ─────────────────────────────────────────

    /// Aggregate portfolio chart (admin only).
    pub fn portfolio_chart(&self, session: &Session) -> Result<GrowthChart, CoreError> {
        self.auth_service
            .require_view(session, &Subject::Portfolio)?;
        Ok(self.chart_service.portfolio_chart(&self.ledger))
    }

    /// One investor's chart. Investors may only view their own.
    pub fn investor_chart(&self, session: &Session, investor_id: Uuid) -> Result<GrowthChart, CoreError> {
        self.auth_service
            .require_view(session, &Subject::Investor(investor_id))?;
        self.chart_service.investor_chart(&self.ledger, investor_id)
    }

    /// The chart a session lands on: the portfolio for the admin, their own
    /// account for an investor.
    pub fn dashboard_chart(&self, session: &Session) -> Result<GrowthChart, CoreError> {
        match session.role() {
            Role::Admin => self.portfolio_chart(session),
            Role::Investor(id) => self.investor_chart(session, id),
        }
    }

    /// Public investment calculator; needs no session.
    pub fn calculate(&self, params: &CalculatorParams) -> Result<CalculatorSummary, CoreError> {
        self.calculator_service.calculate(params)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.ledger.settings
    }

    /// Replace the fund settings (admin only).
    pub fn update_settings(&mut self, session: &Session, settings: Settings) -> Result<(), CoreError> {
        self.auth_service.require_admin(session)?;

        let currency = settings.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{}'. Must be a 3-letter code (e.g., USD, EUR)",
                settings.currency
            )));
        }
        if !settings.portfolio_starting_balance.is_finite() || !settings.projection_contribution.is_finite() {
            return Err(CoreError::ValidationError(
                "Starting balance and contribution must be finite numbers".into(),
            ));
        }
        if settings.projection_horizon > MAX_PROJECTION_HORIZON {
            return Err(CoreError::ValidationError(format!(
                "Projection horizon of {} months exceeds maximum of {MAX_PROJECTION_HORIZON}",
                settings.projection_horizon
            )));
        }

        self.ledger.settings = Settings {
            currency: currency.to_uppercase(),
            ..settings
        };
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all entries as a JSON string (admin only).
    pub fn export_entries_to_json(&self, session: &Session) -> Result<String, CoreError> {
        self.auth_service.require_admin(session)?;
        serde_json::to_string_pretty(&self.ledger.entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize entries to JSON: {e}")))
    }

    /// Import entries from a JSON string (admin only). All entries are
    /// validated first; one bad entry rejects the whole batch.
    /// Returns the number of entries imported.
    pub fn import_entries_from_json(&mut self, session: &Session, json: &str) -> Result<usize, CoreError> {
        self.auth_service.require_admin(session)?;
        let entries: Vec<PerformanceEntry> = serde_json::from_str(json)?;
        let count = entries.len();
        self.add_entries(session, entries)?;
        Ok(count)
    }

    /// Pull investors and performance entries from a document store (admin
    /// only). Documents are decoded at this boundary; undecodable or invalid
    /// ones are skipped and reported. Records already in the ledger (same id)
    /// are left as they are.
    pub async fn import_from_store(
        &mut self,
        session: &Session,
        store: &dyn DocumentStore,
    ) -> Result<ImportReport, CoreError> {
        self.auth_service.require_admin(session)?;
        let mut report = ImportReport::default();

        for doc in store.list(Collection::Investors, None).await? {
            let result = decode_investor(&doc).and_then(|investor| {
                if self.investor_service.find(&self.ledger, investor.id).is_some() {
                    return Ok(false);
                }
                self.auth_service.ensure_not_admin_username(&investor.username)?;
                self.investor_service
                    .add_investor(&mut self.ledger, investor)
                    .map(|()| true)
            });
            match result {
                Ok(true) => report.investors += 1,
                Ok(false) => {}
                Err(e) => report.skipped.push((doc.id.clone(), e.to_string())),
            }
        }

        for doc in store.list(Collection::Performance, None).await? {
            let result = decode_entry(&doc).and_then(|entry| {
                if self.ledger.entries.iter().any(|e| e.id == entry.id) {
                    return Ok(false);
                }
                self.entry_service
                    .add_entry(&mut self.ledger, entry)
                    .map(|()| true)
            });
            match result {
                Ok(true) => report.entries += 1,
                Ok(false) => {}
                Err(e) => report.skipped.push((doc.id.clone(), e.to_string())),
            }
        }

        if report.investors > 0 || report.entries > 0 {
            self.dirty = true;
        }
        if !report.skipped.is_empty() {
            log::warn!(
                "Skipped {} documents while importing from {}",
                report.skipped.len(),
                store.name()
            );
        }
        log::info!(
            "Imported {} investors and {} entries from {}",
            report.investors,
            report.entries,
            store.name()
        );
        Ok(report)
    }

    /// Push every investor and entry to a document store (admin only).
    /// Returns the number of documents written.
    pub async fn export_to_store(&self, session: &Session, store: &dyn DocumentStore) -> Result<usize, CoreError> {
        self.auth_service.require_admin(session)?;

        let investor_docs = self.ledger.investors.iter().map(encode_investor);
        let entry_docs = self.ledger.entries.iter().map(encode_entry);

        let mut written = 0;
        for doc in investor_docs {
            store.put(Collection::Investors, &doc.id, doc.fields).await?;
            written += 1;
        }
        for doc in entry_docs {
            store.put(Collection::Performance, &doc.id, doc.fields).await?;
            written += 1;
        }
        Ok(written)
    }

    /// Export the full ledger as JSON for debugging (admin only).
    /// Password hashes are left out.
    pub fn to_json(&self, session: &Session) -> Result<String, CoreError> {
        self.auth_service.require_admin(session)?;

        let mut value = serde_json::to_value(&self.ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
        if let Some(investors) = value.get_mut("investors").and_then(|v| v.as_array_mut()) {
            for investor in investors.iter_mut().filter_map(|i| i.as_object_mut()) {
                investor.remove("passwordHash");
            }
        }
        serde_json::to_string_pretty(&value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(ledger: Ledger, admin: AdminCredentials, snapshots: SnapshotManager) -> Self {
        Self {
            ledger,
            entry_service: EntryService::new(),
            investor_service: InvestorService::new(),
            chart_service: ChartService::new(),
            calculator_service: CalculatorService::new(),
            auth_service: AuthService::new(admin),
            snapshots,
            dirty: false,
        }
    }
}
