use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::entry::{PerformanceEntry, Subject};
use crate::models::ledger::Ledger;

/// Earliest and latest years accepted for a performance entry.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2200;

/// Manages monthly performance entries for the portfolio and investors.
///
/// Entries are kept ordered by `(year, month)` inside the ledger. Duplicate
/// periods are allowed and keep their insertion order.
pub struct EntryService;

impl EntryService {
    pub fn new() -> Self {
        Self
    }

    /// Validate and insert a new entry at its chronological position.
    pub fn add_entry(&self, ledger: &mut Ledger, entry: PerformanceEntry) -> Result<(), CoreError> {
        self.validate_entry(ledger, &entry)?;
        log::debug!(
            "Adding performance entry {} for {} ({}-{:02})",
            entry.id,
            entry.subject,
            entry.year,
            entry.month
        );
        Self::ordered_insert(&mut ledger.entries, entry);
        Ok(())
    }

    /// Replace the figures of an existing entry, keeping its id and subject.
    /// The ledger is left untouched if the new values do not validate.
    pub fn update_entry(
        &self,
        ledger: &mut Ledger,
        entry_id: Uuid,
        updated: PerformanceEntry,
    ) -> Result<(), CoreError> {
        let idx = Self::position(ledger, entry_id)?;
        let old = ledger.entries.remove(idx);

        let replacement = PerformanceEntry {
            id: old.id,
            subject: old.subject,
            ..updated
        };

        if let Err(e) = self.validate_entry(ledger, &replacement) {
            ledger.entries.insert(idx, old);
            return Err(e);
        }

        Self::ordered_insert(&mut ledger.entries, replacement);
        Ok(())
    }

    /// Remove an entry by id and return it.
    pub fn remove_entry(&self, ledger: &mut Ledger, entry_id: Uuid) -> Result<PerformanceEntry, CoreError> {
        let idx = Self::position(ledger, entry_id)?;
        Ok(ledger.entries.remove(idx))
    }

    pub fn find<'a>(&self, ledger: &'a Ledger, entry_id: Uuid) -> Option<&'a PerformanceEntry> {
        ledger.entries.iter().find(|e| e.id == entry_id)
    }

    /// All entries recorded for `subject`, oldest period first.
    pub fn entries_for<'a>(&self, ledger: &'a Ledger, subject: &Subject) -> Vec<&'a PerformanceEntry> {
        ledger
            .entries
            .iter()
            .filter(|e| &e.subject == subject)
            .collect()
    }

    /// Owned, chronologically ordered copy of a subject's entries, ready to
    /// hand to the projection engine.
    pub fn series_input(&self, ledger: &Ledger, subject: &Subject) -> Vec<PerformanceEntry> {
        let mut entries: Vec<PerformanceEntry> = self
            .entries_for(ledger, subject)
            .into_iter()
            .cloned()
            .collect();
        // Stable: duplicate periods keep insertion order.
        entries.sort_by_key(PerformanceEntry::period);
        entries
    }

    /// Set or clear the notes on an existing entry.
    pub fn set_notes(
        &self,
        ledger: &mut Ledger,
        entry_id: Uuid,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let entry = ledger
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        entry.notes = notes;
        Ok(())
    }

    /// Validate an entry before it enters the ledger.
    ///
    /// Rules:
    /// - Month in 1–12, year in a plausible range
    /// - Any provided figure must be finite
    /// - Deposit and withdrawal must not be negative
    /// - Investor entries must reference a known investor
    pub fn validate_entry(&self, ledger: &Ledger, entry: &PerformanceEntry) -> Result<(), CoreError> {
        if !(1..=12).contains(&entry.month) {
            return Err(CoreError::ValidationError(format!(
                "Month must be between 1 and 12, got {}",
                entry.month
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&entry.year) {
            return Err(CoreError::ValidationError(format!(
                "Year {} is outside the supported range {MIN_YEAR}..={MAX_YEAR}",
                entry.year
            )));
        }

        let figures = [
            ("growth amount", entry.growth_amount),
            ("growth percentage", entry.growth_percentage),
            ("deposit", entry.deposit),
            ("withdrawal", entry.withdrawal),
        ];
        for (name, value) in figures {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(CoreError::ValidationError(format!(
                        "The {name} must be a finite number"
                    )));
                }
            }
        }

        for (name, value) in [("Deposit", entry.deposit), ("Withdrawal", entry.withdrawal)] {
            if value.is_some_and(|v| v < 0.0) {
                return Err(CoreError::ValidationError(format!(
                    "{name} cannot be negative"
                )));
            }
        }

        if let Subject::Investor(investor_id) = entry.subject {
            if !ledger.investors.iter().any(|i| i.id == investor_id) {
                return Err(CoreError::InvestorNotFound(investor_id.to_string()));
            }
        }

        Ok(())
    }

    /// Insert after every entry with the same or an earlier period.
    fn ordered_insert(entries: &mut Vec<PerformanceEntry>, entry: PerformanceEntry) {
        let period = entry.period();
        let pos = entries.partition_point(|e| e.period() <= period);
        entries.insert(pos, entry);
    }

    fn position(ledger: &Ledger, entry_id: Uuid) -> Result<usize, CoreError> {
        ledger
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))
    }
}

impl Default for EntryService {
    fn default() -> Self {
        Self::new()
    }
}
