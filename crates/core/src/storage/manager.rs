use std::path::Path;

use crate::errors::CoreError;
use crate::models::ledger::Ledger;

use super::crypto::{self, KdfParams};
use super::format::{SnapshotHeader, CURRENT_VERSION};

/// Save/load the ledger as password-encrypted snapshots.
///
/// Flow: Ledger → bincode → AES-256-GCM(Argon2id(password)) → INVT bytes
pub struct SnapshotManager {
    kdf: KdfParams,
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self {
            kdf: KdfParams::default(),
        }
    }

    /// Use custom Argon2 costs for new snapshots. Loading always uses the
    /// costs recorded in the file.
    pub fn with_kdf(kdf: KdfParams) -> Result<Self, CoreError> {
        kdf.check_bounds()?;
        Ok(Self { kdf })
    }

    pub fn save_to_bytes(&self, ledger: &Ledger, password: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;

        let salt = crypto::random_bytes()?;
        let key = crypto::derive_key(password, &salt, &self.kdf)?;
        let (nonce, ciphertext) = crypto::seal(&plaintext, &key)?;

        let header = SnapshotHeader {
            version: CURRENT_VERSION,
            kdf: self.kdf,
            salt,
            nonce,
            payload_len: ciphertext.len() as u64,
        };
        Ok(header.encode(&ciphertext))
    }

    pub fn load_from_bytes(&self, data: &[u8], password: &str) -> Result<Ledger, CoreError> {
        let (header, payload) = SnapshotHeader::decode(data)?;
        let key = crypto::derive_key(password, &header.salt, &header.kdf)?;
        let plaintext = crypto::open(payload, &key, &header.nonce)?;

        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))
    }

    pub fn save_to_file(&self, ledger: &Ledger, path: impl AsRef<Path>, password: &str) -> Result<(), CoreError> {
        let bytes = self.save_to_bytes(ledger, password)?;
        std::fs::write(path.as_ref(), bytes)?;
        log::info!("Ledger snapshot written to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from_file(&self, path: impl AsRef<Path>, password: &str) -> Result<Ledger, CoreError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.load_from_bytes(&bytes, password)
    }
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::new()
    }
}
