use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters, recorded in every snapshot header so they can
/// be raised later without breaking old files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    /// Lanes
    pub parallelism: u32,
}

impl KdfParams {
    /// Bounds accepted when reading a header; anything outside is treated
    /// as a corrupt or hostile file.
    pub const MEMORY_RANGE: std::ops::RangeInclusive<u32> = 8..=1_048_576;
    pub const TIME_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
    pub const PARALLELISM_RANGE: std::ops::RangeInclusive<u32> = 1..=16;

    pub fn check_bounds(&self) -> Result<(), CoreError> {
        let checks = [
            ("memory_cost", self.memory_cost, &Self::MEMORY_RANGE),
            ("time_cost", self.time_cost, &Self::TIME_RANGE),
            ("parallelism", self.parallelism, &Self::PARALLELISM_RANGE),
        ];
        for (name, value, range) in checks {
            if !range.contains(&value) {
                return Err(CoreError::InvalidFileFormat(format!(
                    "KDF {name} {value} outside {}..={}",
                    range.start(),
                    range.end()
                )));
            }
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Derive the snapshot key from a password with Argon2id.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN], CoreError> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Key derivation failed: {e}")))?;
    Ok(key)
}

/// Encrypt with AES-256-GCM under a fresh random nonce.
/// Returns the nonce and the ciphertext (auth tag appended).
pub fn seal(plaintext: &[u8], key: &[u8; KEY_LEN]) -> Result<([u8; NONCE_LEN], Vec<u8>), CoreError> {
    let nonce: [u8; NONCE_LEN] = random_bytes()?;
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;
    Ok((nonce, ciphertext))
}

/// Decrypt and authenticate. A wrong key or tampered data yields
/// `CoreError::Decryption`.
pub fn open(ciphertext: &[u8], key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    Ok(cipher.decrypt(Nonce::from_slice(nonce), ciphertext)?)
}

/// Fill an array from the OS CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| CoreError::Encryption(format!("Random generation failed: {e}")))?;
    Ok(bytes)
}
