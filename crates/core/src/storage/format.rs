use crate::errors::CoreError;

use super::crypto::{KdfParams, NONCE_LEN, SALT_LEN};

/// Magic bytes identifying a ledger snapshot.
pub const MAGIC: &[u8; 4] = b"INVT";

/// Current snapshot format version.
pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(3×4) + salt(16) + nonce(12) + payload_len(8)
pub const HEADER_LEN: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

/// Everything in front of the ciphertext.
///
/// Layout (integers little-endian):
/// ```text
/// [INVT: 4B] [version: 2B] [memory_cost: 4B] [time_cost: 4B]
/// [parallelism: 4B] [salt: 16B] [nonce: 12B] [payload_len: 8B]
/// [payload: AES-256-GCM ciphertext + tag]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub version: u16,
    pub kdf: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub payload_len: u64,
}

impl SnapshotHeader {
    /// Serialize the header followed by the payload.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        for value in [self.kdf.memory_cost, self.kdf.time_cost, self.kdf.parallelism] {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.payload_len.to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    /// Parse and validate a header. Returns it with the payload slice.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CoreError> {
        if data.len() < HEADER_LEN {
            return Err(CoreError::InvalidFileFormat(format!(
                "Snapshot too small: {} bytes, header needs {HEADER_LEN}",
                data.len()
            )));
        }

        let mut reader = Reader { data, pos: 0 };
        if &reader.take::<4>() != MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes — not a ledger snapshot".into(),
            ));
        }

        let version = u16::from_le_bytes(reader.take());
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf = KdfParams {
            memory_cost: u32::from_le_bytes(reader.take()),
            time_cost: u32::from_le_bytes(reader.take()),
            parallelism: u32::from_le_bytes(reader.take()),
        };
        kdf.check_bounds()?;

        let salt = reader.take();
        let nonce = reader.take();
        let payload_len = u64::from_le_bytes(reader.take());

        let rest = &data[reader.pos..];
        let payload = usize::try_from(payload_len)
            .ok()
            .and_then(|len| rest.get(..len))
            .ok_or_else(|| {
                CoreError::InvalidFileFormat(format!(
                    "Snapshot truncated: header declares {payload_len} payload bytes, found {}",
                    rest.len()
                ))
            })?;

        Ok((
            Self {
                version,
                kdf,
                salt,
                nonce,
                payload_len,
            },
            payload,
        ))
    }
}

/// Fixed-size reads over a buffer already checked to hold a full header.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        out
    }
}
