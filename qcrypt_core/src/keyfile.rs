//! Key container serialization.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! offset 0    magic[4] "QKEY"
//! offset 4    version[1]
//! offset 5    key_length[8]
//! offset 13   created_at[8]   (signed seconds, stored raw)
//! offset 21   master_seed[64]
//! offset 85   checksum[64]
//! offset 149  bases_length[4]
//! offset 153  measurement_bases[bases_length]
//! ```
//!
//! Only the minimal material is persisted. Loading regenerates the
//! superposition key, entanglement pairs, and lattice basis from the master
//! seed; the measurement bases are taken verbatim from the file so the
//! reader never depends on the expander's chaining state. The reader and
//! writer agree on the offsets above exactly.

use std::fs;
use std::path::Path;

use log::debug;
use subtle::ConstantTimeEq;

use crate::error::QcryptError;
use crate::key::{validate_key_length, QuantumKey};

pub const KEY_MAGIC: [u8; 4] = *b"QKEY";
pub const KEY_VERSION: u8 = 1;

/// Fixed-size prefix before the measurement bases.
pub const KEY_HEADER_BYTES: usize = 4 + 1 + 8 + 8 + 64 + 64 + 4;

/// Serializes a key to the container layout.
pub fn encode_key(key: &QuantumKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(KEY_HEADER_BYTES + key.measurement_bases.len());
    out.extend_from_slice(&KEY_MAGIC);
    out.push(KEY_VERSION);
    out.extend_from_slice(&key.key_length.to_le_bytes());
    out.extend_from_slice(&(key.created_at as u64).to_le_bytes());
    out.extend_from_slice(&key.master_seed);
    out.extend_from_slice(&key.checksum);
    out.extend_from_slice(&(key.measurement_bases.len() as u32).to_le_bytes());
    out.extend_from_slice(&key.measurement_bases);
    out
}

/// Parses a key container and regenerates every derived table.
///
/// The stored checksum must match the checksum recomputed from the
/// regenerated superposition key; a mismatch means the seed or checksum
/// bytes were damaged on disk.
pub fn decode_key(data: &[u8]) -> Result<QuantumKey, QcryptError> {
    if data.len() < KEY_HEADER_BYTES {
        return Err(QcryptError::CorruptContainer("key file shorter than minimum"));
    }
    if data[..4] != KEY_MAGIC {
        return Err(QcryptError::CorruptContainer("key magic mismatch"));
    }
    if data[4] != KEY_VERSION {
        return Err(QcryptError::CorruptContainer("unsupported key version"));
    }

    let mut length_bytes = [0u8; 8];
    length_bytes.copy_from_slice(&data[5..13]);
    let key_length = u64::from_le_bytes(length_bytes);

    let mut created_bytes = [0u8; 8];
    created_bytes.copy_from_slice(&data[13..21]);
    let created_at = u64::from_le_bytes(created_bytes) as i64;

    let mut master_seed = [0u8; 64];
    master_seed.copy_from_slice(&data[21..85]);

    let mut stored_checksum = [0u8; 64];
    stored_checksum.copy_from_slice(&data[85..149]);

    let mut bases_bytes = [0u8; 4];
    bases_bytes.copy_from_slice(&data[149..153]);
    let bases_length = u32::from_le_bytes(bases_bytes) as usize;
    if data.len() != KEY_HEADER_BYTES + bases_length {
        return Err(QcryptError::CorruptContainer("bases length mismatch"));
    }

    validate_key_length(key_length)?;

    let mut key = QuantumKey::from_master_seed(master_seed, key_length, created_at)?;
    if key.checksum.ct_eq(&stored_checksum).unwrap_u8() == 0 {
        return Err(QcryptError::CorruptContainer("key checksum mismatch"));
    }
    key.measurement_bases = data[KEY_HEADER_BYTES..].to_vec();
    debug!(
        "loaded key key_length={} bases_len={} created_at={}",
        key.key_length,
        key.measurement_bases.len(),
        key.created_at
    );
    Ok(key)
}

/// Writes the key container to disk as a single whole-file write.
pub fn save_key(path: &Path, key: &QuantumKey) -> Result<(), QcryptError> {
    fs::write(path, encode_key(key))?;
    Ok(())
}

/// Reads and parses a key container from disk.
pub fn load_key(path: &Path) -> Result<QuantumKey, QcryptError> {
    let data = fs::read(path)?;
    decode_key(&data)
}
