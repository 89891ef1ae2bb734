//! Deterministic expansion of a 64-byte master seed into the keyed tables.
//!
//! Every table is a pure function of the master seed (and the requested key
//! length), so a key regenerated from its persisted seed is byte-identical
//! to the original. The derivations chain hash outputs: each step feeds the
//! full digest of the previous step back in as the next input, and the
//! reference ordering below is load-bearing because the measurement bases
//! consume the chaining seed left behind by the entanglement derivation.
//!
//! Order: superposition key, entanglement pairs, lattice basis, measurement
//! bases, checksum. The substitution box and round keys run on independent
//! chains rooted at the master seed.

use sha2::{Digest, Sha256, Sha512};

use crate::error::QcryptError;

/// Master seed size in bytes.
pub const MASTER_SEED_BYTES: usize = 64;
/// Number of rounds in the block transform, one 64-byte subkey each.
pub const ROUND_COUNT: usize = 16;
/// Size of a single round key.
pub const ROUND_KEY_BYTES: usize = 64;
/// Smallest accepted superposition key length.
pub const MIN_KEY_LENGTH: u64 = 1024;
/// Largest accepted superposition key length (1 GiB).
pub const MAX_KEY_LENGTH: u64 = 1 << 30;
/// Entanglement pair derivation is capped regardless of key length.
pub const MAX_ENTANGLEMENT_PAIRS: u64 = 1024;
/// Lattice dimension is capped regardless of key length.
pub const MAX_LATTICE_DIM: u64 = 256;

fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

fn sha512(data: &[u8]) -> [u8; 64] {
    Sha512::digest(data).into()
}

// Key-length-proportional buffers reserve fallibly; a refused reservation
// reports the byte count instead of aborting mid-expansion.
fn try_allocate<T>(vec: &mut Vec<T>, additional: usize) -> Result<(), QcryptError> {
    vec.try_reserve_exact(additional)
        .map_err(|_| QcryptError::AllocationFailure {
            requested: additional.saturating_mul(std::mem::size_of::<T>()),
        })
}

/// Expands the superposition keystream to exactly `key_length` bytes.
///
/// Returns the keystream together with the final chaining hash; the
/// entanglement derivation seeds from that hash. The chaining always
/// advances by the full 64-byte digest even when the last appended block
/// is truncated. The keystream buffer (up to 1 GiB) is reserved up front
/// and a refused reservation fails with `AllocationFailure` before any
/// hashing starts.
pub fn superposition_key(
    master_seed: &[u8; MASTER_SEED_BYTES],
    key_length: u64,
) -> Result<(Vec<u8>, [u8; 64]), QcryptError> {
    let target = key_length as usize;
    let mut out = Vec::new();
    try_allocate(&mut out, target)?;
    let mut seed = *master_seed;
    while out.len() < target {
        let hash = sha512(&seed);
        let take = (target - out.len()).min(hash.len());
        out.extend_from_slice(&hash[..take]);
        seed = hash;
    }
    Ok((out, seed))
}

/// Derives the entanglement pairs from the seed left by the superposition
/// expansion. The pairs themselves take no part in the block transform;
/// they exist for key identity display. The returned chaining seed feeds
/// the measurement bases.
pub fn entanglement_pairs(chain_seed: &[u8; 64], key_length: u64) -> (Vec<[u8; 64]>, Vec<u8>) {
    let count = (key_length / 128).min(MAX_ENTANGLEMENT_PAIRS) as usize;
    let mut pairs = Vec::with_capacity(count);
    let mut current: Vec<u8> = chain_seed.to_vec();
    for _ in 0..count {
        let pair_seed = sha256(&current);
        pairs.push(sha512(&pair_seed));
        current = pair_seed.to_vec();
    }
    (pairs, current)
}

/// Derives the D x D lattice basis, D = min(256, key_length / 8).
///
/// Entries are drawn row-major from an independent SHA-256 chain rooted at
/// the master seed; each lies in [1, 65536].
pub fn lattice_basis(
    master_seed: &[u8; MASTER_SEED_BYTES],
    key_length: u64,
) -> Result<Vec<Vec<i64>>, QcryptError> {
    let dim = (key_length / 8).min(MAX_LATTICE_DIM) as usize;
    let mut chain: Vec<u8> = master_seed.to_vec();
    let mut rows = Vec::new();
    try_allocate(&mut rows, dim)?;
    for _ in 0..dim {
        let mut row = Vec::new();
        try_allocate(&mut row, dim)?;
        for _ in 0..dim {
            let hash = sha256(&chain);
            let value = u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]]);
            row.push(i64::from(value % 65536) + 1);
            chain = hash.to_vec();
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Derives the measurement bases: one SHA-512 of the chaining seed left by
/// the entanglement derivation, repeated modulo 64 up to max(1, key_length/8).
pub fn measurement_bases(chain_seed: &[u8], key_length: u64) -> Result<Vec<u8>, QcryptError> {
    let len = (key_length / 8).max(1) as usize;
    let hash = sha512(chain_seed);
    let mut out = Vec::new();
    try_allocate(&mut out, len)?;
    for i in 0..len {
        out.push(hash[i % 64]);
    }
    Ok(out)
}

/// Builds the substitution permutation over 0..=255 and its inverse via a
/// hash-driven Fisher-Yates shuffle.
pub fn substitution_box(master_seed: &[u8; MASTER_SEED_BYTES]) -> ([u8; 256], [u8; 256]) {
    let mut sbox = [0u8; 256];
    for (i, slot) in sbox.iter_mut().enumerate() {
        *slot = i as u8;
    }
    let mut chain: Vec<u8> = master_seed.to_vec();
    for i in (1..=255usize).rev() {
        let hash = sha256(&chain);
        let j = usize::from(hash[0]) % (i + 1);
        sbox.swap(i, j);
        chain = hash.to_vec();
    }
    let mut inverse = [0u8; 256];
    for (i, &value) in sbox.iter().enumerate() {
        inverse[usize::from(value)] = i as u8;
    }
    (sbox, inverse)
}

/// Derives the 16 round keys by iterated SHA-512 over the master seed.
pub fn round_keys(master_seed: &[u8; MASTER_SEED_BYTES]) -> [[u8; ROUND_KEY_BYTES]; ROUND_COUNT] {
    let mut keys = [[0u8; ROUND_KEY_BYTES]; ROUND_COUNT];
    let mut chain = *master_seed;
    for key in keys.iter_mut() {
        chain = sha512(&chain);
        *key = chain;
    }
    keys
}

/// Key checksum: SHA-512 over the master seed followed by the first
/// min(1024, len) bytes of the superposition key.
pub fn key_checksum(master_seed: &[u8; MASTER_SEED_BYTES], superposition_key: &[u8]) -> [u8; 64] {
    let take = superposition_key.len().min(1024);
    let mut hasher = Sha512::new();
    hasher.update(master_seed);
    hasher.update(&superposition_key[..take]);
    hasher.finalize().into()
}

/// 32-byte key fingerprint: the leading half of SHA-512(master_seed).
pub fn key_fingerprint(master_seed: &[u8; MASTER_SEED_BYTES]) -> [u8; 32] {
    let hash = sha512(master_seed);
    let mut fingerprint = [0u8; 32];
    fingerprint.copy_from_slice(&hash[..32]);
    fingerprint
}
