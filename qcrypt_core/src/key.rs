use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use zeroize::Zeroize;

use crate::error::QcryptError;
use crate::expand::{
    entanglement_pairs, key_checksum, key_fingerprint, lattice_basis, measurement_bases,
    superposition_key, MASTER_SEED_BYTES, MAX_KEY_LENGTH, MIN_KEY_LENGTH,
};
use crate::rng;

/// A fully expanded key: the master seed plus every table derived from it.
///
/// All derived fields are pure functions of `master_seed` and `key_length`;
/// regenerating from those two values yields byte-identical tables. The
/// structure is never mutated after creation.
#[derive(Clone)]
pub struct QuantumKey {
    pub master_seed: [u8; MASTER_SEED_BYTES],
    pub superposition_key: Vec<u8>,
    pub entanglement_pairs: Vec<[u8; 64]>,
    pub lattice_basis: Vec<Vec<i64>>,
    pub measurement_bases: Vec<u8>,
    pub key_length: u64,
    pub created_at: i64,
    pub checksum: [u8; 64],
}

impl QuantumKey {
    /// Generates a fresh key of `key_length` bytes from the OS CSPRNG.
    pub fn generate(key_length: u64) -> Result<Self, QcryptError> {
        validate_key_length(key_length)?;
        let master_seed: [u8; MASTER_SEED_BYTES] = rng::random_array()?;
        Self::from_master_seed(master_seed, key_length, unix_now())
    }

    /// Expands all tables from an existing master seed.
    ///
    /// This is the regeneration path used when loading a persisted key; it
    /// must reproduce the original tables bit for bit. Fails with
    /// `AllocationFailure` when a key-length-proportional table cannot be
    /// reserved, leaving no partially constructed key behind.
    pub fn from_master_seed(
        master_seed: [u8; MASTER_SEED_BYTES],
        key_length: u64,
        created_at: i64,
    ) -> Result<Self, QcryptError> {
        let (superposition, sup_chain) = superposition_key(&master_seed, key_length)?;
        let (pairs, pair_chain) = entanglement_pairs(&sup_chain, key_length);
        let lattice = lattice_basis(&master_seed, key_length)?;
        let bases = measurement_bases(&pair_chain, key_length)?;
        let checksum = key_checksum(&master_seed, &superposition);
        debug!(
            "expanded key tables key_length={} pairs={} lattice_dim={} bases_len={}",
            key_length,
            pairs.len(),
            lattice.len(),
            bases.len()
        );
        Ok(Self {
            master_seed,
            superposition_key: superposition,
            entanglement_pairs: pairs,
            lattice_basis: lattice,
            measurement_bases: bases,
            key_length,
            created_at,
            checksum,
        })
    }

    /// 32-byte fingerprint identifying which key a container expects.
    pub fn fingerprint(&self) -> [u8; 32] {
        key_fingerprint(&self.master_seed)
    }

    pub fn lattice_dim(&self) -> usize {
        self.lattice_basis.len()
    }

    pub fn pair_count(&self) -> usize {
        self.entanglement_pairs.len()
    }
}

impl Drop for QuantumKey {
    fn drop(&mut self) {
        self.master_seed.zeroize();
        self.superposition_key.zeroize();
    }
}

/// Rejects lengths outside [1024, 1 GiB] before anything is allocated.
pub fn validate_key_length(requested: u64) -> Result<(), QcryptError> {
    if !(MIN_KEY_LENGTH..=MAX_KEY_LENGTH).contains(&requested) {
        return Err(QcryptError::InvalidKeyLength { requested });
    }
    Ok(())
}

fn unix_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(_) => 0,
    }
}
