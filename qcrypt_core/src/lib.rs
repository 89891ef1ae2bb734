//! Core engine for qcrypt: deterministic, authenticated file encryption
//! built entirely from hash-derived tables.
//!
//! The quantum vocabulary (superposition key, entanglement pairs,
//! measurement bases, lattice basis) names derivations, not physics: every
//! table is a classical, reproducible expansion of a 64-byte master seed.
//! The construction is educational and should **not** be used for
//! production security.

pub mod block;
pub mod cipher;
pub mod container;
pub mod error;
pub mod expand;
pub mod key;
pub mod keyfile;
pub mod rng;

pub use crate::block::BLOCK_BYTES;
pub use crate::cipher::QCipher;
pub use crate::container::{
    decrypt_payload, encrypt_payload, encrypt_payload_with_params, AUTH_TAG_BYTES,
    CONTAINER_MAGIC, CONTAINER_VERSION, HEADER_BYTES, MIN_CONTAINER_BYTES,
};
pub use crate::error::QcryptError;
pub use crate::expand::{MASTER_SEED_BYTES, MAX_KEY_LENGTH, MIN_KEY_LENGTH, ROUND_COUNT};
pub use crate::key::QuantumKey;
pub use crate::keyfile::{decode_key, encode_key, load_key, save_key};
