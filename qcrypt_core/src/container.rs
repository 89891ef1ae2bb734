//! Ciphertext container framing.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic[6] "QCRYPT" || version[1] || fingerprint[32] || nonce[32]
//! || salt[32] || iv[32] || original_size[8] || ciphertext || auth_tag[64]
//! ```
//!
//! The salt is reserved and unused by the cipher. The auth tag is
//! SHA-512(ciphertext || key.checksum), so it detects both tampering and a
//! container sealed under a different key; the fingerprint check still runs
//! first so the two cases report distinct errors.

use log::debug;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

use crate::cipher::QCipher;
use crate::error::QcryptError;
use crate::key::QuantumKey;
use crate::rng;

pub const CONTAINER_MAGIC: [u8; 6] = *b"QCRYPT";
pub const CONTAINER_VERSION: u8 = 1;
pub const NONCE_BYTES: usize = 32;
pub const SALT_BYTES: usize = 32;
pub const IV_BYTES: usize = 32;
pub const FINGERPRINT_BYTES: usize = 32;
pub const AUTH_TAG_BYTES: usize = 64;

/// magic + version + fingerprint + nonce + salt + iv + original_size
pub const HEADER_BYTES: usize = 6 + 1 + FINGERPRINT_BYTES + NONCE_BYTES + SALT_BYTES + IV_BYTES + 8;

/// Smallest container that can pass parsing: header plus auth tag.
pub const MIN_CONTAINER_BYTES: usize = HEADER_BYTES + AUTH_TAG_BYTES;

/// Seals `plaintext` under `key` with fresh random nonce, salt, and IV.
pub fn encrypt_payload(key: &QuantumKey, plaintext: &[u8]) -> Result<Vec<u8>, QcryptError> {
    let nonce: [u8; NONCE_BYTES] = rng::random_array()?;
    let salt: [u8; SALT_BYTES] = rng::random_array()?;
    let iv: [u8; IV_BYTES] = rng::random_array()?;
    encrypt_payload_with_params(key, plaintext, &nonce, &salt, &iv)
}

/// Seals with caller-provided nonce/salt/IV. Deterministic; the random
/// drawing entry point above is a thin wrapper over this one.
pub fn encrypt_payload_with_params(
    key: &QuantumKey,
    plaintext: &[u8],
    nonce: &[u8; NONCE_BYTES],
    salt: &[u8; SALT_BYTES],
    iv: &[u8; IV_BYTES],
) -> Result<Vec<u8>, QcryptError> {
    if plaintext.is_empty() {
        return Err(QcryptError::InvalidInput);
    }
    let engine = QCipher::new(key);
    let ciphertext = engine.encrypt_stream(plaintext, nonce, iv);

    let mut out = Vec::with_capacity(HEADER_BYTES + ciphertext.len() + AUTH_TAG_BYTES);
    out.extend_from_slice(&CONTAINER_MAGIC);
    out.push(CONTAINER_VERSION);
    out.extend_from_slice(&key.fingerprint());
    out.extend_from_slice(nonce);
    out.extend_from_slice(salt);
    out.extend_from_slice(iv);
    out.extend_from_slice(&(plaintext.len() as u64).to_le_bytes());
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&auth_tag(&ciphertext, &key.checksum));
    debug!(
        "sealed payload plaintext_len={} ciphertext_len={} container_len={}",
        plaintext.len(),
        ciphertext.len(),
        out.len()
    );
    Ok(out)
}

/// Opens a sealed container. Checks run in a fixed order so callers get the
/// most specific error: size, magic, version, size-field sanity, key
/// fingerprint, auth tag. No plaintext is produced unless every check holds.
pub fn decrypt_payload(key: &QuantumKey, data: &[u8]) -> Result<Vec<u8>, QcryptError> {
    if data.len() < MIN_CONTAINER_BYTES {
        return Err(QcryptError::CorruptContainer("shorter than minimum size"));
    }
    if data[..6] != CONTAINER_MAGIC {
        return Err(QcryptError::CorruptContainer("magic mismatch"));
    }
    if data[6] != CONTAINER_VERSION {
        return Err(QcryptError::CorruptContainer("unsupported version"));
    }

    let mut nonce = [0u8; NONCE_BYTES];
    nonce.copy_from_slice(&data[39..71]);
    let mut iv = [0u8; IV_BYTES];
    iv.copy_from_slice(&data[103..135]);
    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&data[135..143]);
    let original_size = u64::from_le_bytes(size_bytes);
    if original_size > (data.len() as u64).saturating_mul(2) {
        return Err(QcryptError::CorruptContainer("implausible original size"));
    }

    let fingerprint = &data[7..39];
    if fingerprint.ct_eq(&key.fingerprint()).unwrap_u8() == 0 {
        return Err(QcryptError::WrongKey);
    }

    let body = &data[HEADER_BYTES..data.len() - AUTH_TAG_BYTES];
    let stored_tag = &data[data.len() - AUTH_TAG_BYTES..];
    if stored_tag.ct_eq(&auth_tag(body, &key.checksum)).unwrap_u8() == 0 {
        return Err(QcryptError::IntegrityFailure);
    }

    let engine = QCipher::new(key);
    let plaintext = engine.decrypt_stream(body, &nonce, &iv, original_size);
    debug!(
        "opened payload container_len={} plaintext_len={}",
        data.len(),
        plaintext.len()
    );
    Ok(plaintext)
}

fn auth_tag(ciphertext: &[u8], checksum: &[u8; 64]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(ciphertext);
    hasher.update(checksum);
    hasher.finalize().into()
}
