//! CSPRNG access for master seeds, nonces, salts, and IVs.
//!
//! All randomness flows through the OS-backed `OsRng`. Draws use the
//! fallible API so a refusing entropy source surfaces as
//! `QcryptError::RandomnessFailure` instead of a panic mid-operation.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::QcryptError;

/// Fills `buf` from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), QcryptError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(QcryptError::RandomnessFailure)
}

/// Draws a fixed-size array of random bytes.
pub fn random_array<const N: usize>() -> Result<[u8; N], QcryptError> {
    let mut out = [0u8; N];
    fill_random(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_differ() {
        let a: [u8; 32] = random_array().unwrap();
        let b: [u8; 32] = random_array().unwrap();
        assert_ne!(a, b);
    }
}
