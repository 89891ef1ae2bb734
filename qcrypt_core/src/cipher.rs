use log::debug;
use sha2::{Digest, Sha256};

use crate::block::{quantum_value, BLOCK_BYTES};
use crate::expand::{round_keys, substitution_box, ROUND_COUNT, ROUND_KEY_BYTES};
use crate::key::QuantumKey;

/// The runtime cipher engine: a borrowed key plus the tables derived from
/// its master seed at construction time.
///
/// Construction is idempotent and the engine is immutable, so independent
/// engines over the same key behave identically and may run in parallel
/// across files. Within one file, encryption is sequential because of the
/// ciphertext chaining.
pub struct QCipher<'a> {
    key: &'a QuantumKey,
    sbox: [u8; 256],
    inverse_sbox: [u8; 256],
    round_keys: [[u8; ROUND_KEY_BYTES]; ROUND_COUNT],
}

impl<'a> QCipher<'a> {
    pub fn new(key: &'a QuantumKey) -> Self {
        let (sbox, inverse_sbox) = substitution_box(&key.master_seed);
        let round_keys = round_keys(&key.master_seed);
        Self {
            key,
            sbox,
            inverse_sbox,
            round_keys,
        }
    }

    /// Runs the 16 forward rounds over one 64-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_BYTES], block_index: u64, nonce: &[u8; 32]) {
        let key_len = self.key.superposition_key.len().max(1);
        let bases_len = self.key.measurement_bases.len().max(1);
        let key_pos = (block_index % key_len as u64) as usize;
        let dim = self.key.lattice_basis.len();

        for round in 0..ROUND_COUNT {
            self.whiten(block, round, key_pos, key_len);
            for byte in block.iter_mut() {
                *byte = self.sbox[usize::from(*byte)];
            }
            self.quantum_xor(block, block_index, round, key_pos, bases_len, nonce);
            if round % 4 == 0 && dim > 0 {
                self.lattice_xor(block, block_index, round, nonce);
            }
            let shift = usize::from(self.round_keys[round][0]) % BLOCK_BYTES;
            if shift > 0 {
                block.rotate_right(shift);
            }
        }
    }

    /// Exact inverse of `encrypt_block`: rounds in reverse, each round's
    /// steps undone back to front. The XOR layers are their own inverses;
    /// only the rotation and substitution need dedicated inverse forms.
    pub fn decrypt_block(&self, block: &mut [u8; BLOCK_BYTES], block_index: u64, nonce: &[u8; 32]) {
        let key_len = self.key.superposition_key.len().max(1);
        let bases_len = self.key.measurement_bases.len().max(1);
        let key_pos = (block_index % key_len as u64) as usize;
        let dim = self.key.lattice_basis.len();

        for round in (0..ROUND_COUNT).rev() {
            let shift = usize::from(self.round_keys[round][0]) % BLOCK_BYTES;
            if shift > 0 {
                block.rotate_left(shift);
            }
            if round % 4 == 0 && dim > 0 {
                self.lattice_xor(block, block_index, round, nonce);
            }
            self.quantum_xor(block, block_index, round, key_pos, bases_len, nonce);
            for byte in block.iter_mut() {
                *byte = self.inverse_sbox[usize::from(*byte)];
            }
            self.whiten(block, round, key_pos, key_len);
        }
    }

    /// Chained encryption of a whole plaintext: 64-byte blocks, the final
    /// short block tail-padded with the pad length, first block masked by
    /// the IV (repeated modulo its 32 bytes), later blocks by the previous
    /// ciphertext block.
    pub fn encrypt_stream(&self, plaintext: &[u8], nonce: &[u8; 32], iv: &[u8; 32]) -> Vec<u8> {
        let block_count = (plaintext.len() + BLOCK_BYTES - 1) / BLOCK_BYTES;
        let mut out = Vec::with_capacity(block_count * BLOCK_BYTES);
        for index in 0..block_count {
            let start = index * BLOCK_BYTES;
            let chunk = &plaintext[start..plaintext.len().min(start + BLOCK_BYTES)];
            let mut block = [0u8; BLOCK_BYTES];
            block[..chunk.len()].copy_from_slice(chunk);
            if chunk.len() < BLOCK_BYTES {
                let pad = (BLOCK_BYTES - chunk.len()) as u8;
                for slot in block[chunk.len()..].iter_mut() {
                    *slot = pad;
                }
            }
            if index == 0 {
                for (j, byte) in block.iter_mut().enumerate() {
                    *byte ^= iv[j % iv.len()];
                }
            } else {
                let prev = &out[(index - 1) * BLOCK_BYTES..index * BLOCK_BYTES];
                for (j, byte) in block.iter_mut().enumerate() {
                    *byte ^= prev[j];
                }
            }
            self.encrypt_block(&mut block, index as u64, nonce);
            out.extend_from_slice(&block);
        }
        debug!(
            "encrypt_stream plaintext_len={} blocks={}",
            plaintext.len(),
            block_count
        );
        out
    }

    /// Chained decryption. A short trailing ciphertext block is tolerated
    /// by zero-padding before the block transform; the recovered buffer is
    /// truncated to `original_size`, which is authoritative (no pad check).
    pub fn decrypt_stream(
        &self,
        ciphertext: &[u8],
        nonce: &[u8; 32],
        iv: &[u8; 32],
        original_size: u64,
    ) -> Vec<u8> {
        let block_count = (ciphertext.len() + BLOCK_BYTES - 1) / BLOCK_BYTES;
        let mut out = Vec::with_capacity(block_count * BLOCK_BYTES);
        let mut prev: Vec<u8> = iv.to_vec();
        for index in 0..block_count {
            let start = index * BLOCK_BYTES;
            let chunk = &ciphertext[start..ciphertext.len().min(start + BLOCK_BYTES)];
            let mut block = [0u8; BLOCK_BYTES];
            block[..chunk.len()].copy_from_slice(chunk);
            let raw = block;
            self.decrypt_block(&mut block, index as u64, nonce);
            for (j, byte) in block.iter_mut().enumerate() {
                *byte ^= prev[j % prev.len()];
            }
            out.extend_from_slice(&block);
            prev = raw.to_vec();
        }
        out.truncate(original_size as usize);
        debug!(
            "decrypt_stream ciphertext_len={} blocks={} plaintext_len={}",
            ciphertext.len(),
            block_count,
            out.len()
        );
        out
    }

    fn whiten(&self, block: &mut [u8; BLOCK_BYTES], round: usize, key_pos: usize, key_len: usize) {
        let round_key = &self.round_keys[round];
        for (i, byte) in block.iter_mut().enumerate() {
            *byte ^= round_key[i % ROUND_KEY_BYTES]
                ^ self.key.superposition_key[(key_pos + i) % key_len];
        }
    }

    fn quantum_xor(
        &self,
        block: &mut [u8; BLOCK_BYTES],
        block_index: u64,
        round: usize,
        key_pos: usize,
        bases_len: usize,
        nonce: &[u8; 32],
    ) {
        let mut seed = [0u8; 33];
        seed[..32].copy_from_slice(nonce);
        for (i, byte) in block.iter_mut().enumerate() {
            seed[32] = self.key.measurement_bases[(key_pos + i) % bases_len];
            let index = block_index * BLOCK_BYTES as u64 + i as u64;
            *byte ^= quantum_value(&seed, index, round);
        }
    }

    fn lattice_xor(
        &self,
        block: &mut [u8; BLOCK_BYTES],
        block_index: u64,
        round: usize,
        nonce: &[u8; 32],
    ) {
        let dim = self.key.lattice_basis.len();
        let mut seed = [0u8; 35];
        seed[..32].copy_from_slice(nonce);
        seed[33] = round as u8;
        seed[34] = (block_index % 256) as u8;
        for (i, byte) in block.iter_mut().enumerate() {
            seed[32] = i as u8;
            let hash = Sha256::digest(seed);
            let row = usize::from(hash[0]) % dim;
            let col = usize::from(hash[1]) % dim;
            *byte ^= (self.key.lattice_basis[row][col] & 0xFF) as u8;
        }
    }
}
