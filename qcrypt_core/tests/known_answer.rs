//! Known-answer vectors for a fixed master seed.
//!
//! Every value below was produced by an independent implementation of the
//! same derivation chain, so these tests pin cross-platform byte-exactness
//! of the expander, the block transform (including its floating-point
//! layer), and the container framing.

use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use qcrypt_core::expand::{round_keys, substitution_box};
use qcrypt_core::{
    decrypt_payload, encrypt_payload_with_params, QCipher, QcryptError, QuantumKey,
    AUTH_TAG_BYTES, HEADER_BYTES,
};

const ZERO32: [u8; 32] = [0u8; 32];

fn sequential_seed() -> [u8; 64] {
    let mut seed = [0u8; 64];
    for (i, byte) in seed.iter_mut().enumerate() {
        *byte = i as u8;
    }
    seed
}

static FIXTURE_KEY: Lazy<QuantumKey> =
    Lazy::new(|| QuantumKey::from_master_seed(sequential_seed(), 1024, 0).unwrap());

fn seal_fixed(key: &QuantumKey, plaintext: &[u8]) -> Vec<u8> {
    encrypt_payload_with_params(key, plaintext, &ZERO32, &ZERO32, &ZERO32).unwrap()
}

#[test]
fn superposition_key_vector() {
    let key = &*FIXTURE_KEY;
    assert_eq!(key.superposition_key.len(), 1024);
    assert_eq!(
        hex::encode(&key.superposition_key[..32]),
        "ee4320ebaf3fdb4f2c832b137200c08e235e0fa7bbd0eb1740c7063ba8a0d151"
    );
    assert_eq!(
        hex::encode(&key.superposition_key[992..]),
        "6b68af8983d894f3e16c31081e59846b60e47aeaaebd17005444a00810bc0747"
    );
    let digest: [u8; 32] = Sha256::digest(&key.superposition_key).into();
    assert_eq!(
        hex::encode(digest),
        "fc31fb1900c327c901b1d211d2794fe00b72b43b84fea6dce7e7c0f46882a425"
    );
}

#[test]
fn round_key_vector() {
    let keys = round_keys(&sequential_seed());
    assert_eq!(
        hex::encode(&keys[0][..16]),
        "ee4320ebaf3fdb4f2c832b137200c08e"
    );
    assert_eq!(
        hex::encode(&keys[15][..16]),
        "7bf76ce0de0dd0c300e48c09911a0845"
    );
}

#[test]
fn sbox_vector() {
    let (sbox, _) = substitution_box(&sequential_seed());
    assert_eq!(hex::encode(&sbox[..16]), "5e46a0487ec3f1c989305d6e56a5634d");
    assert_eq!(hex::encode(&sbox[240..]), "60f20cd07c35700df575e1e4b13e01fd");
}

#[test]
fn lattice_vector() {
    let key = &*FIXTURE_KEY;
    assert_eq!(key.lattice_dim(), 128);
    assert_eq!(key.lattice_basis[0][..4], [60158, 51458, 19007, 11442]);
    assert_eq!(key.lattice_basis[127][124..], [63261, 3367, 32763, 13908]);
}

#[test]
fn measurement_bases_vector() {
    let key = &*FIXTURE_KEY;
    assert_eq!(key.measurement_bases.len(), 128);
    assert_eq!(
        hex::encode(&key.measurement_bases[..16]),
        "dfe1dfb27605461428bcafa0f431f5ae"
    );
}

#[test]
fn entanglement_pair_vector() {
    let key = &*FIXTURE_KEY;
    assert_eq!(key.pair_count(), 8);
    assert_eq!(
        hex::encode(&key.entanglement_pairs[0][..16]),
        "c006f9402ff0664a8496d93bf82500b8"
    );
    assert_eq!(
        hex::encode(&key.entanglement_pairs[7][..16]),
        "dfe1dfb27605461428bcafa0f431f5ae"
    );
}

#[test]
fn checksum_and_fingerprint_vector() {
    let key = &*FIXTURE_KEY;
    assert_eq!(
        hex::encode(key.checksum),
        "61c5c4fc710f25c6949738b75eda3c202a19f4d8d867efd0e6bbee3bfb023fb9\
         2ea3f553ea63b897d2d7064634236c1c8b9917637582f387c591215a76d2cc5e"
    );
    assert_eq!(
        hex::encode(key.fingerprint()),
        "ee4320ebaf3fdb4f2c832b137200c08e235e0fa7bbd0eb1740c7063ba8a0d151"
    );
}

#[test]
fn block_transform_vector() {
    let key = &*FIXTURE_KEY;
    let engine = QCipher::new(key);
    let mut block = [0u8; 64];
    for (i, byte) in block.iter_mut().enumerate() {
        *byte = i as u8;
    }
    let original = block;

    engine.encrypt_block(&mut block, 0, &ZERO32);
    assert_eq!(
        hex::encode(block),
        "0d3c67f69e0b1c01ab6b84f43cb2ee4b50f0dc3ae733cad02db7fcda97d7ed65\
         550efa462318c8d7f34a71d0e540b7d2ecfed113b8121c2b31961698e5e53cd6"
    );
    engine.decrypt_block(&mut block, 0, &ZERO32);
    assert_eq!(block, original);

    engine.encrypt_block(&mut block, 5, &ZERO32);
    assert_eq!(
        hex::encode(block),
        "c8fa2b62e4416b4e00d134071c193a9b143d5a2dcf2b8d17e8302cecae1d19d5\
         b935629647bce24a841f2f511e3377c03a005e3cda20338e084423376326f3a4"
    );
    engine.decrypt_block(&mut block, 5, &ZERO32);
    assert_eq!(block, original);
}

// The eleven-byte message pads to a single block; the container is exactly
// header + one block + tag.
#[test]
fn tiny_file_container_vector() {
    let key = &*FIXTURE_KEY;
    let container = seal_fixed(key, b"Hello World");
    assert_eq!(container.len(), 271);
    assert_eq!(container.len(), HEADER_BYTES + 64 + AUTH_TAG_BYTES);
    assert_eq!(
        hex::encode(&container[..16]),
        "51435259505401ee4320ebaf3fdb4f2c"
    );
    assert_eq!(container[135..143], 11u64.to_le_bytes());
    assert_eq!(
        hex::encode(&container[HEADER_BYTES..HEADER_BYTES + 64]),
        "c6ca96e0443a5f8b59194e00cea69f31ffd85e6403bb5198f912ef5489dc8c6f\
         bc4045e5c1b2b9c01964240bd8725747ec688f59028acb80e047bd2c3966c3f5"
    );
    assert_eq!(
        hex::encode(&container[container.len() - AUTH_TAG_BYTES..]),
        "8d28a83ab039ffa13a9a1b467abddff7efd5bc04092877132cba38e3d2ca6f03\
         3fa712ad9a772864d45de3fad92ceb6117902fb69ae7dcf97acb949e6288dbbc"
    );
    assert_eq!(decrypt_payload(key, &container).unwrap(), b"Hello World");
}

// A full 64-byte block gets no extra padding block.
#[test]
fn block_boundary_container_vector() {
    let key = &*FIXTURE_KEY;
    let container = seal_fixed(key, &[0u8; 64]);
    assert_eq!(container.len(), HEADER_BYTES + 64 + AUTH_TAG_BYTES);
    assert_eq!(
        hex::encode(&container[HEADER_BYTES..HEADER_BYTES + 64]),
        "74811781c23215085aa1d72b0f192523186151f5b919b49f5d374e3ca5dfd9b1\
         846f914e796a159f2cacc5b60d028729e26a02053789a3996a7c569842dac7e5"
    );
    assert_eq!(decrypt_payload(key, &container).unwrap(), [0u8; 64]);
}

#[test]
fn multi_block_container_vector() {
    let key = &*FIXTURE_KEY;
    let plaintext = [0xABu8; 200];
    let container = seal_fixed(key, &plaintext);
    let body = &container[HEADER_BYTES..container.len() - AUTH_TAG_BYTES];
    assert_eq!(body.len(), 256);
    let digest: [u8; 32] = Sha256::digest(body).into();
    assert_eq!(
        hex::encode(digest),
        "af415509e22dea94983bedc0c9310e81e79c31fc48f5daae8cbc15cd9ee06dec"
    );
    assert_eq!(
        hex::encode(&container[container.len() - AUTH_TAG_BYTES..]),
        "7f79fc6c79fd82ed3176702aff9c393bbe39f0c57645cb00904d6d1f01fdddd9\
         b33229b7c84d620d2a9a166c56f2e56f36d41a62953b6d3cc3352b1db9d7f055"
    );
    let recovered = decrypt_payload(key, &container).unwrap();
    assert_eq!(recovered.len(), 200);
    assert_eq!(recovered, plaintext);
}

#[test]
fn tampered_ciphertext_byte_fails_integrity() {
    let key = &*FIXTURE_KEY;
    let mut container = seal_fixed(key, b"Hello World");
    container[150] ^= 0x01;
    assert!(matches!(
        decrypt_payload(key, &container),
        Err(QcryptError::IntegrityFailure)
    ));
}

#[test]
fn wrong_key_is_not_reported_as_tampering() {
    let key_a = &*FIXTURE_KEY;
    let mut other_seed = [0u8; 64];
    for (i, byte) in other_seed.iter_mut().enumerate() {
        *byte = 0xFF - i as u8;
    }
    let key_b = QuantumKey::from_master_seed(other_seed, 1024, 0).unwrap();
    assert_eq!(
        hex::encode(key_b.fingerprint()),
        "50b456627beef81297a8cbcfc1c1929a1c3a26af644bf2028abca2f94e5e1175"
    );
    let container = seal_fixed(key_a, b"keyed to A");
    assert!(matches!(
        decrypt_payload(&key_b, &container),
        Err(QcryptError::WrongKey)
    ));
}
