use thiserror::Error;

/// Failure taxonomy for key handling and the encrypt/decrypt pipeline.
///
/// `WrongKey` and `IntegrityFailure` stay distinct so a caller can tell a
/// mismatched key apart from a tampered container.
#[derive(Debug, Error)]
pub enum QcryptError {
    #[error("key length {requested} is outside the supported range [1024, 1073741824]")]
    InvalidKeyLength { requested: u64 },

    #[error("cannot allocate {requested} bytes of key material")]
    AllocationFailure { requested: usize },

    #[error("input is empty")]
    InvalidInput,

    #[error("corrupt container: {0}")]
    CorruptContainer(&'static str),

    #[error("key fingerprint does not match this container")]
    WrongKey,

    #[error("authentication tag mismatch")]
    IntegrityFailure,

    #[error("system randomness unavailable")]
    RandomnessFailure(#[source] rand::Error),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
