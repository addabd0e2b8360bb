use thiserror::Error;

/// Failures surfaced by hashing, AccountID derivation, and base58-check
/// (de)coding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("expected a {expected}-byte hash, got {actual} bytes")]
    WrongHashLength { expected: usize, actual: usize },

    #[error("not valid hexadecimal")]
    BadHex,

    #[error("character outside the base58 alphabet")]
    BadBase58,

    #[error("base58-check payload too short to contain a checksum")]
    ChecksumTooShort,

    #[error("base58-check checksum mismatch")]
    ChecksumMismatch,

    #[error("base58-check version/prefix byte mismatch: expected {expected:#04x}, got {actual:#04x}")]
    PrefixMismatch { expected: u8, actual: u8 },
}
