//! Error types for Cairn Core.
//!
//! Two tiers: [`CodecError`] is fatal (the byte stream cannot be trusted past
//! the fault), [`ValidationError`] describes well-formed data that failed a
//! validation stage.

use thiserror::Error;

use crate::action::ActionKind;

/// Fatal decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unsupported field type: {0}")]
    UnsupportedFieldType(String),

    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    #[error("unexpected kind: expected {expected}, got {got}")]
    UnexpectedKind { expected: ActionKind, got: ActionKind },

    #[error("unknown kind discriminant: {0}")]
    UnknownKind(u64),

    #[error("varint overflows target width")]
    VarIntOverflow,

    #[error("non-canonical encoding: {0}")]
    NonCanonical(String),

    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    #[error("malformed field: {0}")]
    Malformed(String),

    #[error("{0} trailing bytes after decoding")]
    TrailingBytes(usize),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for CodecError {
    fn from(e: hex::FromHexError) -> Self {
        CodecError::InvalidHex(e.to_string())
    }
}

/// Cryptographic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Domain validation errors.
///
/// The `Display` form is the error string reported to callers; each variant
/// names the validation stage that rejected the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid version: {0}.")]
    InvalidVersion(u64),

    #[error("Unsupported version: {0}.")]
    UnsupportedVersion(u64),

    #[error("Timestamp {timestamp} is outside the accepted window around {now}.")]
    TimestampOutOfWindow { timestamp: u64, now: u64 },

    #[error("Invalid cluster: {0}.")]
    InvalidCluster(String),

    #[error("Genesis must not reference a previous hash.")]
    GenesisWithPreviousHash,

    #[error("Previous hash is required above genesis.")]
    MissingPreviousHash,

    #[error("Previous hash is inconsistent with height {0}.")]
    InconsistentPreviousHash(u64),

    #[error("Difficulty {difficulty} exceeds the maximum of {max}.")]
    DifficultyOutOfBounds { difficulty: u64, max: u64 },

    #[error("Unsupported state action kind: {0}.")]
    UnsupportedKind(ActionKind),

    #[error("Invalid timestamp: {0}.")]
    InvalidTimestamp(u64),

    #[error("Element {index} is invalid: {reason}")]
    InvalidElement { index: usize, reason: String },

    #[error("Elements are not in ascending timestamp order at index {0}.")]
    OutOfOrder(usize),

    #[error("Too many elements: {count} exceeds {max}.")]
    TooManyElements { count: usize, max: usize },

    #[error("Merkle root mismatch: expected {expected}, computed {actual}.")]
    MerkleRootMismatch { expected: String, actual: String },

    #[error("Insufficient proof of work.")]
    InsufficientWork,

    #[error("At least one authorization is required.")]
    MissingAuthorization,

    #[error("Proposer authorization is required.")]
    ProposerAuthorizationRequired,

    #[error("Authorization is not signed.")]
    Unsigned,

    #[error("Invalid signature from {0}.")]
    InvalidSignature(String),

    #[error("Address does not match public key for {0}.")]
    AddressMismatch(String),

    #[error("Duplicate authorization from {0}.")]
    DuplicateSigner(String),

    #[error("Invalid state action body: {0}.")]
    InvalidBody(String),

    #[error("Ordered index is inconsistent: {0}.")]
    InconsistentIndex(String),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => {
                ValidationError::InvalidSignature(String::new())
            }
            CoreError::Codec(c) => ValidationError::InvalidBody(c.to_string()),
        }
    }
}
