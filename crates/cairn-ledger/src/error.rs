//! Error types for the ledger structures.

use thiserror::Error;

use cairn_auth::AuthError;
use cairn_core::{ActionKind, CodecError};

/// Errors from building, signing or decoding ledger structures.
///
/// Validation outcomes are reported separately as
/// [`cairn_core::ValidationError`].
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{kind} cannot be considered by a {target}")]
    UnsupportedKind {
        kind: ActionKind,
        target: &'static str,
    },

    #[error("hash proof for cluster {got} does not belong to cluster {expected}")]
    ClusterMismatch { expected: String, got: String },

    #[error("{target} at height {height} has no successor height")]
    HeightOverflow { height: u64, target: &'static str },

    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("authorization error: {0}")]
    Auth(#[from] AuthError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
