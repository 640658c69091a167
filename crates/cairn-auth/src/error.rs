//! Error types for the authorization module.

use cairn_core::CodecError;
use thiserror::Error;

/// Errors that can occur while producing or decoding authorizations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The external signer failed to produce a signature.
    #[error("signer {moniker} failed: {reason}")]
    SignerFailed { moniker: String, reason: String },

    /// Malformed credential in JSON form.
    #[error("invalid authorization: {0}")]
    InvalidAuthorization(String),

    /// Malformed canonical bytes.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthError>;
