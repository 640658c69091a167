//! Error types for the unified API.

use thiserror::Error;

use cairn_core::{CodecError, ValidationError};

/// Why peer data was turned away.
///
/// Malformed data could not be decoded and nothing past the fault can be
/// trusted. Invalid data decoded cleanly but failed a validation stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("malformed: {0}")]
    Malformed(#[from] CodecError),

    #[error("invalid: {0}")]
    Invalid(#[from] ValidationError),
}

impl Rejection {
    /// Whether the bytes themselves were bad.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Rejection::Malformed(_))
    }
}

/// Result type for intake operations.
pub type Result<T> = std::result::Result<T, Rejection>;
