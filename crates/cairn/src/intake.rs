//! Decoding and validating structures received from peers.

use cairn_core::{decode_hex, CanonicalDecode, StateAction};

use crate::error::{Rejection, Result};

/// Decode `bytes` and run the structure's own validation.
pub fn accept<T>(bytes: &[u8]) -> Result<T>
where
    T: CanonicalDecode + StateAction,
{
    let value = T::from_canonical_bytes(bytes).map_err(|e| {
        tracing::warn!(error = %e, len = bytes.len(), "rejected malformed peer data");
        Rejection::Malformed(e)
    })?;
    value.is_valid().map_err(|e| {
        tracing::warn!(kind = %value.kind(), error = %e, "rejected invalid peer data");
        Rejection::Invalid(e)
    })?;
    Ok(value)
}

/// [`accept`] for the hex rendering.
pub fn accept_hex<T>(s: &str) -> Result<T>
where
    T: CanonicalDecode + StateAction,
{
    let bytes = decode_hex(s).map_err(|e| {
        tracing::warn!(error = %e, len = s.len(), "rejected malformed peer hex");
        Rejection::Malformed(e)
    })?;
    accept(&bytes)
}
