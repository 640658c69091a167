//! Ordered sets of authorizations.
//!
//! Uniqueness by moniker is an invariant of the container: [`insert`]
//! replaces an existing envelope from the same signer in place, so re-signing
//! never grows the set. Decoded peer data may still carry duplicates; those
//! are rejected by [`verify`].
//!
//! [`insert`]: MultiAuthorization::insert
//! [`verify`]: MultiAuthorization::verify

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use cairn_core::{CanonicalReader, CanonicalWriter, CodecError, ValidationError};

use crate::envelope::AuthorizationEnvelope;
use crate::error::Result;
use crate::signer::{Signable, Signer};

/// An ordered sequence of authorization envelopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiAuthorization {
    envelopes: Vec<AuthorizationEnvelope>,
}

impl MultiAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthorizationEnvelope> {
        self.envelopes.iter()
    }

    /// The envelope from `moniker`, if any.
    pub fn get(&self, moniker: &str) -> Option<&AuthorizationEnvelope> {
        self.envelopes.iter().find(|e| e.moniker() == Some(moniker))
    }

    pub fn contains(&self, moniker: &str) -> bool {
        self.get(moniker).is_some()
    }

    /// Monikers of every signer, in order.
    pub fn monikers(&self) -> Vec<&str> {
        self.envelopes.iter().filter_map(|e| e.moniker()).collect()
    }

    /// Insert an envelope, replacing any envelope with the same moniker.
    ///
    /// Returns the replaced envelope.
    pub fn insert(&mut self, envelope: AuthorizationEnvelope) -> Option<AuthorizationEnvelope> {
        let existing = envelope
            .moniker()
            .and_then(|m| self.envelopes.iter().position(|e| e.moniker() == Some(m)));
        match existing {
            Some(index) => Some(std::mem::replace(&mut self.envelopes[index], envelope)),
            None => {
                self.envelopes.push(envelope);
                None
            }
        }
    }

    pub fn remove(&mut self, moniker: &str) -> Option<AuthorizationEnvelope> {
        let index = self
            .envelopes
            .iter()
            .position(|e| e.moniker() == Some(moniker))?;
        Some(self.envelopes.remove(index))
    }

    /// Sign `target` and insert the result.
    ///
    /// The set is untouched if the signer fails.
    pub async fn sign<T: Signable + ?Sized>(&mut self, target: &T, signer: &dyn Signer) -> Result<()> {
        let envelope = AuthorizationEnvelope::sign(target, signer).await?;
        if self.insert(envelope).is_some() {
            tracing::debug!(moniker = signer.moniker(), "replaced existing authorization");
        }
        Ok(())
    }

    /// Logical AND over every member. An empty set is vacuously valid.
    pub fn verify<T: Signable + ?Sized>(&self, target: &T) -> std::result::Result<(), ValidationError> {
        if self.envelopes.is_empty() {
            return Ok(());
        }
        let signable = target.signable_bytes();
        let mut seen = HashSet::new();
        for envelope in &self.envelopes {
            if let Some(moniker) = envelope.moniker() {
                if !seen.insert(moniker) {
                    return Err(ValidationError::DuplicateSigner(moniker.to_string()));
                }
            }
            envelope.verify_signable(signable.clone())?;
        }
        Ok(())
    }

    /// `varint(count)` followed by each envelope as a length-prefixed blob.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::new();
        w.put_varint(self.envelopes.len() as u64);
        for envelope in &self.envelopes {
            w.field_bytes(&envelope.to_canonical_bytes());
        }
        w.into_bytes()
    }

    pub fn from_canonical_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let mut r = CanonicalReader::new(bytes);
        let count = r.read_varint()?;
        let mut envelopes = Vec::new();
        for _ in 0..count {
            envelopes.push(AuthorizationEnvelope::from_canonical_bytes(r.field_bytes()?)?);
        }
        r.finish()?;
        Ok(Self { envelopes })
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.envelopes.iter().map(AuthorizationEnvelope::to_json).collect())
    }

    pub fn from_json(json: &JsonValue) -> Result<Self> {
        let items = json.as_array().ok_or_else(|| {
            crate::error::AuthError::InvalidAuthorization("expected array".into())
        })?;
        let envelopes = items
            .iter()
            .map(AuthorizationEnvelope::from_json)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { envelopes })
    }
}

impl FromIterator<AuthorizationEnvelope> for MultiAuthorization {
    /// Collects with [`MultiAuthorization::insert`] semantics.
    fn from_iter<I: IntoIterator<Item = AuthorizationEnvelope>>(iter: I) -> Self {
        let mut multi = Self::new();
        for envelope in iter {
            multi.insert(envelope);
        }
        multi
    }
}
