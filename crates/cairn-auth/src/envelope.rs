//! Authorization envelope: one actor's credential over a state action.
//!
//! An envelope is created empty and populated exactly once by
//! [`AuthorizationEnvelope::sign`]. Fields are only assigned after the
//! signer returns, so a half-signed envelope is never observable.
//!
//! ## Wire format
//!
//! `varint(flags)` followed by each present field as a length-prefixed
//! section, in flag-bit order. Absent fields are omitted, never zero-filled.
//!
//! | bit | field      |
//! |-----|------------|
//! | 0   | signature  |
//! | 1   | public key |
//! | 2   | moniker    |
//! | 3   | address    |

use serde_json::{json, Value as JsonValue};

use cairn_core::{
    decode_hex, derive_address, CanonicalReader, CanonicalWriter, CodecError, PublicKey, Sha256Hash,
    Signature, ValidationError,
};

use crate::error::{AuthError, Result};
use crate::signer::{Signable, Signer};

/// Above this many signable bytes the SHA-256 of the bytes is signed instead.
///
/// Fixed for signature interoperability.
pub const SIGN_HASH_THRESHOLD: usize = 8192;

mod flags {
    pub const SIGNATURE: u64 = 1 << 0;
    pub const PUBLIC_KEY: u64 = 1 << 1;
    pub const MONIKER: u64 = 1 << 2;
    pub const ADDRESS: u64 = 1 << 3;
    pub const ALL: u64 = SIGNATURE | PUBLIC_KEY | MONIKER | ADDRESS;
}

/// The message actually handed to the signature scheme.
pub fn signing_payload(signable: Vec<u8>) -> Vec<u8> {
    if signable.len() > SIGN_HASH_THRESHOLD {
        Sha256Hash::hash(&signable).0.to_vec()
    } else {
        signable
    }
}

/// A single signer's authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationEnvelope {
    signature: Option<Signature>,
    public_key: Option<PublicKey>,
    moniker: Option<String>,
    address: Option<String>,
}

impl AuthorizationEnvelope {
    /// An empty, unsigned envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorize `target` with `signer`.
    pub async fn sign<T: Signable + ?Sized>(target: &T, signer: &dyn Signer) -> Result<Self> {
        let message = signing_payload(target.signable_bytes());
        let signature = signer.sign(&message).await?;
        let public_key = signer.public_key();

        tracing::debug!(
            moniker = signer.moniker(),
            message_len = message.len(),
            "signed authorization"
        );

        Ok(Self {
            signature: Some(signature),
            public_key: Some(public_key),
            moniker: Some(signer.moniker().to_string()),
            address: Some(derive_address(&public_key)),
        })
    }

    /// Verify this authorization over `target`.
    pub fn verify<T: Signable + ?Sized>(&self, target: &T) -> std::result::Result<(), ValidationError> {
        self.verify_signable(target.signable_bytes())
    }

    /// Verify against already-computed signable bytes.
    pub fn verify_signable(&self, signable: Vec<u8>) -> std::result::Result<(), ValidationError> {
        let (signature, public_key) = match (&self.signature, &self.public_key) {
            (Some(s), Some(p)) => (s, p),
            _ => return Err(ValidationError::Unsigned),
        };
        let who = self.moniker.clone().unwrap_or_default();

        if let Some(address) = &self.address {
            if *address != derive_address(public_key) {
                return Err(ValidationError::AddressMismatch(who));
            }
        }

        let message = signing_payload(signable);
        public_key
            .verify(&message, signature)
            .map_err(|_| ValidationError::InvalidSignature(who))
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn moniker(&self) -> Option<&str> {
        self.moniker.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Presence bits of the populated fields.
    pub fn flags(&self) -> u64 {
        let mut bits = 0;
        if self.signature.is_some() {
            bits |= flags::SIGNATURE;
        }
        if self.public_key.is_some() {
            bits |= flags::PUBLIC_KEY;
        }
        if self.moniker.is_some() {
            bits |= flags::MONIKER;
        }
        if self.address.is_some() {
            bits |= flags::ADDRESS;
        }
        bits
    }

    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::new();
        w.put_varint(self.flags());
        if let Some(sig) = &self.signature {
            w.field_bytes(&sig.0);
        }
        if let Some(pk) = &self.public_key {
            w.field_bytes(&pk.0);
        }
        if let Some(moniker) = &self.moniker {
            w.field_str(moniker);
        }
        if let Some(address) = &self.address {
            w.field_str(address);
        }
        w.into_bytes()
    }

    pub fn from_canonical_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let mut r = CanonicalReader::new(bytes);
        let bits = r.read_varint()?;
        if bits & !flags::ALL != 0 {
            return Err(CodecError::Malformed(format!("unknown envelope flags {bits:#x}")));
        }

        let mut envelope = Self::new();
        if bits & flags::SIGNATURE != 0 {
            envelope.signature = Some(Signature::try_from(r.field_bytes()?)?);
        }
        if bits & flags::PUBLIC_KEY != 0 {
            envelope.public_key = Some(PublicKey::try_from(r.field_bytes()?)?);
        }
        if bits & flags::MONIKER != 0 {
            envelope.moniker = Some(r.field_str()?);
        }
        if bits & flags::ADDRESS != 0 {
            envelope.address = Some(r.field_str()?);
        }
        r.finish()?;
        Ok(envelope)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_canonical_bytes())
    }

    pub fn from_hex(s: &str) -> std::result::Result<Self, CodecError> {
        Self::from_canonical_bytes(&decode_hex(s)?)
    }

    /// Debug projection; absent fields are left out.
    pub fn to_json(&self) -> JsonValue {
        let mut map = serde_json::Map::new();
        if let Some(sig) = &self.signature {
            map.insert("signature".into(), json!(sig.to_hex()));
        }
        if let Some(pk) = &self.public_key {
            map.insert("publicKey".into(), json!(pk.to_hex()));
        }
        if let Some(moniker) = &self.moniker {
            map.insert("moniker".into(), json!(moniker));
        }
        if let Some(address) = &self.address {
            map.insert("address".into(), json!(address));
        }
        JsonValue::Object(map)
    }

    pub fn from_json(json: &JsonValue) -> Result<Self> {
        let map = json
            .as_object()
            .ok_or_else(|| AuthError::InvalidAuthorization("expected object".into()))?;
        let text = |key: &str| -> Result<Option<String>> {
            match map.get(key) {
                None => Ok(None),
                Some(JsonValue::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(AuthError::InvalidAuthorization(format!("{key} must be a string"))),
            }
        };

        Ok(Self {
            signature: text("signature")?.map(|s| Signature::from_hex(&s)).transpose()?,
            public_key: text("publicKey")?.map(|s| PublicKey::from_hex(&s)).transpose()?,
            moniker: text("moniker")?,
            address: text("address")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::LocalSigner;

    struct Memo(Vec<u8>);

    impl Signable for Memo {
        fn signable_bytes(&self) -> Vec<u8> {
            self.0.clone()
        }
    }

    fn alice() -> LocalSigner {
        LocalSigner::from_seed("alice", &[0xa1; 32])
    }

    #[tokio::test]
    async fn test_sign_populates_all_fields() {
        let memo = Memo(b"transfer 10".to_vec());
        let env = AuthorizationEnvelope::sign(&memo, &alice()).await.unwrap();

        assert_eq!(env.flags(), 0b1111);
        assert_eq!(env.moniker(), Some("alice"));
        assert_eq!(env.address(), Some(alice().address().as_str()));
        assert!(env.verify(&memo).is_ok());
    }

    #[tokio::test]
    async fn test_verify_detects_tampering() {
        let env = AuthorizationEnvelope::sign(&Memo(b"a".to_vec()), &alice())
            .await
            .unwrap();
        assert_eq!(
            env.verify(&Memo(b"b".to_vec())),
            Err(ValidationError::InvalidSignature("alice".into()))
        );
    }

    #[test]
    fn test_empty_envelope_is_unsigned() {
        let env = AuthorizationEnvelope::new();
        assert_eq!(env.flags(), 0);
        assert_eq!(env.to_canonical_bytes(), vec![0]);
        assert_eq!(env.verify(&Memo(vec![])), Err(ValidationError::Unsigned));
    }

    #[tokio::test]
    async fn test_large_targets_sign_their_hash() {
        let big = Memo(vec![7u8; SIGN_HASH_THRESHOLD + 1]);
        let env = AuthorizationEnvelope::sign(&big, &alice()).await.unwrap();

        let digest = Sha256Hash::hash(&big.0);
        env.public_key()
            .unwrap()
            .verify(&digest.0, env.signature().unwrap())
            .unwrap();
        assert!(env.verify(&big).is_ok());
    }

    #[tokio::test]
    async fn test_threshold_boundary_signs_raw_bytes() {
        let exact = Memo(vec![7u8; SIGN_HASH_THRESHOLD]);
        let env = AuthorizationEnvelope::sign(&exact, &alice()).await.unwrap();
        env.public_key()
            .unwrap()
            .verify(&exact.0, env.signature().unwrap())
            .unwrap();
    }

    #[tokio::test]
    async fn test_canonical_roundtrip() {
        let env = AuthorizationEnvelope::sign(&Memo(b"x".to_vec()), &alice())
            .await
            .unwrap();
        let decoded = AuthorizationEnvelope::from_hex(&env.to_hex()).unwrap();
        assert_eq!(decoded, env);
        assert_eq!(decoded.to_canonical_bytes(), env.to_canonical_bytes());
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let env = AuthorizationEnvelope::sign(&Memo(b"x".to_vec()), &alice())
            .await
            .unwrap();
        let back = AuthorizationEnvelope::from_json(&env.to_json()).unwrap();
        assert_eq!(back, env);
    }

    #[tokio::test]
    async fn test_forged_address_rejected() {
        let env = AuthorizationEnvelope::sign(&Memo(b"x".to_vec()), &alice())
            .await
            .unwrap();
        let mut json = env.to_json();
        json["address"] = serde_json::json!("00".repeat(20));
        let forged = AuthorizationEnvelope::from_json(&json).unwrap();
        assert_eq!(
            forged.verify(&Memo(b"x".to_vec())),
            Err(ValidationError::AddressMismatch("alice".into()))
        );
    }

    #[test]
    fn test_unknown_flags_rejected() {
        assert!(matches!(
            AuthorizationEnvelope::from_canonical_bytes(&[0x10]),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_truncated_envelope_is_fatal() {
        assert!(matches!(
            AuthorizationEnvelope::from_canonical_bytes(&[0x01, 0x40]),
            Err(CodecError::TruncatedInput { .. })
        ));
    }
}
