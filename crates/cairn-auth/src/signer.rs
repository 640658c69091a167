//! Signers: the identities that produce authorizations.
//!
//! Signing is the only asynchronous operation in the ledger primitives. A
//! [`Signer`] may sit in front of a remote key service; [`LocalSigner`] holds
//! an in-process Ed25519 keypair.

use async_trait::async_trait;

use cairn_core::{derive_address, Keypair, PublicKey, Signature};

use crate::error::Result;

/// A named signing identity.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Human-readable identifier of the signer.
    fn moniker(&self) -> &str;

    /// The signer's public key.
    fn public_key(&self) -> PublicKey;

    /// The address derived from the public key.
    fn address(&self) -> String {
        derive_address(&self.public_key())
    }

    /// Sign a message. Single-shot: either a full signature or an error.
    async fn sign(&self, message: &[u8]) -> Result<Signature>;
}

/// Anything that can be authorized.
pub trait Signable {
    /// Canonical bytes of the target with authorizations excluded.
    fn signable_bytes(&self) -> Vec<u8>;
}

/// A signer backed by a keypair held in memory.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    moniker: String,
    keypair: Keypair,
}

impl LocalSigner {
    pub fn new(moniker: impl Into<String>, keypair: Keypair) -> Self {
        Self {
            moniker: moniker.into(),
            keypair,
        }
    }

    /// Deterministic signer from a 32-byte seed.
    pub fn from_seed(moniker: impl Into<String>, seed: &[u8; 32]) -> Self {
        Self::new(moniker, Keypair::from_seed(seed))
    }

    /// Signer with a freshly generated key.
    pub fn generate(moniker: impl Into<String>) -> Self {
        Self::new(moniker, Keypair::generate())
    }
}

#[async_trait]
impl Signer for LocalSigner {
    fn moniker(&self) -> &str {
        &self.moniker
    }

    fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        Ok(self.keypair.sign(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_signer_signs_verifiably() {
        let signer = LocalSigner::from_seed("alice", &[0x42; 32]);
        let signature = signer.sign(b"payload").await.unwrap();
        signer.public_key().verify(b"payload", &signature).unwrap();
        assert_eq!(signer.moniker(), "alice");
        assert_eq!(signer.address(), signer.public_key().address());
    }
}
