//! Test fixtures and helpers.
//!
//! Signers are derived from their moniker, so the same name always yields
//! the same key across runs.

use cairn_auth::LocalSigner;
use cairn_core::{ActionKind, Sha256Hash};
use cairn_ledger::{ActionRecord, ClusterBlock, HashProof, RelayBlock};

/// Reference clock for fixtures: 2025-01-14T16:00:00Z.
pub const FIXTURE_EPOCH_MS: u64 = 1_736_870_400_000;

/// Cluster used by fixtures unless told otherwise.
pub const FIXTURE_CLUSTER: &str = "core.banking";

/// Deterministic signer for `moniker`.
pub fn signer(moniker: &str) -> LocalSigner {
    let seed = Sha256Hash::hash(moniker.as_bytes());
    LocalSigner::from_seed(moniker, seed.as_bytes())
}

/// A named participant with a deterministic signer.
pub struct TestFixture {
    pub signer: LocalSigner,
    pub moniker: String,
    pub cluster: String,
}

impl TestFixture {
    pub fn new(moniker: &str) -> Self {
        Self {
            signer: signer(moniker),
            moniker: moniker.to_string(),
            cluster: FIXTURE_CLUSTER.to_string(),
        }
    }

    /// A signed action at `FIXTURE_EPOCH_MS + offset_ms`.
    pub async fn action(&self, kind: ActionKind, offset_ms: u64) -> ActionRecord {
        ActionRecord::builder(kind)
            .timestamp(FIXTURE_EPOCH_MS + offset_ms)
            .field("actor", self.moniker.as_str())
            .field("offset", offset_ms)
            .sign(&self.signer)
            .await
            .expect("local signer never fails")
    }

    /// A genesis proof proposed by this participant holding one transaction
    /// per offset.
    pub async fn proof(&self, offsets: &[u64]) -> HashProof {
        let mut proof = HashProof::genesis(&self.cluster, &self.moniker, FIXTURE_EPOCH_MS);
        for &offset in offsets {
            proof
                .consider(self.action(ActionKind::Transaction, offset).await)
                .expect("transactions are proof elements");
        }
        proof
    }

    /// An empty relay block proposed and signed by this participant.
    pub async fn signed_relay(&self, epoch: u64) -> RelayBlock {
        let mut block = RelayBlock::new(epoch, &self.moniker, FIXTURE_EPOCH_MS);
        block
            .sign(&self.signer)
            .await
            .expect("local signer never fails");
        block
    }

    /// A cluster block over `proof`, proposed and signed by this participant.
    pub async fn signed_cluster_block(&self, proof: &HashProof) -> ClusterBlock {
        let mut block = ClusterBlock::new(&self.cluster, &self.moniker, FIXTURE_EPOCH_MS);
        block.consider(proof).expect("proof belongs to the fixture cluster");
        block
            .sign(&self.signer)
            .await
            .expect("local signer never fails");
        block
    }
}

/// One fixture per moniker.
pub fn multi_party_fixtures(monikers: &[&str]) -> Vec<TestFixture> {
    monikers.iter().map(|m| TestFixture::new(m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_auth::Signer;
    use cairn_core::StateAction;
    use cairn_ledger::LedgerConfig;

    #[test]
    fn test_signers_are_deterministic() {
        assert_eq!(signer("alice").public_key(), signer("alice").public_key());
        assert_ne!(signer("alice").public_key(), signer("bob").public_key());
    }

    #[tokio::test]
    async fn test_fixture_action_is_valid() {
        let alice = TestFixture::new("alice");
        let action = alice.action(ActionKind::Transfer, 10).await;
        assert_eq!(action.timestamp, FIXTURE_EPOCH_MS + 10);
        assert!(action.is_valid().is_ok());
    }

    #[tokio::test]
    async fn test_fixture_blocks_validate() {
        let alice = TestFixture::new("alice");
        let proof = alice.proof(&[3, 1, 2]).await;
        assert_eq!(
            proof.validate_at(FIXTURE_EPOCH_MS, &LedgerConfig::default()),
            Ok(())
        );

        assert_eq!(alice.signed_relay(1).await.validate(), Ok(()));
        assert_eq!(alice.signed_cluster_block(&proof).await.validate(), Ok(()));
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(&["alice", "bob", "carol"]);
        let keys: Vec<_> = parties.iter().map(|p| p.signer.public_key()).collect();
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
    }
}
