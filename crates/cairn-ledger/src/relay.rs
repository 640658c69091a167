//! Relay blocks: epoch-scoped aggregation of state actions and cluster
//! announcements under one merkle root.
//!
//! Authorizations are made over the header alone. The header commits to the
//! payload through its merkle root, so a payload edited without resealing is
//! reported as a root mismatch while the signatures still check out.
//!
//! ## Wire format
//!
//! ```text
//! varint(RELAYBLOCK) || varint(version)
//!   || [epoch] || [height] || [previous hash | empty] || [timestamp]
//!   || [proposer] || [merkle root]
//!   || [varint(count) || [action]*]
//!   || [varint(count) || ([moniker] || [hash])*]
//!   || [authorizations]
//! ```

use serde_json::{json, Value as JsonValue};

use cairn_auth::{AuthorizationEnvelope, MultiAuthorization, Signable, Signer};
use cairn_core::{
    ActionKind, CanonicalDecode, CanonicalReader, CanonicalWriter, CodecError, Sha256Hash,
    StateAction, ValidationError,
};

use crate::clock::now_millis;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::merkle::merkle_root;
use crate::record::ActionRecord;
use crate::validation::{check_cluster_name, check_proposer_authorizations};

/// Current encoding version of [`RelayBlock`].
pub const RELAY_BLOCK_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayBlockHeader {
    pub version: u64,
    pub epoch: u64,
    pub height: u64,
    pub previous_hash: Option<Sha256Hash>,
    /// Unix milliseconds; advanced as actions arrive.
    pub timestamp: u64,
    /// Moniker whose authorization the block requires.
    pub proposer: String,
    pub merkle_root: Sha256Hash,
}

impl RelayBlockHeader {
    fn write_fields(&self, w: &mut CanonicalWriter) {
        w.field_u64(self.epoch)
            .field_u64(self.height)
            .field_opt_hash(self.previous_hash.as_ref())
            .field_u64(self.timestamp)
            .field_str(&self.proposer)
            .field_hash(&self.merkle_root);
    }

    fn read_fields(r: &mut CanonicalReader<'_>, version: u64) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            version,
            epoch: r.field_u64()?,
            height: r.field_u64()?,
            previous_hash: r.field_opt_hash()?,
            timestamp: r.field_u64()?,
            proposer: r.field_str()?,
            merkle_root: r.field_hash()?,
        })
    }

    /// Canonical bytes of the header alone, framed with the block kind.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::with_header(ActionKind::RelayBlock, self.version);
        self.write_fields(&mut w);
        w.into_bytes()
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "version": self.version,
            "epoch": self.epoch,
            "height": self.height,
            "previousHash": self.previous_hash.map(|h| h.to_hex()),
            "timestamp": self.timestamp,
            "proposer": self.proposer,
            "merkleRoot": self.merkle_root.to_hex(),
        })
    }
}

/// A cluster's latest block hash as announced to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAnnouncement {
    pub moniker: String,
    pub hash: Sha256Hash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayBlockPayload {
    actions: Vec<ActionRecord>,
    clusters: Vec<ClusterAnnouncement>,
}

impl RelayBlockPayload {
    /// Actions in arrival order.
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    pub fn clusters(&self) -> &[ClusterAnnouncement] {
        &self.clusters
    }

    pub fn push_action(&mut self, action: ActionRecord) {
        self.actions.push(action);
    }

    /// Record `hash` for `moniker`, replacing an earlier announcement from
    /// the same cluster in place.
    pub fn announce(&mut self, moniker: impl Into<String>, hash: Sha256Hash) {
        let moniker = moniker.into();
        match self.clusters.iter_mut().find(|c| c.moniker == moniker) {
            Some(existing) => existing.hash = hash,
            None => self.clusters.push(ClusterAnnouncement { moniker, hash }),
        }
    }

    /// Action hashes followed by cluster hashes, as uniform leaves.
    pub fn leaves(&self) -> Vec<Sha256Hash> {
        self.actions
            .iter()
            .map(StateAction::to_hash)
            .chain(self.clusters.iter().map(|c| c.hash))
            .collect()
    }

    pub fn merkle_root(&self) -> Sha256Hash {
        merkle_root(&self.leaves())
    }

    fn write_fields(&self, w: &mut CanonicalWriter) {
        w.field_list(self.actions.iter().map(StateAction::to_canonical_bytes));
        w.field_section(|s| {
            s.put_varint(self.clusters.len() as u64);
            for cluster in &self.clusters {
                s.field_str(&cluster.moniker).field_hash(&cluster.hash);
            }
        });
    }

    fn read_fields(r: &mut CanonicalReader<'_>) -> std::result::Result<Self, CodecError> {
        let actions = r
            .field_list()?
            .into_iter()
            .map(ActionRecord::from_canonical_bytes)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut section = r.field_section()?;
        let count = section.read_varint()?;
        let mut clusters = Vec::new();
        for _ in 0..count {
            clusters.push(ClusterAnnouncement {
                moniker: section.field_str()?,
                hash: section.field_hash()?,
            });
        }
        section.finish()?;

        Ok(Self { actions, clusters })
    }
}

/// An epoch-scoped block requiring its proposer's authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayBlock {
    pub header: RelayBlockHeader,
    pub payload: RelayBlockPayload,
    authorizations: MultiAuthorization,
}

impl RelayBlock {
    /// The first block of `epoch`.
    pub fn new(epoch: u64, proposer: impl Into<String>, timestamp: u64) -> Self {
        Self::with_header(RelayBlockHeader {
            version: RELAY_BLOCK_VERSION,
            epoch,
            height: 0,
            previous_hash: None,
            timestamp,
            proposer: proposer.into(),
            merkle_root: Sha256Hash::ZERO,
        })
    }

    /// The block following `previous` in the same epoch.
    pub fn next(previous: &RelayBlock, proposer: impl Into<String>, timestamp: u64) -> Result<Self> {
        let height = previous
            .header
            .height
            .checked_add(1)
            .ok_or(LedgerError::HeightOverflow {
                height: previous.header.height,
                target: "relay block",
            })?;
        Ok(Self::with_header(RelayBlockHeader {
            version: RELAY_BLOCK_VERSION,
            epoch: previous.header.epoch,
            height,
            previous_hash: Some(previous.to_hash()),
            timestamp,
            proposer: proposer.into(),
            merkle_root: Sha256Hash::ZERO,
        }))
    }

    pub fn with_header(mut header: RelayBlockHeader) -> Self {
        let payload = RelayBlockPayload::default();
        header.merkle_root = payload.merkle_root();
        Self {
            header,
            payload,
            authorizations: MultiAuthorization::new(),
        }
    }

    pub fn authorizations(&self) -> &MultiAuthorization {
        &self.authorizations
    }

    /// Append `action` against the system clock.
    pub fn consider_state_action(&mut self, action: ActionRecord) -> Result<()> {
        self.consider_state_action_at(action, now_millis(), &LedgerConfig::default())
    }

    /// Append `action` and reseal. The header timestamp moves to `now` only
    /// when `now` is later and within the advance cap of the current value.
    pub fn consider_state_action_at(
        &mut self,
        action: ActionRecord,
        now: u64,
        config: &LedgerConfig,
    ) -> Result<()> {
        if action.kind.is_block() {
            return Err(LedgerError::UnsupportedKind {
                kind: action.kind,
                target: "relay block",
            });
        }
        self.payload.push_action(action);

        let ts = self.header.timestamp;
        if now > ts && now - ts <= config.relay_timestamp_advance_cap_ms {
            self.header.timestamp = now;
        }
        self.reseal();
        tracing::debug!(
            epoch = self.header.epoch,
            height = self.header.height,
            actions = self.payload.actions.len(),
            "relay block considered state action"
        );
        Ok(())
    }

    /// Announce a cluster's block hash and reseal.
    pub fn consider_cluster(&mut self, moniker: impl Into<String>, hash: Sha256Hash) {
        self.payload.announce(moniker, hash);
        self.reseal();
    }

    fn reseal(&mut self) {
        self.header.merkle_root = self.payload.merkle_root();
    }

    /// Authorize the header with `signer`. A later signature from the same
    /// moniker supersedes the earlier one.
    pub async fn sign(&mut self, signer: &dyn Signer) -> Result<()> {
        let envelope = AuthorizationEnvelope::sign(&*self, signer).await?;
        if self.authorizations.insert(envelope).is_some() {
            tracing::debug!(moniker = signer.moniker(), "relay block re-signed");
        }
        Ok(())
    }

    /// Authorization, proposer, signature and merkle checks, then cluster
    /// names and chain linkage. The first failure is reported.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let result = self.run_stages();
        if let Err(e) = &result {
            tracing::warn!(
                epoch = self.header.epoch,
                height = self.header.height,
                error = %e,
                "relay block rejected"
            );
        }
        result
    }

    fn run_stages(&self) -> std::result::Result<(), ValidationError> {
        check_proposer_authorizations(&self.authorizations, &self.header.proposer, self)?;

        let computed = self.payload.merkle_root();
        if computed != self.header.merkle_root {
            return Err(ValidationError::MerkleRootMismatch {
                expected: self.header.merkle_root.to_hex(),
                actual: computed.to_hex(),
            });
        }

        for cluster in &self.payload.clusters {
            check_cluster_name(&cluster.moniker)?;
        }

        match (self.header.height, self.header.previous_hash) {
            (0, Some(_)) => Err(ValidationError::GenesisWithPreviousHash),
            (h, None) if h > 0 => Err(ValidationError::MissingPreviousHash),
            _ => Ok(()),
        }
    }
}

impl Signable for RelayBlock {
    fn signable_bytes(&self) -> Vec<u8> {
        self.header.to_canonical_bytes()
    }
}

impl StateAction for RelayBlock {
    fn kind(&self) -> ActionKind {
        ActionKind::RelayBlock
    }

    fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::with_header(ActionKind::RelayBlock, self.header.version);
        self.header.write_fields(&mut w);
        self.payload.write_fields(&mut w);
        w.field_bytes(&self.authorizations.to_canonical_bytes());
        w.into_bytes()
    }

    fn to_json(&self) -> JsonValue {
        let clusters: Vec<JsonValue> = self
            .payload
            .clusters
            .iter()
            .map(|c| json!([c.moniker, c.hash.to_hex()]))
            .collect();
        json!({
            "kind": ActionKind::RelayBlock.as_str(),
            "hash": self.to_hash().to_hex(),
            "header": self.header.to_json(),
            "payload": {
                "actions": self.payload.actions.iter().map(StateAction::to_json).collect::<Vec<_>>(),
                "clusters": clusters,
            },
            "authorizations": self.authorizations.to_json(),
        })
    }

    fn is_valid(&self) -> std::result::Result<(), ValidationError> {
        self.validate()
    }
}

impl CanonicalDecode for RelayBlock {
    fn from_canonical_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let mut r = CanonicalReader::new(bytes);
        let version = r.read_header(ActionKind::RelayBlock)?;
        let header = RelayBlockHeader::read_fields(&mut r, version)?;
        let payload = RelayBlockPayload::read_fields(&mut r)?;
        let authorizations = MultiAuthorization::from_canonical_bytes(r.field_bytes()?)?;
        r.finish()?;

        Ok(Self {
            header,
            payload,
            authorizations,
        })
    }
}
