//! Cluster blocks: per-cluster, timestamp-ordered index over the state
//! actions of one or more hash proofs.
//!
//! A cluster block does not copy state actions. It keeps an append-only list
//! of source hashes (hash proofs, or single actions and relay blocks) and an
//! ordered list of `proofIndex:elementIndex` references into them, sorted by
//! the referenced action's timestamp.
//!
//! The block hash is a hash of hashes, `SHA-256(header hash || payload hash)`,
//! and is what authorizations sign.
//!
//! ## Key Types
//!
//! - [`ConsiderKey`] - `timestamp:KIND:sourceHash:index` reference to one action
//! - [`ClusterBlockPayload`] - source hashes plus the ordered reference list
//! - [`ClusterElement`] - what a cluster block can consider

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value as JsonValue};

use cairn_auth::{AuthorizationEnvelope, MultiAuthorization, Signable, Signer};
use cairn_core::{
    ActionKind, CanonicalDecode, CanonicalReader, CanonicalWriter, CodecError, Sha256Hash,
    StateAction, ValidationError,
};

use crate::clock::now_millis;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::proof::HashProof;
use crate::record::ActionRecord;
use crate::relay::RelayBlock;
use crate::validation::{check_cluster_name, check_proposer_authorizations};

/// Current encoding version of [`ClusterBlock`].
pub const CLUSTER_BLOCK_VERSION: u64 = 1;

/// Reference to one state action inside a source batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsiderKey {
    pub timestamp: u64,
    pub kind: ActionKind,
    /// Hash of the batch holding the action.
    pub source_hash: Sha256Hash,
    /// Position of the action within its batch.
    pub index: u64,
}

impl fmt::Display for ConsiderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.timestamp, self.kind, self.source_hash, self.index
        )
    }
}

impl FromStr for ConsiderKey {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let malformed = || CodecError::Malformed(format!("consider key {s:?}"));
        let mut parts = s.split(':');
        let mut next = || parts.next().ok_or_else(malformed);

        let timestamp: u64 = next()?.parse().map_err(|_| malformed())?;
        let kind: ActionKind = next()?.parse()?;
        let source_hash = Sha256Hash::from_hex(next()?)?;
        let index: u64 = next()?.parse().map_err(|_| malformed())?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self {
            timestamp,
            kind,
            source_hash,
            index,
        })
    }
}

/// One position in the cluster ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderedEntry {
    /// Index into the source hash list.
    pub proof_index: u64,
    pub element_index: u64,
    pub timestamp: u64,
}

impl fmt::Display for OrderedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.proof_index, self.element_index)
    }
}

/// Source hashes and the ordered reference list.
///
/// The hash-to-position index and the set of seen references are derived
/// and rebuilt on decode.
#[derive(Debug, Clone, Default)]
pub struct ClusterBlockPayload {
    hash_proof_hashes: Vec<Sha256Hash>,
    entries: Vec<OrderedEntry>,
    positions: HashMap<Sha256Hash, u64>,
    seen: HashSet<(u64, u64)>,
}

impl PartialEq for ClusterBlockPayload {
    fn eq(&self, other: &Self) -> bool {
        self.hash_proof_hashes == other.hash_proof_hashes && self.entries == other.entries
    }
}

impl Eq for ClusterBlockPayload {}

impl ClusterBlockPayload {
    fn from_parts(hash_proof_hashes: Vec<Sha256Hash>, entries: Vec<OrderedEntry>) -> Self {
        let mut positions = HashMap::new();
        for (i, hash) in hash_proof_hashes.iter().enumerate() {
            positions.entry(*hash).or_insert(i as u64);
        }
        let seen = entries
            .iter()
            .map(|e| (e.proof_index, e.element_index))
            .collect();
        Self {
            hash_proof_hashes,
            entries,
            positions,
            seen,
        }
    }

    /// Source hashes in first-seen order.
    pub fn hash_proof_hashes(&self) -> &[Sha256Hash] {
        &self.hash_proof_hashes
    }

    pub fn entries(&self) -> &[OrderedEntry] {
        &self.entries
    }

    /// The ordering rendered as `proofIndex:elementIndex` strings.
    pub fn ordered_state_actions(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add the action `key` refers to.
    ///
    /// The source hash is appended on first sight. The reference lands after
    /// every entry with the same or an earlier timestamp. Returns `false` if
    /// the reference was already present.
    pub fn consider(&mut self, key: &ConsiderKey) -> bool {
        let proof_index = match self.positions.get(&key.source_hash) {
            Some(&index) => index,
            None => {
                let index = self.hash_proof_hashes.len() as u64;
                self.hash_proof_hashes.push(key.source_hash);
                self.positions.insert(key.source_hash, index);
                index
            }
        };
        if !self.seen.insert((proof_index, key.index)) {
            return false;
        }

        let entry = OrderedEntry {
            proof_index,
            element_index: key.index,
            timestamp: key.timestamp,
        };
        let at = self.entries.partition_point(|e| e.timestamp <= key.timestamp);
        self.entries.insert(at, entry);
        true
    }

    /// Unique sources, in-range references without repeats, ascending
    /// timestamps.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.positions.len() != self.hash_proof_hashes.len() {
            return Err(ValidationError::InconsistentIndex(
                "duplicate source hash".into(),
            ));
        }
        if self.seen.len() != self.entries.len() {
            return Err(ValidationError::InconsistentIndex(
                "duplicate reference".into(),
            ));
        }
        let sources = self.hash_proof_hashes.len() as u64;
        if let Some(entry) = self.entries.iter().find(|e| e.proof_index >= sources) {
            return Err(ValidationError::InconsistentIndex(format!(
                "reference {entry} points past {sources} sources"
            )));
        }
        if let Some(i) = self
            .entries
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(ValidationError::OutOfOrder(i + 1));
        }
        Ok(())
    }

    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::new();
        w.field_list(self.hash_proof_hashes.iter());
        w.field_section(|s| {
            s.put_varint(self.entries.len() as u64);
            for entry in &self.entries {
                s.field_u64(entry.proof_index)
                    .field_u64(entry.element_index)
                    .field_u64(entry.timestamp);
            }
        });
        w.into_bytes()
    }

    pub fn from_canonical_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let mut r = CanonicalReader::new(bytes);
        let hashes = r
            .field_list()?
            .into_iter()
            .map(Sha256Hash::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut section = r.field_section()?;
        let count = section.read_varint()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            entries.push(OrderedEntry {
                proof_index: section.field_u64()?,
                element_index: section.field_u64()?,
                timestamp: section.field_u64()?,
            });
        }
        section.finish()?;
        r.finish()?;

        Ok(Self::from_parts(hashes, entries))
    }

    pub fn to_hash(&self) -> Sha256Hash {
        Sha256Hash::hash(&self.to_canonical_bytes())
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "hashProofHashes": self.hash_proof_hashes.iter().map(Sha256Hash::to_hex).collect::<Vec<_>>(),
            "orderedStateActions": self.ordered_state_actions(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterBlockHeader {
    pub version: u64,
    pub cluster: String,
    pub height: u64,
    pub previous_hash: Option<Sha256Hash>,
    /// Opening time in Unix milliseconds.
    pub timestamp: u64,
    pub proposer: String,
    /// Set once the block stops accepting elements.
    pub frozen: bool,
    /// When voting began, if it has.
    pub voting_started_at: Option<u64>,
}

impl ClusterBlockHeader {
    fn write_fields(&self, w: &mut CanonicalWriter) {
        w.field_str(&self.cluster)
            .field_u64(self.height)
            .field_opt_hash(self.previous_hash.as_ref())
            .field_u64(self.timestamp)
            .field_str(&self.proposer)
            .field_bool(self.frozen)
            .field_opt_u64(self.voting_started_at);
    }

    fn read_fields(r: &mut CanonicalReader<'_>, version: u64) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            version,
            cluster: r.field_str()?,
            height: r.field_u64()?,
            previous_hash: r.field_opt_hash()?,
            timestamp: r.field_u64()?,
            proposer: r.field_str()?,
            frozen: r.field_bool()?,
            voting_started_at: r.field_opt_u64()?,
        })
    }

    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::with_header(ActionKind::ClusterBlock, self.version);
        self.write_fields(&mut w);
        w.into_bytes()
    }

    pub fn to_hash(&self) -> Sha256Hash {
        Sha256Hash::hash(&self.to_canonical_bytes())
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "version": self.version,
            "cluster": self.cluster,
            "height": self.height,
            "previousHash": self.previous_hash.map(|h| h.to_hex()),
            "timestamp": self.timestamp,
            "proposer": self.proposer,
            "frozen": self.frozen,
            "votingStartedAt": self.voting_started_at,
        })
    }
}

/// Something a cluster block can consider.
#[derive(Debug, Clone, Copy)]
pub enum ClusterElement<'a> {
    /// Unpacked element by element.
    HashProof(&'a HashProof),
    /// A single-element batch at index 0.
    Action(&'a ActionRecord),
    /// A single-element batch at index 0.
    Relay(&'a RelayBlock),
}

impl<'a> From<&'a HashProof> for ClusterElement<'a> {
    fn from(proof: &'a HashProof) -> Self {
        ClusterElement::HashProof(proof)
    }
}

impl<'a> From<&'a ActionRecord> for ClusterElement<'a> {
    fn from(action: &'a ActionRecord) -> Self {
        ClusterElement::Action(action)
    }
}

impl<'a> From<&'a RelayBlock> for ClusterElement<'a> {
    fn from(block: &'a RelayBlock) -> Self {
        ClusterElement::Relay(block)
    }
}

/// A per-cluster block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterBlock {
    pub header: ClusterBlockHeader,
    pub payload: ClusterBlockPayload,
    authorizations: MultiAuthorization,
}

impl ClusterBlock {
    /// The first block of `cluster`.
    pub fn new(cluster: impl Into<String>, proposer: impl Into<String>, timestamp: u64) -> Self {
        Self::with_header(ClusterBlockHeader {
            version: CLUSTER_BLOCK_VERSION,
            cluster: cluster.into(),
            height: 0,
            previous_hash: None,
            timestamp,
            proposer: proposer.into(),
            frozen: false,
            voting_started_at: None,
        })
    }

    /// The block following `previous` in the same cluster.
    pub fn next(previous: &ClusterBlock, proposer: impl Into<String>, timestamp: u64) -> Result<Self> {
        let height = previous
            .header
            .height
            .checked_add(1)
            .ok_or(LedgerError::HeightOverflow {
                height: previous.header.height,
                target: "cluster block",
            })?;
        Ok(Self::with_header(ClusterBlockHeader {
            version: CLUSTER_BLOCK_VERSION,
            cluster: previous.header.cluster.clone(),
            height,
            previous_hash: Some(previous.to_hash()),
            timestamp,
            proposer: proposer.into(),
            frozen: false,
            voting_started_at: None,
        }))
    }

    pub fn with_header(header: ClusterBlockHeader) -> Self {
        Self {
            header,
            payload: ClusterBlockPayload::default(),
            authorizations: MultiAuthorization::new(),
        }
    }

    pub fn authorizations(&self) -> &MultiAuthorization {
        &self.authorizations
    }

    /// Index the state actions of `element`.
    ///
    /// Returns how many new references were added; references already
    /// present are skipped.
    pub fn consider<'a>(&mut self, element: impl Into<ClusterElement<'a>>) -> Result<usize> {
        let keys = match element.into() {
            ClusterElement::HashProof(proof) => {
                if proof.header.cluster != self.header.cluster {
                    return Err(LedgerError::ClusterMismatch {
                        expected: self.header.cluster.clone(),
                        got: proof.header.cluster.clone(),
                    });
                }
                let source_hash = proof.to_hash();
                proof
                    .payload
                    .elements()
                    .iter()
                    .enumerate()
                    .map(|(i, e)| ConsiderKey {
                        timestamp: e.timestamp,
                        kind: e.kind,
                        source_hash,
                        index: i as u64,
                    })
                    .collect::<Vec<_>>()
            }
            ClusterElement::Action(action) => {
                if action.kind.is_block() {
                    return Err(LedgerError::UnsupportedKind {
                        kind: action.kind,
                        target: "cluster block",
                    });
                }
                vec![single_key(action)]
            }
            ClusterElement::Relay(block) => vec![single_key(block)],
        };

        let added = keys.iter().filter(|k| self.payload.consider(k)).count();
        tracing::debug!(
            cluster = %self.header.cluster,
            height = self.header.height,
            added,
            entries = self.payload.len(),
            "cluster block considered element"
        );
        Ok(added)
    }

    /// Stop accepting elements.
    pub fn freeze(&mut self) {
        self.header.frozen = true;
    }

    /// Enter the voting phase at `now`.
    pub fn start_voting_at(&mut self, now: u64) {
        self.header.voting_started_at = Some(now);
    }

    pub fn start_voting(&mut self) {
        self.start_voting_at(now_millis());
    }

    /// Younger than the open window and neither frozen nor voting.
    pub fn is_open_at(&self, now: u64, config: &LedgerConfig) -> bool {
        !self.header.frozen
            && !self.is_voting_at(now, config)
            && now.saturating_sub(self.header.timestamp) < config.cluster_open_window_ms
    }

    /// Voting began less than the voting window ago.
    pub fn is_voting_at(&self, now: u64, config: &LedgerConfig) -> bool {
        self.header
            .voting_started_at
            .is_some_and(|started| now.saturating_sub(started) < config.cluster_voting_window_ms)
    }

    pub fn is_open(&self) -> bool {
        self.is_open_at(now_millis(), &LedgerConfig::default())
    }

    pub fn is_voting(&self) -> bool {
        self.is_voting_at(now_millis(), &LedgerConfig::default())
    }

    /// Authorize the block hash with `signer`, superseding any earlier
    /// authorization from the same moniker.
    pub async fn sign(&mut self, signer: &dyn Signer) -> Result<()> {
        let envelope = AuthorizationEnvelope::sign(&*self, signer).await?;
        if self.authorizations.insert(envelope).is_some() {
            tracing::debug!(moniker = signer.moniker(), "cluster block re-signed");
        }
        Ok(())
    }

    /// Authorization, proposer and signature checks, then the cluster name,
    /// index consistency and chain linkage.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let result = self.run_stages();
        if let Err(e) = &result {
            tracing::warn!(
                cluster = %self.header.cluster,
                height = self.header.height,
                error = %e,
                "cluster block rejected"
            );
        }
        result
    }

    fn run_stages(&self) -> std::result::Result<(), ValidationError> {
        check_proposer_authorizations(&self.authorizations, &self.header.proposer, self)?;
        check_cluster_name(&self.header.cluster)?;
        self.payload.validate()?;
        match (self.header.height, self.header.previous_hash) {
            (0, Some(_)) => Err(ValidationError::GenesisWithPreviousHash),
            (h, None) if h > 0 => Err(ValidationError::MissingPreviousHash),
            _ => Ok(()),
        }
    }
}

fn single_key<A: StateAction>(action: &A) -> ConsiderKey {
    ConsiderKey {
        timestamp: action.timestamp(),
        kind: action.kind(),
        source_hash: action.to_hash(),
        index: 0,
    }
}

impl Signable for ClusterBlock {
    fn signable_bytes(&self) -> Vec<u8> {
        self.to_hash().as_bytes().to_vec()
    }
}

impl StateAction for ClusterBlock {
    fn kind(&self) -> ActionKind {
        ActionKind::ClusterBlock
    }

    fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::with_header(ActionKind::ClusterBlock, self.header.version);
        self.header.write_fields(&mut w);
        w.field_bytes(&self.payload.to_canonical_bytes());
        w.field_bytes(&self.authorizations.to_canonical_bytes());
        w.into_bytes()
    }

    /// `SHA-256(header hash || payload hash)`. Authorizations are not covered.
    fn to_hash(&self) -> Sha256Hash {
        Sha256Hash::hash_pair(&self.header.to_hash(), &self.payload.to_hash())
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "kind": ActionKind::ClusterBlock.as_str(),
            "hash": self.to_hash().to_hex(),
            "header": self.header.to_json(),
            "payload": self.payload.to_json(),
            "authorizations": self.authorizations.to_json(),
        })
    }

    fn is_valid(&self) -> std::result::Result<(), ValidationError> {
        self.validate()
    }
}

impl CanonicalDecode for ClusterBlock {
    fn from_canonical_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let mut r = CanonicalReader::new(bytes);
        let version = r.read_header(ActionKind::ClusterBlock)?;
        let header = ClusterBlockHeader::read_fields(&mut r, version)?;
        let payload = ClusterBlockPayload::from_canonical_bytes(r.field_bytes()?)?;
        let authorizations = MultiAuthorization::from_canonical_bytes(r.field_bytes()?)?;
        r.finish()?;

        Ok(Self {
            header,
            payload,
            authorizations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_auth::LocalSigner;

    const NOW: u64 = 1_700_000_000_000;

    fn signer(name: &str, seed: u8) -> LocalSigner {
        LocalSigner::from_seed(name, &[seed; 32])
    }

    async fn action(kind: ActionKind, ts: u64) -> ActionRecord {
        ActionRecord::builder(kind)
            .timestamp(ts)
            .field("n", ts)
            .sign(&signer("alice", 1))
            .await
            .unwrap()
    }

    async fn proof(cluster: &str, timestamps: &[u64]) -> HashProof {
        let mut proof = HashProof::genesis(cluster, "alice", NOW);
        for &ts in timestamps {
            proof.consider(action(ActionKind::Transaction, ts).await).unwrap();
        }
        proof
    }

    fn key(ts: u64, source: &[u8], index: u64) -> ConsiderKey {
        ConsiderKey {
            timestamp: ts,
            kind: ActionKind::Transaction,
            source_hash: Sha256Hash::hash(source),
            index,
        }
    }

    #[test]
    fn test_consider_key_text_roundtrip() {
        let k = key(1234, b"p", 3);
        let text = k.to_string();
        assert_eq!(
            text,
            format!("1234:TRANSACTION:{}:3", Sha256Hash::hash(b"p").to_hex())
        );
        assert_eq!(text.parse::<ConsiderKey>().unwrap(), k);
        assert!("1:TRANSACTION:zz:0".parse::<ConsiderKey>().is_err());
        let upper = format!(
            "1234:TRANSACTION:{}:3",
            Sha256Hash::hash(b"p").to_hex().to_uppercase()
        );
        assert!(upper.parse::<ConsiderKey>().is_err());
        assert!("1:TRANSACTION".parse::<ConsiderKey>().is_err());
    }

    #[test]
    fn test_payload_orders_across_sources() {
        let mut payload = ClusterBlockPayload::default();
        assert!(payload.consider(&key(30, b"a", 0)));
        assert!(payload.consider(&key(10, b"b", 0)));
        assert!(payload.consider(&key(20, b"a", 1)));
        assert!(payload.consider(&key(10, b"a", 2)));

        assert_eq!(payload.hash_proof_hashes().len(), 2);
        assert_eq!(payload.ordered_state_actions(), vec!["1:0", "0:2", "0:1", "0:0"]);
        assert_eq!(payload.validate(), Ok(()));
    }

    #[test]
    fn test_payload_skips_repeats() {
        let mut payload = ClusterBlockPayload::default();
        assert!(payload.consider(&key(5, b"a", 0)));
        assert!(!payload.consider(&key(5, b"a", 0)));
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn test_decoded_index_is_rebuilt() {
        let mut payload = ClusterBlockPayload::default();
        payload.consider(&key(1, b"a", 0));
        payload.consider(&key(2, b"b", 0));

        let mut decoded =
            ClusterBlockPayload::from_canonical_bytes(&payload.to_canonical_bytes()).unwrap();
        assert_eq!(decoded, payload);
        assert!(!decoded.consider(&key(2, b"b", 0)));
        assert!(decoded.consider(&key(3, b"b", 1)));
        assert_eq!(decoded.hash_proof_hashes().len(), 2);
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let payload = ClusterBlockPayload::from_parts(
            vec![Sha256Hash::hash(b"a")],
            vec![OrderedEntry {
                proof_index: 4,
                element_index: 0,
                timestamp: 1,
            }],
        );
        assert!(matches!(
            payload.validate(),
            Err(ValidationError::InconsistentIndex(_))
        ));
    }

    #[tokio::test]
    async fn test_consider_hash_proof_unpacks_elements() {
        let p = proof("core.banking", &[NOW + 2, NOW]).await;
        let mut block = ClusterBlock::new("core.banking", "alice", NOW);

        assert_eq!(block.consider(&p).unwrap(), 2);
        assert_eq!(block.payload.hash_proof_hashes(), &[p.to_hash()]);
        assert_eq!(block.payload.ordered_state_actions(), vec!["0:0", "0:1"]);

        assert_eq!(block.consider(&p).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_single_action_is_index_zero() {
        let a = action(ActionKind::Identity, NOW).await;
        let mut block = ClusterBlock::new("core.banking", "alice", NOW);
        assert_eq!(block.consider(&a).unwrap(), 1);
        assert_eq!(block.payload.hash_proof_hashes(), &[a.to_hash()]);
        assert_eq!(block.payload.entries()[0].element_index, 0);
    }

    #[tokio::test]
    async fn test_foreign_cluster_proof_rejected() {
        let p = proof("core.payments", &[NOW]).await;
        let mut block = ClusterBlock::new("core.banking", "alice", NOW);
        assert!(matches!(
            block.consider(&p),
            Err(LedgerError::ClusterMismatch { .. })
        ));
        assert!(block.payload.is_empty());
    }

    #[test]
    fn test_open_and_voting_windows() {
        let config = LedgerConfig::default();
        let mut block = ClusterBlock::new("core.banking", "alice", NOW);

        assert!(block.is_open_at(NOW, &config));
        assert!(block.is_open_at(NOW + config.cluster_open_window_ms - 1, &config));
        assert!(!block.is_open_at(NOW + config.cluster_open_window_ms, &config));

        block.start_voting_at(NOW + 10);
        assert!(block.is_voting_at(NOW + 10, &config));
        assert!(!block.is_open_at(NOW + 10, &config));
        assert!(!block.is_voting_at(NOW + 10 + config.cluster_voting_window_ms, &config));

        let mut frozen = ClusterBlock::new("core.banking", "alice", NOW);
        frozen.freeze();
        assert!(!frozen.is_open_at(NOW, &config));
    }

    #[tokio::test]
    async fn test_hash_is_hash_of_hashes() {
        let p = proof("core.banking", &[NOW]).await;
        let mut block = ClusterBlock::new("core.banking", "alice", NOW);
        block.consider(&p).unwrap();

        let expected = Sha256Hash::hash_pair(&block.header.to_hash(), &block.payload.to_hash());
        assert_eq!(block.to_hash(), expected);

        let before = block.to_hash();
        block.sign(&signer("alice", 1)).await.unwrap();
        assert_eq!(block.to_hash(), before);
    }

    #[tokio::test]
    async fn test_sign_and_validate() {
        let p = proof("core.banking", &[NOW]).await;
        let mut block = ClusterBlock::new("core.banking", "alice", NOW);
        block.consider(&p).unwrap();

        assert_eq!(block.validate(), Err(ValidationError::MissingAuthorization));

        block.sign(&signer("bob", 2)).await.unwrap();
        assert_eq!(
            block.validate(),
            Err(ValidationError::ProposerAuthorizationRequired)
        );

        block.sign(&signer("alice", 1)).await.unwrap();
        block.sign(&signer("alice", 1)).await.unwrap();
        assert_eq!(block.authorizations().len(), 2);
        assert_eq!(block.validate(), Ok(()));

        block.freeze();
        assert_eq!(
            block.validate(),
            Err(ValidationError::InvalidSignature("bob".into()))
        );
    }

    #[tokio::test]
    async fn test_next_links_to_previous() {
        let mut first = ClusterBlock::new("core.banking", "alice", NOW);
        first.sign(&signer("alice", 1)).await.unwrap();

        let mut second = ClusterBlock::next(&first, "bob", NOW + 1).unwrap();
        second.sign(&signer("bob", 2)).await.unwrap();

        assert_eq!(second.header.height, 1);
        assert_eq!(second.header.previous_hash, Some(first.to_hash()));
        assert_eq!(second.validate(), Ok(()));

        second.header.height = u64::MAX;
        assert!(matches!(
            ClusterBlock::next(&second, "carol", NOW + 2),
            Err(LedgerError::HeightOverflow { height: u64::MAX, .. })
        ));
    }

    #[tokio::test]
    async fn test_canonical_roundtrip() {
        let p = proof("core.banking", &[NOW, NOW + 1]).await;
        let relay = RelayBlock::new(1, "alice", NOW);
        let mut block = ClusterBlock::new("core.banking", "alice", NOW);
        block.consider(&p).unwrap();
        block.consider(&relay).unwrap();
        block.start_voting_at(NOW + 5);
        block.sign(&signer("alice", 1)).await.unwrap();

        let decoded = ClusterBlock::from_hex(&block.to_hex()).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.to_hash(), block.to_hash());
        assert_eq!(decoded.validate(), Ok(()));
    }
}
