//! Hash proofs: proof-of-work-linked batches of ordered state actions.
//!
//! A proof collects state actions in ascending timestamp order, seals them
//! under a merkle root and is mined by searching for a nonce whose proof hash
//! meets the header difficulty. Each proof links to its predecessor by hash.
//!
//! ## Lifecycle
//!
//! ```text
//! Empty ──consider──▶ Sealed ──mine──▶ Mined
//!                       ▲
//!   payload mutated ────┴── Considering (root stale)
//! ```
//!
//! [`HashProof::consider`] keeps the header root current, so a proof only
//! reads as [`ProofStage::Considering`] when its payload was changed behind
//! its back.
//!
//! ## Wire format
//!
//! ```text
//! varint(HASHPROOF) || varint(version)
//!   || [height] || [previous hash | empty] || [timestamp] || [cluster]
//!   || [proposer] || [merkle root] || [nonce] || [difficulty]
//!   || [varint(count) || [element]*]
//! ```

use serde_json::{json, Value as JsonValue};

use cairn_core::{
    ActionKind, CanonicalDecode, CanonicalReader, CanonicalWriter, CodecError, Sha256Hash,
    StateAction, ValidationError,
};

use crate::clock::now_millis;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::merkle::merkle_root;
use crate::pow;
use crate::record::ActionRecord;
use crate::validation::{check_cluster_name, check_timestamp_window};

/// Current encoding version of [`HashProof`].
pub const HASH_PROOF_VERSION: u64 = 1;

/// Proof header. The proof hash covers the header and the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashProofHeader {
    pub version: u64,
    pub height: u64,
    /// Hash of the preceding proof; `None` exactly at height zero.
    pub previous_hash: Option<Sha256Hash>,
    /// Creation time in Unix milliseconds.
    pub timestamp: u64,
    pub cluster: String,
    pub proposer: String,
    pub merkle_root: Sha256Hash,
    pub nonce: u64,
    pub difficulty: u64,
}

impl HashProofHeader {
    /// Header self-check: version, timestamp window, cluster format,
    /// height/previous-hash consistency and difficulty bounds.
    pub fn validate_at(&self, now: u64, config: &LedgerConfig) -> std::result::Result<(), ValidationError> {
        if self.version == 0 {
            return Err(ValidationError::InvalidVersion(self.version));
        }
        check_timestamp_window(self.timestamp, now, config)?;
        check_cluster_name(&self.cluster)?;
        match (self.height, self.previous_hash) {
            (0, Some(_)) => return Err(ValidationError::GenesisWithPreviousHash),
            (h, None) if h > 0 => return Err(ValidationError::MissingPreviousHash),
            _ => {}
        }
        if self.difficulty > config.max_difficulty {
            return Err(ValidationError::DifficultyOutOfBounds {
                difficulty: self.difficulty,
                max: config.max_difficulty,
            });
        }
        Ok(())
    }

    fn write_fields(&self, w: &mut CanonicalWriter) {
        w.field_u64(self.height)
            .field_opt_hash(self.previous_hash.as_ref())
            .field_u64(self.timestamp)
            .field_str(&self.cluster)
            .field_str(&self.proposer)
            .field_hash(&self.merkle_root)
            .field_u64(self.nonce)
            .field_u64(self.difficulty);
    }

    fn read_fields(r: &mut CanonicalReader<'_>, version: u64) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            version,
            height: r.field_u64()?,
            previous_hash: r.field_opt_hash()?,
            timestamp: r.field_u64()?,
            cluster: r.field_str()?,
            proposer: r.field_str()?,
            merkle_root: r.field_hash()?,
            nonce: r.field_u64()?,
            difficulty: r.field_u64()?,
        })
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "version": self.version,
            "height": self.height,
            "previousHash": self.previous_hash.map(|h| h.to_hex()),
            "timestamp": self.timestamp,
            "cluster": self.cluster,
            "proposer": self.proposer,
            "merkleRoot": self.merkle_root.to_hex(),
            "nonce": self.nonce,
            "difficulty": self.difficulty,
        })
    }
}

/// State actions of a proof, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashProofPayload {
    elements: Vec<ActionRecord>,
}

impl HashProofPayload {
    pub fn elements(&self) -> &[ActionRecord] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Insert after every element with the same or an earlier timestamp.
    ///
    /// Returns the position of the new element.
    pub fn insert(&mut self, element: ActionRecord) -> usize {
        let index = self
            .elements
            .partition_point(|e| e.timestamp <= element.timestamp);
        self.elements.insert(index, element);
        index
    }

    /// Hash of every element, in payload order.
    pub fn leaves(&self) -> Vec<Sha256Hash> {
        self.elements.iter().map(StateAction::to_hash).collect()
    }

    pub fn merkle_root(&self) -> Sha256Hash {
        merkle_root(&self.leaves())
    }

    /// Size first, then element kind, timestamp and self-validity, then
    /// ordering. Oversized payloads are refused before any signature check.
    pub fn validate(&self, config: &LedgerConfig) -> std::result::Result<(), ValidationError> {
        if self.elements.len() > config.max_proof_elements {
            return Err(ValidationError::TooManyElements {
                count: self.elements.len(),
                max: config.max_proof_elements,
            });
        }
        for (index, element) in self.elements.iter().enumerate() {
            if !element.kind.is_proof_element() {
                return Err(ValidationError::InvalidElement {
                    index,
                    reason: ValidationError::UnsupportedKind(element.kind).to_string(),
                });
            }
            if element.timestamp == 0 {
                return Err(ValidationError::InvalidElement {
                    index,
                    reason: ValidationError::InvalidTimestamp(0).to_string(),
                });
            }
            element.is_valid().map_err(|e| ValidationError::InvalidElement {
                index,
                reason: e.to_string(),
            })?;
        }
        if let Some(index) = self
            .elements
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(ValidationError::OutOfOrder(index + 1));
        }
        Ok(())
    }
}

/// Derived position of a proof in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofStage {
    /// No elements yet.
    Empty,
    /// The header root does not cover the current payload.
    Considering,
    /// The header root covers the payload; the nonce does not meet the target.
    Sealed,
    /// The nonce meets the target.
    Mined,
}

/// A proof-of-work-linked batch of state actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashProof {
    pub header: HashProofHeader,
    pub payload: HashProofPayload,
}

impl HashProof {
    /// The first proof of a cluster.
    pub fn genesis(cluster: impl Into<String>, proposer: impl Into<String>, timestamp: u64) -> Self {
        Self::with_header(HashProofHeader {
            version: HASH_PROOF_VERSION,
            height: 0,
            previous_hash: None,
            timestamp,
            cluster: cluster.into(),
            proposer: proposer.into(),
            merkle_root: Sha256Hash::ZERO,
            nonce: 0,
            difficulty: 0,
        })
    }

    /// The proof following `previous`, in the same cluster at the same
    /// difficulty.
    pub fn next(previous: &HashProof, proposer: impl Into<String>, timestamp: u64) -> Result<Self> {
        let height = previous
            .header
            .height
            .checked_add(1)
            .ok_or(LedgerError::HeightOverflow {
                height: previous.header.height,
                target: "hash proof",
            })?;
        Ok(Self::with_header(HashProofHeader {
            version: HASH_PROOF_VERSION,
            height,
            previous_hash: Some(previous.to_hash()),
            timestamp,
            cluster: previous.header.cluster.clone(),
            proposer: proposer.into(),
            merkle_root: Sha256Hash::ZERO,
            nonce: 0,
            difficulty: previous.header.difficulty,
        }))
    }

    /// A proof with an empty payload; the header root is recomputed.
    pub fn with_header(mut header: HashProofHeader) -> Self {
        let payload = HashProofPayload::default();
        header.merkle_root = payload.merkle_root();
        Self { header, payload }
    }

    /// Set the difficulty. Changes the proof hash, so any mined nonce is
    /// invalidated.
    pub fn with_difficulty(mut self, difficulty: u64) -> Self {
        self.header.difficulty = difficulty;
        self
    }

    /// Add a state action in timestamp order and reseal the header root.
    ///
    /// Returns the element's position in the payload.
    pub fn consider(&mut self, element: ActionRecord) -> Result<usize> {
        if !element.kind.is_proof_element() {
            return Err(LedgerError::UnsupportedKind {
                kind: element.kind,
                target: "hash proof",
            });
        }
        let index = self.payload.insert(element);
        self.header.merkle_root = self.payload.merkle_root();
        tracing::debug!(
            cluster = %self.header.cluster,
            height = self.header.height,
            index,
            elements = self.payload.len(),
            "considered state action"
        );
        Ok(index)
    }

    /// Whether this proof with `nonce` substituted meets its difficulty.
    pub fn check_nonce(&self, nonce: u64) -> bool {
        let mut candidate = self.clone();
        candidate.header.nonce = nonce;
        pow::meets_target(&candidate.to_hash(), candidate.header.difficulty)
    }

    /// Search up to `max_attempts` nonces from the current one.
    ///
    /// On success the nonce is stored and returned; otherwise the header is
    /// left unchanged.
    pub fn mine(&mut self, max_attempts: u64) -> Option<u64> {
        let start = self.header.nonce;
        for attempt in 0..max_attempts {
            let nonce = start.wrapping_add(attempt);
            self.header.nonce = nonce;
            if pow::meets_target(&self.to_hash(), self.header.difficulty) {
                tracing::debug!(
                    cluster = %self.header.cluster,
                    height = self.header.height,
                    nonce,
                    attempts = attempt + 1,
                    "mined hash proof"
                );
                return Some(nonce);
            }
        }
        self.header.nonce = start;
        None
    }

    pub fn stage(&self) -> ProofStage {
        if self.payload.is_empty() {
            ProofStage::Empty
        } else if self.header.merkle_root != self.payload.merkle_root() {
            ProofStage::Considering
        } else if self.check_nonce(self.header.nonce) {
            ProofStage::Mined
        } else {
            ProofStage::Sealed
        }
    }

    /// Full validation against the system clock and default limits.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.validate_at(now_millis(), &LedgerConfig::default())
    }

    /// Full validation at `now`. Stages run in order and the first failure
    /// is reported.
    pub fn validate_at(&self, now: u64, config: &LedgerConfig) -> std::result::Result<(), ValidationError> {
        let result = self.run_stages(now, config);
        if let Err(e) = &result {
            tracing::warn!(
                cluster = %self.header.cluster,
                height = self.header.height,
                error = %e,
                "hash proof rejected"
            );
        }
        result
    }

    fn run_stages(&self, now: u64, config: &LedgerConfig) -> std::result::Result<(), ValidationError> {
        self.header.validate_at(now, config)?;
        self.payload.validate(config)?;

        let computed = self.payload.merkle_root();
        if computed != self.header.merkle_root {
            return Err(ValidationError::MerkleRootMismatch {
                expected: self.header.merkle_root.to_hex(),
                actual: computed.to_hex(),
            });
        }

        if !self.check_nonce(self.header.nonce) {
            return Err(ValidationError::InsufficientWork);
        }

        // A proof can neither point at the zero hash nor at itself.
        if let Some(previous) = self.header.previous_hash {
            if previous == Sha256Hash::ZERO || previous == self.to_hash() {
                return Err(ValidationError::InconsistentPreviousHash(self.header.height));
            }
        }

        if self.header.version > config.supported_version {
            return Err(ValidationError::UnsupportedVersion(self.header.version));
        }
        Ok(())
    }
}

impl StateAction for HashProof {
    fn kind(&self) -> ActionKind {
        ActionKind::HashProof
    }

    fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::with_header(ActionKind::HashProof, self.header.version);
        self.header.write_fields(&mut w);
        w.field_list(self.payload.elements.iter().map(StateAction::to_canonical_bytes));
        w.into_bytes()
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "kind": ActionKind::HashProof.as_str(),
            "hash": self.to_hash().to_hex(),
            "header": self.header.to_json(),
            "payload": self.payload.elements.iter().map(StateAction::to_json).collect::<Vec<_>>(),
        })
    }

    fn is_valid(&self) -> std::result::Result<(), ValidationError> {
        self.validate()
    }
}

impl CanonicalDecode for HashProof {
    /// Elements are kept in wire order; ordering is checked by validation.
    fn from_canonical_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let mut r = CanonicalReader::new(bytes);
        let version = r.read_header(ActionKind::HashProof)?;
        let header = HashProofHeader::read_fields(&mut r, version)?;
        let elements = r
            .field_list()?
            .into_iter()
            .map(ActionRecord::from_canonical_bytes)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        r.finish()?;

        Ok(Self {
            header,
            payload: HashProofPayload { elements },
        })
    }
}
