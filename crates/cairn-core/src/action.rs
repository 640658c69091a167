//! State actions: the ledger-mutating payloads every block structure consumes.
//!
//! Kinds form a closed set. A wire discriminant that maps to no variant is a
//! fatal [`CodecError::UnknownKind`], never a runtime lookup miss.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::Sha256Hash;
use crate::error::{CodecError, ValidationError};

/// Discriminant of a state action or block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum ActionKind {
    // Asset lifecycle
    AssetDefinition = 1,
    Transfer = 2,
    Voucher = 3,

    // Governance
    GovernanceProposal = 4,
    GovernanceVote = 5,

    // Identity and execution
    Identity = 6,
    Transaction = 7,
    Transition = 8,
    Instruction = 9,

    // Block structures
    HashProof = 10,
    RelayBlock = 11,
    ClusterBlock = 12,
}

impl ActionKind {
    /// All kinds, in discriminant order.
    pub const ALL: [ActionKind; 12] = [
        ActionKind::AssetDefinition,
        ActionKind::Transfer,
        ActionKind::Voucher,
        ActionKind::GovernanceProposal,
        ActionKind::GovernanceVote,
        ActionKind::Identity,
        ActionKind::Transaction,
        ActionKind::Transition,
        ActionKind::Instruction,
        ActionKind::HashProof,
        ActionKind::RelayBlock,
        ActionKind::ClusterBlock,
    ];

    /// Wire discriminant.
    pub fn to_u64(self) -> u64 {
        self as u64
    }

    /// Resolve a wire discriminant.
    pub fn from_u64(value: u64) -> Result<Self, CodecError> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.to_u64() == value)
            .ok_or(CodecError::UnknownKind(value))
    }

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::AssetDefinition => "ASSETDEFINITION",
            ActionKind::Transfer => "TRANSFER",
            ActionKind::Voucher => "VOUCHER",
            ActionKind::GovernanceProposal => "GOVERNANCEPROPOSAL",
            ActionKind::GovernanceVote => "GOVERNANCEVOTE",
            ActionKind::Identity => "IDENTITY",
            ActionKind::Transaction => "TRANSACTION",
            ActionKind::Transition => "TRANSITION",
            ActionKind::Instruction => "INSTRUCTION",
            ActionKind::HashProof => "HASHPROOF",
            ActionKind::RelayBlock => "RELAYBLOCK",
            ActionKind::ClusterBlock => "CLUSTERBLOCK",
        }
    }

    /// Whether this kind may be batched into a hash proof.
    pub fn is_proof_element(self) -> bool {
        matches!(
            self,
            ActionKind::Transaction
                | ActionKind::Transition
                | ActionKind::Transfer
                | ActionKind::Voucher
                | ActionKind::GovernanceProposal
                | ActionKind::GovernanceVote
        )
    }

    /// Whether this kind is one of the block structures.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            ActionKind::HashProof | ActionKind::RelayBlock | ActionKind::ClusterBlock
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CodecError::UnsupportedFieldType(format!("kind {s}")))
    }
}

/// The contract every state action payload satisfies.
///
/// Implementors are flat records; the block structures only rely on these
/// methods, never on field layout.
pub trait StateAction {
    /// The kind tag.
    fn kind(&self) -> ActionKind;

    /// Creation time in Unix milliseconds.
    fn timestamp(&self) -> u64;

    /// Canonical bytes, including any attached authorizations.
    fn to_canonical_bytes(&self) -> Vec<u8>;

    /// Lossy debug projection. Not hash-canonical.
    fn to_json(&self) -> serde_json::Value;

    /// Self-validation. Never panics.
    fn is_valid(&self) -> Result<(), ValidationError>;

    /// SHA-256 of the canonical bytes.
    fn to_hash(&self) -> Sha256Hash {
        Sha256Hash::hash(&self.to_canonical_bytes())
    }

    /// Canonical bytes as lowercase hex.
    fn to_hex(&self) -> String {
        hex::encode(self.to_canonical_bytes())
    }
}

/// Decoding half of the contract.
pub trait CanonicalDecode: Sized {
    /// Decode from canonical bytes. Trailing bytes are an error.
    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, CodecError>;

    /// Decode from the hex rendering of the canonical bytes.
    fn from_hex(s: &str) -> Result<Self, CodecError> {
        let bytes = crate::crypto::decode_hex(s)?;
        Self::from_canonical_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminant_roundtrip() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_u64(kind.to_u64()).unwrap(), kind);
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_discriminant_is_fatal() {
        assert_eq!(ActionKind::from_u64(0), Err(CodecError::UnknownKind(0)));
        assert_eq!(ActionKind::from_u64(999), Err(CodecError::UnknownKind(999)));
        assert!("NOPE".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_proof_element_set() {
        let allowed: Vec<_> = ActionKind::ALL
            .into_iter()
            .filter(|k| k.is_proof_element())
            .collect();
        assert_eq!(
            allowed,
            vec![
                ActionKind::Transfer,
                ActionKind::Voucher,
                ActionKind::GovernanceProposal,
                ActionKind::GovernanceVote,
                ActionKind::Transaction,
                ActionKind::Transition,
            ]
        );
        assert!(!ActionKind::HashProof.is_proof_element());
        assert!(ActionKind::ClusterBlock.is_block());
    }
}
