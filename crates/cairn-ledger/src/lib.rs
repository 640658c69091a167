//! # Cairn Ledger
//!
//! Block structures that batch, order and validate state actions.
//!
//! ## Key Types
//!
//! - [`ActionRecord`] - A flat, signed state action
//! - [`HashProof`] - Proof-of-work-linked batch of ordered state actions
//! - [`RelayBlock`] - Epoch-scoped block over actions and cluster announcements
//! - [`ClusterBlock`] - Per-cluster timestamp-ordered index over proof contents
//! - [`LedgerConfig`] - Validation windows and limits
//!
//! Every structure encodes through the canonical codec in `cairn-core` and
//! implements [`cairn_core::StateAction`] and [`cairn_core::CanonicalDecode`].
//!
//! ## Validation
//!
//! `validate` runs ordered stages and reports the first failing one as a
//! [`cairn_core::ValidationError`]. Time-dependent checks have `*_at(now)`
//! variants taking Unix milliseconds.

pub mod clock;
pub mod cluster;
pub mod config;
pub mod error;
pub mod merkle;
pub mod pow;
pub mod proof;
pub mod record;
pub mod relay;
pub mod validation;

pub use clock::now_millis;
pub use cluster::{
    ClusterBlock, ClusterBlockHeader, ClusterBlockPayload, ClusterElement, ConsiderKey,
    OrderedEntry, CLUSTER_BLOCK_VERSION,
};
pub use config::{LedgerConfig, MAX_PROOF_ELEMENTS};
pub use error::{LedgerError, Result};
pub use merkle::merkle_root;
pub use proof::{HashProof, HashProofHeader, HashProofPayload, ProofStage, HASH_PROOF_VERSION};
pub use record::{ActionBuilder, ActionRecord, ACTION_RECORD_VERSION};
pub use relay::{
    ClusterAnnouncement, RelayBlock, RelayBlockHeader, RelayBlockPayload, RELAY_BLOCK_VERSION,
};
pub use validation::is_valid_cluster_name;
