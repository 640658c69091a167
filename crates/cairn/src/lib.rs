//! # Cairn
//!
//! The unified API for Cairn, the primitives and encoding layer of a
//! permissioned ledger.
//!
//! ## Overview
//!
//! - **Canonical codec**: byte-exact encoding behind every hash and signature
//! - **Authorizations**: signed envelopes attached to state actions and blocks
//! - **Hash proofs**: proof-of-work-linked batches of ordered state actions
//! - **Relay blocks**: epoch-scoped blocks requiring the proposer's signature
//! - **Cluster blocks**: per-cluster ordered indexes over proof contents
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cairn::{ActionKind, ActionRecord, HashProof, LocalSigner, StateAction};
//!
//! async fn example() {
//!     let alice = LocalSigner::generate("alice");
//!
//!     let transfer = ActionRecord::builder(ActionKind::Transfer)
//!         .timestamp(cairn::now_millis())
//!         .field("to", "bob")
//!         .field("amount", 10u64)
//!         .sign(&alice)
//!         .await
//!         .unwrap();
//!
//!     let mut proof = HashProof::genesis("core.banking", "alice", cairn::now_millis());
//!     proof.consider(transfer).unwrap();
//!     assert!(proof.is_valid().is_ok());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `cairn::core` - Codec, hashing, signatures, the state action contract
//! - `cairn::auth` - Authorization envelopes and signers
//! - `cairn::ledger` - Hash proofs, relay blocks, cluster blocks

pub mod error;
pub mod intake;

pub use cairn_auth as auth;
pub use cairn_core as core;
pub use cairn_ledger as ledger;

pub use error::{Rejection, Result};
pub use intake::{accept, accept_hex};

pub use cairn_auth::{
    AuthorizationEnvelope, LocalSigner, MultiAuthorization, Signable, Signer, SIGN_HASH_THRESHOLD,
};
pub use cairn_core::{
    ActionKind, CanonicalDecode, CanonicalValue, CodecError, Keypair, PublicKey, Sha256Hash,
    Signature, StateAction, ValidationError,
};
pub use cairn_ledger::{
    now_millis, ActionRecord, ClusterBlock, ConsiderKey, HashProof, LedgerConfig, LedgerError,
    ProofStage, RelayBlock,
};
