//! # Cairn Testkit
//!
//! Testing utilities for Cairn.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known encodings with expected bytes for
//!   cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Named deterministic signers and signed state actions
//!
//! ## Golden Vectors
//!
//! ```rust
//! use cairn_testkit::vectors::{codec_vectors, verify_codec_vectors};
//!
//! for (name, ok, hex) in verify_codec_vectors() {
//!     assert!(ok, "{name} encoded as {hex}");
//! }
//! assert!(!codec_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cairn_testkit::generators::{action_from_params, ActionParams};
//!
//! proptest! {
//!     #[test]
//!     fn action_hash_is_deterministic(params: ActionParams) {
//!         let a = action_from_params(&params);
//!         let b = action_from_params(&params);
//!         prop_assert_eq!(a.to_hash(), b.to_hash());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use cairn_testkit::fixtures::TestFixture;
//! use cairn_core::ActionKind;
//!
//! async fn example() {
//!     let alice = TestFixture::new("alice");
//!     let action = alice.action(ActionKind::Transfer, 1).await;
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, signer, TestFixture, FIXTURE_EPOCH_MS};
pub use generators::{action_from_params, ActionParams};
pub use vectors::{
    all_proof_vectors, codec_vectors, proof_from_vector, proof_vector_hashes,
    verify_codec_vectors, CodecVector, ProofVector,
};
