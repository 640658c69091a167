//! # Cairn Authorization
//!
//! Cryptographic authorization envelopes attached to state actions and blocks.
//!
//! ## Key Concepts
//!
//! - **Signable**: anything that can expose its canonical bytes with the
//!   authorizations themselves excluded
//! - **AuthorizationEnvelope**: one signer's signature, public key, moniker and
//!   derived address over a signable target
//! - **MultiAuthorization**: an ordered set of envelopes, unique by moniker
//! - **Signer**: an asynchronous signing identity
//!
//! Targets whose signable bytes exceed [`SIGN_HASH_THRESHOLD`] are signed over
//! their SHA-256 digest; verification applies the same switch.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cairn_auth::{LocalSigner, MultiAuthorization, Signable};
//!
//! struct Note(Vec<u8>);
//!
//! impl Signable for Note {
//!     fn signable_bytes(&self) -> Vec<u8> {
//!         self.0.clone()
//!     }
//! }
//!
//! async fn example() {
//!     let signer = LocalSigner::generate("alice");
//!     let note = Note(b"hello".to_vec());
//!
//!     let mut auths = MultiAuthorization::new();
//!     auths.sign(&note, &signer).await.unwrap();
//!     assert!(auths.verify(&note).is_ok());
//! }
//! ```

pub mod envelope;
pub mod error;
pub mod multi;
pub mod signer;

pub use envelope::{signing_payload, AuthorizationEnvelope, SIGN_HASH_THRESHOLD};
pub use error::{AuthError, Result};
pub use multi::MultiAuthorization;
pub use signer::{LocalSigner, Signable, Signer};
