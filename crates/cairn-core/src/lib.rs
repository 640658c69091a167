//! # Cairn Core
//!
//! Pure primitives for the Cairn ledger: the canonical codec, hashing,
//! signatures, and the state action contract.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`CanonicalValue`] - Self-describing tagged value with a unique encoding
//! - [`CanonicalWriter`] / [`CanonicalReader`] - Field framing for ledger structures
//! - [`Sha256Hash`] - 32-byte digest, hex-rendered
//! - [`ActionKind`] - Closed set of state action and block kinds
//! - [`StateAction`] - Contract every ledger payload satisfies
//!
//! ## Errors
//!
//! Decoding faults are fatal [`CodecError`]s. Validation never fails that way:
//! it reports a [`ValidationError`] naming the stage that rejected the input.

pub mod action;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod varint;

pub use action::{ActionKind, CanonicalDecode, StateAction};
pub use canonical::{decode, encode, CanonicalReader, CanonicalValue, CanonicalWriter, MAX_DEPTH};
pub use crypto::{decode_hex, derive_address, Keypair, PublicKey, Sha256Hash, Signature};
pub use error::{CodecError, CoreError, ValidationError};
pub use num_bigint::BigUint;
