//! Golden test vectors for deterministic verification.
//!
//! Codec vectors pin exact bytes. Proof vectors pin the shape of a proof;
//! their hashes must be stable across runs and across decode/encode.

use num_bigint::BigUint;

use cairn_core::{encode, ActionKind, CanonicalValue, StateAction};
use cairn_ledger::{ActionRecord, HashProof};

/// A canonical value with its expected encoding.
#[derive(Debug, Clone)]
pub struct CodecVector {
    pub name: &'static str,
    pub value: CanonicalValue,
    /// Expected canonical bytes (hex).
    pub expected_hex: &'static str,
}

/// All codec vectors.
pub fn codec_vectors() -> Vec<CodecVector> {
    vec![
        CodecVector {
            name: "short string",
            value: CanonicalValue::from("core.banking"),
            expected_hex: "000c636f72652e62616e6b696e67",
        },
        CodecVector {
            name: "two-byte unsigned int",
            value: CanonicalValue::from(300u64),
            expected_hex: "0202ac02",
        },
        CodecVector {
            name: "boolean true",
            value: CanonicalValue::from(true),
            expected_hex: "040101",
        },
        CodecVector {
            name: "bigint 2^64",
            value: CanonicalValue::BigInt(BigUint::from(1u8) << 64usize),
            expected_hex: "010a80808080808080808002",
        },
        CodecVector {
            name: "empty object",
            value: CanonicalValue::Object(Vec::new()),
            expected_hex: "0300",
        },
        CodecVector {
            name: "object with one string field",
            value: CanonicalValue::object([("a", CanonicalValue::from("b"))]),
            expected_hex: "03050161000162",
        },
        CodecVector {
            name: "mixed array",
            value: CanonicalValue::Array(vec![
                CanonicalValue::from(1u64),
                CanonicalValue::from(false),
            ]),
            expected_hex: "0506020101040100",
        },
    ]
}

/// Encode every codec vector and compare against the expected bytes.
///
/// Returns `(name, matches, actual hex)` per vector.
pub fn verify_codec_vectors() -> Vec<(String, bool, String)> {
    codec_vectors()
        .iter()
        .map(|v| {
            let hex = match encode(&v.value) {
                Ok(bytes) => hex::encode(bytes),
                Err(e) => e.to_string(),
            };
            (v.name.to_string(), hex == v.expected_hex, hex)
        })
        .collect()
}

/// The shape of a hash proof.
#[derive(Debug, Clone)]
pub struct ProofVector {
    pub name: &'static str,
    pub cluster: &'static str,
    pub proposer: &'static str,
    pub timestamp: u64,
    pub difficulty: u64,
    /// `(kind, timestamp)` of each unsigned element, in consider order.
    pub elements: &'static [(ActionKind, u64)],
    /// Pinned canonical bytes of the resulting proof, hex.
    pub expected_hex: &'static str,
    /// Pinned proof hash, hex.
    pub expected_hash: &'static str,
}

/// All proof vectors.
pub fn all_proof_vectors() -> Vec<ProofVector> {
    vec![
        ProofVector {
            name: "genesis with one transaction",
            cluster: "core.banking",
            proposer: "alice",
            timestamp: 1_736_870_400_000,
            difficulty: 0,
            elements: &[(ActionKind::Transaction, 1_736_870_400_001)],
            expected_hex: concat!(
                "0a010100000680a0acacc6320c636f72652e62616e6b696e6705616c696365207a0c8bc2",
                "9904e22763b0bdb66a56750adb774a7d80e9d62d33b4ac25d9a6ea7c0100010019011707",
                "010681a0acacc6320b030905696e6465780201000100",
            ),
            expected_hash: "89fb8b18a6b52d973f80ad0c594cfe8ae7293821d794899ccc0ec87d77e9f9a2",
        },
        ProofVector {
            name: "genesis with interleaved kinds",
            cluster: "core.banking",
            proposer: "bob",
            timestamp: 1_736_870_400_000,
            difficulty: 0,
            elements: &[
                (ActionKind::Transfer, 1_736_870_400_030),
                (ActionKind::Voucher, 1_736_870_400_010),
                (ActionKind::GovernanceVote, 1_736_870_400_020),
            ],
            expected_hex: concat!(
                "0a010100000680a0acacc6320c636f72652e62616e6b696e6703626f622079b470b243e1",
                "f05ff666fe29ebb7aa8787aeb1095437e0dd7801e97656b6b8f9010001004903170301068a",
                "a0acacc6320b030905696e64657802010101001705010694a0acacc6320b030905696e6465",
                "780201020100170201069ea0acacc6320b030905696e6465780201000100",
            ),
            expected_hash: "461b69824f97d5a76ede001b015e7af11a42af3fe2e45743f282f442d6ac6afb",
        },
        ProofVector {
            name: "empty genesis",
            cluster: "eu.settlement",
            proposer: "carol",
            timestamp: 1_736_870_400_000,
            difficulty: 0,
            elements: &[],
            expected_hex: concat!(
                "0a010100000680a0acacc6320d65752e736574746c656d656e74056361726f6c20000000",
                "0000000000000000000000000000000000000000000000000000000000010001000100",
            ),
            expected_hash: "20db5431ca5554f3506c98c4beeaab0d75634304f803748ca55b2d912b125202",
        },
    ]
}

/// Build the proof a vector describes. Elements are unsigned and carry
/// their index as the only body field.
pub fn proof_from_vector(vector: &ProofVector) -> HashProof {
    let mut proof = HashProof::genesis(vector.cluster, vector.proposer, vector.timestamp)
        .with_difficulty(vector.difficulty);
    for (i, &(kind, ts)) in vector.elements.iter().enumerate() {
        let element = ActionRecord::builder(kind)
            .timestamp(ts)
            .field("index", i as u64)
            .build();
        proof
            .consider(element)
            .expect("vector elements are proof element kinds");
    }
    proof
}

/// Hex of each proof vector's hash.
pub fn proof_vector_hashes() -> Vec<(String, String)> {
    all_proof_vectors()
        .iter()
        .map(|v| (v.name.to_string(), proof_from_vector(v).to_hash().to_hex()))
        .collect()
}
