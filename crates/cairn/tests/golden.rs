//! Golden vectors for cross-implementation verification.
//!
//! Every implementation must produce identical canonical bytes and hashes for
//! these inputs. Signatures are deterministic Ed25519, so signed structures
//! are pinned too.

use cairn::{
    ActionKind, ActionRecord, CanonicalDecode, HashProof, LedgerConfig, LocalSigner, Sha256Hash,
    StateAction,
};
use cairn_testkit::vectors::{all_proof_vectors, proof_from_vector, verify_codec_vectors};
use serde::{Deserialize, Serialize};

/// A single rendered vector.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct GoldenProof {
    pub name: String,
    pub proof_hex: String,
    pub proof_hash: String,
    pub merkle_root: String,
}

fn render(name: &str, proof: &HashProof) -> GoldenProof {
    GoldenProof {
        name: name.to_string(),
        proof_hex: proof.to_hex(),
        proof_hash: proof.to_hash().to_hex(),
        merkle_root: proof.header.merkle_root.to_hex(),
    }
}

/// Canonical bytes of [`example_proof`].
const EXAMPLE_PROOF_HEX: &str = concat!(
    "0a010100000680a0acacc6320c636f72652e62616e6b696e6705616c69636520208a3e36",
    "25891b7d6444c6cc9aa50cde95af94f72ad2ee05e88e75bbc039a33601000100c50101c2",
    "01070106f4a3acacc63221031f0466726f6d0005616c69636502746f0003626f6206616d",
    "6f756e740202e80795010192010f404f403b812632af6d6bb93ab8e310f62e00fb3a5999",
    "13a8eb6d291c6d04b9e0be363c96959ecb4b203b5e4201ff2e13d48bbcd07d304f0cbe66",
    "2be102bf49a70d202152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e06",
    "9881db1205616c6963652862373035616564373130363763333666363864623065306635",
    "353963336633666130343333313566",
);

const EXAMPLE_PROOF_HASH: &str = "44c9b019507bacd1aae515f233627775a492b7c03e199f6e429f3720f7dfcbf8";

const EXAMPLE_MERKLE_ROOT: &str = "208a3e3625891b7d6444c6cc9aa50cde95af94f72ad2ee05e88e75bbc039a336";

async fn example_proof() -> HashProof {
    let alice = LocalSigner::from_seed("alice", &[0x42; 32]);
    let action = ActionRecord::builder(ActionKind::Transaction)
        .timestamp(1_736_870_400_500)
        .field("from", "alice")
        .field("to", "bob")
        .field("amount", 1_000u64)
        .sign(&alice)
        .await
        .unwrap();

    let mut proof = HashProof::genesis("core.banking", "alice", 1_736_870_400_000);
    proof.consider(action).unwrap();
    proof
}

#[tokio::test]
async fn golden_example_proof_is_stable() {
    let first = example_proof().await;
    let second = example_proof().await;

    assert_eq!(first.header.height, 0);
    assert_eq!(first.header.previous_hash, None);
    assert_eq!(first.header.nonce, 0);
    assert_eq!(first.header.difficulty, 0);
    assert_eq!(first.to_hash(), second.to_hash());
    assert_eq!(first.to_hex(), second.to_hex());

    assert_eq!(first.to_hex(), EXAMPLE_PROOF_HEX);
    assert_eq!(first.to_hash().to_hex(), EXAMPLE_PROOF_HASH);
    assert_eq!(first.header.merkle_root.to_hex(), EXAMPLE_MERKLE_ROOT);
}

#[tokio::test]
async fn golden_example_proof_decodes_bit_identical() {
    let proof = example_proof().await;

    let decoded = HashProof::from_hex(EXAMPLE_PROOF_HEX).unwrap();
    assert_eq!(decoded, proof);
    assert_eq!(decoded.to_hex(), EXAMPLE_PROOF_HEX);
    assert_eq!(decoded.to_hash().to_hex(), EXAMPLE_PROOF_HASH);
    assert_eq!(decoded.validate_at(1_736_870_400_000, &LedgerConfig::default()), Ok(()));
}

#[tokio::test]
async fn golden_example_proof_layout() {
    let proof = example_proof().await;
    let bytes = proof.to_canonical_bytes();

    // varint(HASHPROOF = 10) || varint(version = 1) || [height = 0] || [no previous hash]
    assert_eq!(&bytes[..5], &[0x0a, 0x01, 0x01, 0x00, 0x00]);
    assert_eq!(
        proof.header.merkle_root,
        proof.payload.elements()[0].to_hash(),
        "a single leaf is its own root"
    );
}

#[test]
fn golden_codec_vectors() {
    for (name, ok, hex) in verify_codec_vectors() {
        assert!(ok, "codec vector '{name}' encoded as {hex}");
    }
}

#[test]
fn golden_proof_vectors_render_identically() {
    let render_all = || -> Vec<GoldenProof> {
        all_proof_vectors()
            .iter()
            .map(|v| render(v.name, &proof_from_vector(v)))
            .collect()
    };

    let json = serde_json::to_string_pretty(&render_all()).unwrap();
    let parsed: Vec<GoldenProof> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, render_all());

    for (vector, pinned) in parsed.iter().zip(all_proof_vectors()) {
        assert_eq!(vector.proof_hex, pinned.expected_hex, "{}", vector.name);
        assert_eq!(vector.proof_hash, pinned.expected_hash, "{}", vector.name);

        let proof = HashProof::from_hex(&vector.proof_hex).unwrap();
        assert_eq!(proof.to_hash().to_hex(), vector.proof_hash);
        assert_eq!(Sha256Hash::from_hex(&vector.merkle_root).unwrap(), proof.header.merkle_root);
    }
}

#[test]
fn golden_empty_proof_root_is_zero() {
    let proof = HashProof::genesis("eu.settlement", "carol", 1);
    assert_eq!(proof.header.merkle_root, Sha256Hash::ZERO);
}
