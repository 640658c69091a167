//! Proptest generators for property-based testing.

use num_bigint::BigUint;
use proptest::prelude::*;

use cairn_core::{ActionKind, CanonicalValue, Sha256Hash};
use cairn_ledger::ActionRecord;

/// Generate a random hash.
pub fn sha256_hash() -> impl Strategy<Value = Sha256Hash> {
    any::<[u8; 32]>().prop_map(Sha256Hash::from_bytes)
}

/// Generate a timestamp in Unix milliseconds, never zero.
pub fn timestamp() -> impl Strategy<Value = u64> {
    1u64..=4_000_000_000_000
}

/// Generate any kind a hash proof accepts.
pub fn proof_element_kind() -> impl Strategy<Value = ActionKind> {
    let kinds: Vec<_> = ActionKind::ALL
        .into_iter()
        .filter(|k| k.is_proof_element())
        .collect();
    prop::sample::select(kinds)
}

/// Generate a well-formed cluster name.
pub fn cluster_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,7}\\.[a-z][a-z0-9_]{0,7}".prop_map(String::from)
}

/// Generate an object key.
pub fn field_key() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,11}".prop_map(String::from)
}

/// Generate a canonical value up to four levels deep.
pub fn canonical_value() -> impl Strategy<Value = CanonicalValue> {
    let leaf = prop_oneof![
        ".{0,16}".prop_map(CanonicalValue::String),
        any::<u64>().prop_map(CanonicalValue::UnsignedInt),
        any::<bool>().prop_map(CanonicalValue::Boolean),
        prop::collection::vec(any::<u8>(), 0..40)
            .prop_map(|bytes| CanonicalValue::BigInt(BigUint::from_bytes_be(&bytes))),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(CanonicalValue::Array),
            prop::collection::vec((field_key(), inner), 0..6).prop_map(CanonicalValue::Object),
        ]
    })
}

/// Parameters for generating an unsigned action.
#[derive(Debug, Clone)]
pub struct ActionParams {
    pub kind: ActionKind,
    pub timestamp: u64,
    pub fields: Vec<(String, CanonicalValue)>,
}

impl Arbitrary for ActionParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            proof_element_kind(),
            timestamp(),
            prop::collection::vec((field_key(), canonical_value()), 0..4),
        )
            .prop_map(|(kind, timestamp, fields)| ActionParams {
                kind,
                timestamp,
                fields,
            })
            .boxed()
    }
}

/// Build the unsigned action described by `params`.
pub fn action_from_params(params: &ActionParams) -> ActionRecord {
    ActionRecord::new(
        params.kind,
        params.timestamp,
        CanonicalValue::Object(params.fields.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::{decode, encode, CanonicalDecode, StateAction};
    use cairn_ledger::{is_valid_cluster_name, ClusterBlockPayload, ConsiderKey, HashProof};

    proptest! {
        #[test]
        fn test_value_roundtrip_reports_consumed_length(value in canonical_value()) {
            let bytes = encode(&value).unwrap();
            let (decoded, consumed) = decode(&bytes).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(consumed, bytes.len());
        }

        #[test]
        fn test_action_hash_deterministic(params: ActionParams) {
            let a = action_from_params(&params);
            let b = action_from_params(&params);
            prop_assert_eq!(a.to_hash(), b.to_hash());
        }

        #[test]
        fn test_generated_clusters_are_valid(name in cluster_name()) {
            prop_assert!(is_valid_cluster_name(&name));
        }

        #[test]
        fn test_proof_payload_stays_ordered(
            cluster in cluster_name(),
            actions in prop::collection::vec(any::<ActionParams>(), 0..24),
        ) {
            let mut proof = HashProof::genesis(cluster, "alice", 1);
            for params in &actions {
                proof.consider(action_from_params(params)).unwrap();
            }
            let ts: Vec<_> = proof.payload.elements().iter().map(|e| e.timestamp).collect();
            prop_assert!(ts.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(proof.header.merkle_root, proof.payload.merkle_root());

            let decoded = HashProof::from_canonical_bytes(&proof.to_canonical_bytes()).unwrap();
            prop_assert_eq!(decoded.to_hash(), proof.to_hash());
        }

        #[test]
        fn test_cluster_payload_stays_ordered(
            keys in prop::collection::vec((timestamp(), sha256_hash(), 0u64..8), 0..32),
        ) {
            let mut payload = ClusterBlockPayload::default();
            for (ts, hash, index) in keys {
                payload.consider(&ConsiderKey {
                    timestamp: ts,
                    kind: ActionKind::Transaction,
                    source_hash: hash,
                    index,
                });
            }
            let ts: Vec<_> = payload.entries().iter().map(|e| e.timestamp).collect();
            prop_assert!(ts.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(payload.validate().is_ok());
        }
    }
}
