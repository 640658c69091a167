//! Proof-of-work target arithmetic.
//!
//! A candidate hash, read as a 256-bit big-endian integer, satisfies a
//! difficulty when it is strictly below `(2^256 - 1) / difficulty`.

use num_bigint::BigUint;

use cairn_core::Sha256Hash;

/// The largest possible hash value, `2^256 - 1`.
pub fn max_hash() -> BigUint {
    (BigUint::from(1u8) << 256usize) - BigUint::from(1u8)
}

/// Acceptance threshold for `difficulty`. Zero maps to [`max_hash`].
pub fn target(difficulty: u64) -> BigUint {
    if difficulty == 0 {
        max_hash()
    } else {
        max_hash() / BigUint::from(difficulty)
    }
}

/// Whether `hash` meets `difficulty`. Difficulties of zero and one accept
/// every hash.
pub fn meets_target(hash: &Sha256Hash, difficulty: u64) -> bool {
    difficulty <= 1 || hash.to_biguint() < target(difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trivial_difficulty() {
        let top = Sha256Hash::from_bytes([0xff; 32]);
        assert!(meets_target(&top, 0));
        assert!(meets_target(&top, 1));
        assert!(!meets_target(&top, 2));
    }

    #[test]
    fn test_target_halves() {
        assert_eq!(target(2), max_hash() / BigUint::from(2u8));
        assert!(target(4) < target(2));
    }

    #[test]
    fn test_zero_hash_always_passes() {
        assert!(meets_target(&Sha256Hash::ZERO, u64::MAX));
    }

    proptest! {
        #[test]
        fn test_higher_difficulty_never_accepts_more(seed in any::<[u8; 32]>(), d in 1u64..1_000_000) {
            let hash = Sha256Hash::hash(&seed);
            if meets_target(&hash, d + 1) {
                prop_assert!(meets_target(&hash, d));
            }
        }
    }
}
