//! Merkle roots over element hashes.
//!
//! Binary tree with `parent = SHA-256(left || right)`. A node without a
//! sibling is promoted to the next level unchanged, so a single leaf is its
//! own root. The empty tree has the zero hash as its root.

use cairn_core::Sha256Hash;

/// Root of the tree over `leaves`, in the given order.
pub fn merkle_root(leaves: &[Sha256Hash]) -> Sha256Hash {
    if leaves.is_empty() {
        return Sha256Hash::ZERO;
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => Sha256Hash::hash_pair(left, right),
                _ => pair[0],
            })
            .collect();
    }
    level[0]
}
