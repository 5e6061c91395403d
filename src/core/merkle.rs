use crate::core::Transaction;
use crate::utils::HashingService;

/// Merkle root computation over a block's transactions.
///
/// Leaves are transaction fingerprints in block order. Each layer hashes
/// adjacent pairs; an odd last item is paired with itself, so no leaf is ever
/// dropped. A lone leaf still gets hashed (with itself), which keeps the root a
/// digest in every case.
pub struct MerkleTree;

impl MerkleTree {
    /// Root over the fingerprints of `transactions`
    pub fn calculate_root(hasher: &dyn HashingService, transactions: &[Transaction]) -> String {
        let leaves: Vec<String> = transactions.iter().map(|tx| tx.fingerprint()).collect();
        Self::calculate_root_from_leaves(hasher, &leaves)
    }

    /// Root over arbitrary text leaves; empty input has an empty root
    pub fn calculate_root_from_leaves(hasher: &dyn HashingService, leaves: &[String]) -> String {
        if leaves.is_empty() {
            return String::new();
        }

        if leaves.len() == 1 {
            return Self::hash_pair(hasher, &leaves[0], &leaves[0]);
        }

        let mut current_level = leaves.to_vec();

        while current_level.len() > 1 {
            current_level = Self::next_level(hasher, &current_level);
        }

        current_level.into_iter().next().unwrap_or_default()
    }

    fn next_level(hasher: &dyn HashingService, level: &[String]) -> Vec<String> {
        level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                // Duplicate the last item if odd number
                let right = pair.get(1).unwrap_or(left);
                Self::hash_pair(hasher, left, right)
            })
            .collect()
    }

    fn hash_pair(hasher: &dyn HashingService, left: &str, right: &str) -> String {
        let mut combined = String::with_capacity(left.len() + right.len());
        combined.push_str(left);
        combined.push_str(right);
        hasher.digest_str(&combined)
    }

    /// Verify that a list of transactions produces the expected Merkle root
    pub fn verify_transactions(
        hasher: &dyn HashingService,
        transactions: &[Transaction],
        expected_root: &str,
    ) -> bool {
        Self::calculate_root(hasher, transactions) == expected_root
    }
}
