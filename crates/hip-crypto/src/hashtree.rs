//! HHL (hierarchical hash list / hash tree) primitives, used by the TREE
//! ESP-protection transform. A binary Merkle tree is
//! built over a batch of random leaf secrets; the root is the anchor
//! disclosed up front, and each packet discloses one leaf plus its branch
//! (sibling hashes up to the root), letting the verifier recompute the root
//! without needing the rest of the tree.

use crate::errors::CryptoError;
use crate::hash::sha1;

/// A fully built binary hash tree over `num_leaves` leaf secrets, where
/// `num_leaves` must be a power of two.
pub struct HashTree {
    /// `levels[0]` = leaf hashes, `levels[last]` = single-element root.
    levels: Vec<Vec<[u8; 20]>>,
}

impl HashTree {
    /// Build a tree from leaf secrets, hashing each leaf once before
    /// pairing, then combining pairs level by level until a single root
    /// remains.
    pub fn build(leaves: &[Vec<u8>]) -> Result<Self, CryptoError> {
        if leaves.is_empty() || !leaves.len().is_power_of_two() {
            return Err(CryptoError::InvalidChainParameters(
                "hash tree leaf count must be a non-zero power of two",
            ));
        }
        let leaf_hashes: Vec<[u8; 20]> = leaves.iter().map(|leaf| sha1(leaf)).collect();
        let mut levels = vec![leaf_hashes];
        while levels.last().unwrap().len() > 1 {
            let prev = levels.last().unwrap();
            let mut next = Vec::with_capacity(prev.len() / 2);
            for pair in prev.chunks_exact(2) {
                let mut combined = Vec::with_capacity(40);
                combined.extend_from_slice(&pair[0]);
                combined.extend_from_slice(&pair[1]);
                next.push(sha1(&combined));
            }
            levels.push(next);
        }
        Ok(HashTree { levels })
    }

    pub fn root(&self) -> [u8; 20] {
        self.levels.last().unwrap()[0]
    }

    pub fn num_leaves(&self) -> usize {
        self.levels[0].len()
    }

    /// The sibling-hash branch for leaf `index`, bottom to top. The
    /// verifier combines these with the disclosed leaf hash to recompute
    /// the root.
    pub fn branch(&self, index: usize) -> Result<Vec<[u8; 20]>, CryptoError> {
        if index >= self.num_leaves() {
            return Err(CryptoError::InvalidChainParameters("leaf index out of range"));
        }
        let mut branch = Vec::with_capacity(self.levels.len() - 1);
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = idx ^ 1;
            branch.push(level[sibling]);
            idx /= 2;
        }
        Ok(branch)
    }
}

/// Verify that `leaf` combined with `branch` reproduces `root`, given the
/// leaf's index within the tree (needed to know, at each level, whether the
/// running hash is the left or right child).
pub fn verify_branch(leaf: &[u8], index: usize, branch: &[[u8; 20]], root: &[u8; 20]) -> bool {
    let mut current = sha1(leaf);
    let mut idx = index;
    for sibling in branch {
        let mut combined = Vec::with_capacity(40);
        if idx % 2 == 0 {
            combined.extend_from_slice(&current);
            combined.extend_from_slice(sibling);
        } else {
            combined.extend_from_slice(sibling);
            combined.extend_from_slice(&current);
        }
        current = sha1(&combined);
        idx /= 2;
    }
    &current == root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8; 4]).collect()
    }

    #[test]
    fn rejects_non_power_of_two_leaf_count() {
        assert!(HashTree::build(&leaves(3)).is_err());
    }

    #[test]
    fn every_leaf_branch_verifies_against_root() {
        let data = leaves(8);
        let tree = HashTree::build(&data).unwrap();
        let root = tree.root();
        for (idx, leaf) in data.iter().enumerate() {
            let branch = tree.branch(idx).unwrap();
            assert!(verify_branch(leaf, idx, &branch, &root));
        }
    }

    #[test]
    fn tampered_leaf_fails_verification() {
        let data = leaves(4);
        let tree = HashTree::build(&data).unwrap();
        let root = tree.root();
        let branch = tree.branch(1).unwrap();
        assert!(!verify_branch(b"not the real leaf", 1, &branch, &root));
    }

    #[test]
    fn branch_index_out_of_range_is_rejected() {
        let tree = HashTree::build(&leaves(4)).unwrap();
        assert!(tree.branch(4).is_err());
    }

    #[test]
    fn single_leaf_tree_has_empty_branch_and_root_is_leaf_hash() {
        let data = leaves(1);
        let tree = HashTree::build(&data).unwrap();
        let branch = tree.branch(0).unwrap();
        assert!(branch.is_empty());
        assert!(verify_branch(&data[0], 0, &branch, &tree.root()));
    }
}
