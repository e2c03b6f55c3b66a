//! Merkle path arithmetic over a flat, layered tree.
//!
//! Layer 0 holds `2^(height-1)` leaves; the parent of node `i` is `i / 2` and
//! its sibling is `i ^ 1`. Even indices are left children.

use crate::hash::{hash_pair, sha256, Hash};

/// Leaf committed for a revealed one-time proof.
#[inline]
pub fn leaf_from_proof(proof: &Hash) -> Hash {
    sha256(proof)
}

/// Number of leaves in layer 0 of a tree with `height` layers.
pub fn leaf_capacity(height: u8) -> u64 {
    1u64 << height.saturating_sub(1)
}

/// Dedicated recovery leaf: the last leaf of layer 0.
pub fn recovery_index(height: u8) -> u32 {
    (leaf_capacity(height) - 1) as u32
}

/// Folds `leaf` up through `path`, picking sides from the bits of `index`.
pub fn compute_root(leaf: &Hash, index: u32, path: &[Hash]) -> Hash {
    let mut node = *leaf;
    let mut position = index;
    for sibling in path {
        node = if position & 1 == 0 {
            hash_pair(&node, sibling)
        } else {
            hash_pair(sibling, &node)
        };
        position >>= 1;
    }
    node
}

pub fn verify_path(root: &Hash, leaf: &Hash, index: u32, path: &[Hash]) -> bool {
    compute_root(leaf, index, path) == *root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers_for(leaves: Vec<Hash>) -> Vec<Vec<Hash>> {
        let mut layers = vec![leaves];
        while layers.last().map(|l| l.len()).unwrap_or(0) > 1 {
            let prev = layers.last().unwrap();
            let next = prev.chunks(2).map(|c| hash_pair(&c[0], &c[1])).collect();
            layers.push(next);
        }
        layers
    }

    fn path_for(layers: &[Vec<Hash>], index: usize) -> Vec<Hash> {
        let mut i = index;
        let mut path = Vec::new();
        for layer in &layers[..layers.len() - 1] {
            path.push(layer[i ^ 1]);
            i /= 2;
        }
        path
    }

    #[test]
    fn every_leaf_resolves_to_root() {
        let leaves: Vec<Hash> = (0u8..8).map(|i| sha256(&[i])).collect();
        let layers = layers_for(leaves.clone());
        let root = layers.last().unwrap()[0];
        for (i, leaf) in leaves.iter().enumerate() {
            let path = path_for(&layers, i);
            assert_eq!(path.len(), layers.len() - 1);
            assert!(verify_path(&root, leaf, i as u32, &path));
        }
    }

    #[test]
    fn wrong_index_does_not_verify() {
        let leaves: Vec<Hash> = (0u8..4).map(|i| sha256(&[i])).collect();
        let layers = layers_for(leaves.clone());
        let root = layers.last().unwrap()[0];
        let path = path_for(&layers, 1);
        assert!(verify_path(&root, &leaves[1], 1, &path));
        assert!(!verify_path(&root, &leaves[1], 0, &path));
    }

    #[test]
    fn recovery_index_is_last_leaf() {
        assert_eq!(leaf_capacity(5), 16);
        assert_eq!(recovery_index(5), 15);
        assert_eq!(recovery_index(2), 1);
    }
}
