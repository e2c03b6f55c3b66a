//! Proof-Tree Builder
//!
//! A proof tree commits to every one-time code a wallet will accept over its
//! lifespan. Layer 0 holds `sha256(proof)` for each `(slot, sub_index)` pair
//! in slot order, followed by zero padding and, in the last position, the
//! recovery leaf. Each upper layer hashes adjacent pairs until one root
//! remains.

pub mod builder;
pub mod leaf;
pub mod session;
pub mod worker;

use std::fmt;

use otpkit_state::{
    leaf_capacity, leaf_from_proof, recovery_index, sha256, Hash, InnerCore, MAX_TREE_HEIGHT,
    MIN_TREE_HEIGHT,
};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{OtpSdkError, Result};
use crate::seed::Seed;
use crate::utils::hex_view;

pub use builder::build_tree;
pub use session::{BuildUpdate, TreeBuildSession};
pub use worker::{BuildJob, Salt, TreeWorker, WorkerEvent, WorkerMessage};

//=============================================================================
// Layers
//=============================================================================

/// All layers of a tree, leaves first, root last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layers(pub Vec<Vec<Hash>>);

impl Layers {
    pub fn root(&self) -> Option<Hash> {
        match self.0.last() {
            Some(top) if top.len() == 1 => Some(top[0]),
            _ => None,
        }
    }

    /// Store key of these layers.
    pub fn root_hex(&self) -> Option<String> {
        self.root().map(|root| hex_view(&root))
    }

    pub fn height(&self) -> usize {
        self.0.len()
    }

    pub fn leaves(&self) -> &[Hash] {
        self.0.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sibling hashes from leaf `index` up to, not including, the root.
    pub fn path(&self, index: u32) -> Result<Vec<Hash>> {
        let mut idx = index as usize;
        let mut path = Vec::with_capacity(self.height().saturating_sub(1));
        for layer in self.0.iter().take(self.height().saturating_sub(1)) {
            let sibling = layer.get(idx ^ 1).ok_or_else(|| {
                OtpSdkError::InconsistentTree(format!("leaf index {index} outside tree"))
            })?;
            path.push(*sibling);
            idx >>= 1;
        }
        Ok(path)
    }

    /// Every layer is half the one below it and every parent hashes its
    /// children.
    pub fn check(&self) -> Result<()> {
        if self.root().is_none() {
            return Err(OtpSdkError::InconsistentTree("missing root layer".into()));
        }
        for (depth, pair) in self.0.windows(2).enumerate() {
            let (lower, upper) = (&pair[0], &pair[1]);
            if lower.len() != upper.len() * 2 {
                return Err(OtpSdkError::InconsistentTree(format!(
                    "layer {depth} has {} nodes, parent layer has {}",
                    lower.len(),
                    upper.len()
                )));
            }
            for (i, parent) in upper.iter().enumerate() {
                if *parent != otpkit_state::hash_pair(&lower[2 * i], &lower[2 * i + 1]) {
                    return Err(OtpSdkError::InconsistentTree(format!(
                        "node {i} of layer {} does not hash its children",
                        depth + 1
                    )));
                }
            }
        }
        Ok(())
    }
}

// Each layer is written as one hex string of its concatenated nodes.
impl Serialize for Layers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for layer in &self.0 {
            seq.serialize_element(&hex::encode(layer.concat()))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Layers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        let mut layers = Vec::with_capacity(raw.len());
        for encoded in raw {
            let bytes = hex::decode(&encoded).map_err(de::Error::custom)?;
            if bytes.len() % 32 != 0 {
                return Err(de::Error::custom("layer length is not a multiple of 32"));
            }
            let layer = bytes
                .chunks_exact(32)
                .map(|chunk| {
                    let mut node = [0u8; 32];
                    node.copy_from_slice(chunk);
                    node
                })
                .collect();
            layers.push(layer);
        }
        Ok(Layers(layers))
    }
}

//=============================================================================
// Trees
//=============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerTree {
    pub root: Hash,
    pub hseed: Hash,
    pub layers: Layers,
}

impl InnerTree {
    pub fn identification_key(&self) -> String {
        hex::encode(sha256(&self.hseed))
    }
}

/// Result of one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofTree {
    pub root: Hash,
    pub layers: Layers,
    pub hseed: Hash,
    pub interval: u32,
    pub t0: u64,
    pub lifespan: u32,
    pub slot_size: u8,
    pub inner_trees: Vec<InnerTree>,
}

impl ProofTree {
    pub fn height(&self) -> u8 {
        self.layers.height() as u8
    }

    pub fn recovery_index(&self) -> u32 {
        recovery_index(self.height())
    }

    /// Leaf index of `(counter, sub_index)`.
    pub fn index_for(&self, counter: u64, sub_index: u8) -> Result<u32> {
        index_for(self.t0, self.lifespan, self.slot_size, counter, sub_index)
    }

    pub fn proof_for(&self, index: u32) -> Result<Vec<Hash>> {
        self.layers.path(index)
    }

    pub fn effective_time(&self) -> u64 {
        self.t0 * self.interval as u64
    }

    pub fn duration(&self) -> u64 {
        self.lifespan as u64 * self.interval as u64
    }

    pub fn identification_key(&self) -> String {
        hex::encode(sha256(&self.hseed))
    }

    /// Summaries of the inner trees as carried by the wallet configuration.
    pub fn inner_cores(&self) -> Vec<InnerCore> {
        self.inner_trees
            .iter()
            .map(|inner| InnerCore {
                root: inner.root,
                height: self.height(),
                interval: self.interval,
                t0: self.t0,
                lifespan: self.lifespan,
                slot_size: self.slot_size,
            })
            .collect()
    }

    /// Height, root and leaf count agree with the parameters, and the
    /// recovery leaf sits in the last position.
    pub fn check_consistency(&self) -> Result<()> {
        let height = self.height();
        if !(MIN_TREE_HEIGHT..=MAX_TREE_HEIGHT).contains(&height) {
            return Err(OtpSdkError::InconsistentTree(format!(
                "height {height} out of range"
            )));
        }
        let required = self.lifespan as u64 * self.slot_size as u64 + 1;
        if required > leaf_capacity(height) {
            return Err(OtpSdkError::InconsistentTree(format!(
                "{required} leaves do not fit height {height}"
            )));
        }
        check_layers(&self.layers, &self.root, &self.hseed, height)?;
        for inner in &self.inner_trees {
            if inner.layers.height() != self.layers.height() {
                return Err(OtpSdkError::InconsistentTree(
                    "inner tree height differs from primary".into(),
                ));
            }
            check_layers(&inner.layers, &inner.root, &inner.hseed, height)?;
        }
        Ok(())
    }
}

fn check_layers(layers: &Layers, root: &Hash, hseed: &Hash, height: u8) -> Result<()> {
    if layers.root().as_ref() != Some(root) {
        return Err(OtpSdkError::InconsistentTree(
            "root does not match top layer".into(),
        ));
    }
    if layers.leaves().len() as u64 != leaf_capacity(height) {
        return Err(OtpSdkError::InconsistentTree("wrong leaf count".into()));
    }
    let recovery_leaf = leaf_from_proof(&leaf::recovery_proof(hseed));
    if layers.leaves()[recovery_index(height) as usize] != recovery_leaf {
        return Err(OtpSdkError::InconsistentTree(
            "recovery leaf is not bound to hseed".into(),
        ));
    }
    layers.check()
}

pub(crate) fn index_for(
    t0: u64,
    lifespan: u32,
    slot_size: u8,
    counter: u64,
    sub_index: u8,
) -> Result<u32> {
    if sub_index >= slot_size {
        return Err(OtpSdkError::Validation(format!(
            "sub index {sub_index} exceeds slot size {slot_size}"
        )));
    }
    let slot = counter
        .checked_sub(t0)
        .filter(|slot| *slot < lifespan as u64)
        .ok_or_else(|| OtpSdkError::Validation(format!("counter {counter} outside tree")))?;
    Ok((slot * slot_size as u64 + sub_index as u64) as u32)
}

//=============================================================================
// Build Parameters
//=============================================================================

#[derive(Clone, Debug)]
pub struct TreeParams {
    pub seed: Seed,
    pub seed2: Option<Seed>,
    /// Unix seconds of the first slot.
    pub effective_time: u64,
    /// Seconds covered.
    pub duration: u64,
    pub interval: u32,
    pub slot_size: u8,
    pub inner_tree_count: u32,
}

impl TreeParams {
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(OtpSdkError::Validation("interval must be positive".into()));
        }
        if self.duration == 0 {
            return Err(OtpSdkError::Validation("duration must be positive".into()));
        }
        if self.slot_size == 0 {
            return Err(OtpSdkError::Validation("slot size must be positive".into()));
        }
        let interval = self.interval as u64;
        if self.effective_time % interval != 0 || self.duration % interval != 0 {
            return Err(OtpSdkError::Validation(
                "effective time and duration must be multiples of the interval".into(),
            ));
        }
        if self.duration / interval > u32::MAX as u64 {
            return Err(OtpSdkError::Validation("duration too long".into()));
        }
        if self.height() > MAX_TREE_HEIGHT {
            return Err(OtpSdkError::Validation(format!(
                "tree would need {} layers, at most {MAX_TREE_HEIGHT} allowed",
                self.height()
            )));
        }
        Ok(())
    }

    pub fn t0(&self) -> u64 {
        self.effective_time / self.interval.max(1) as u64
    }

    pub fn lifespan(&self) -> u32 {
        (self.duration / self.interval.max(1) as u64) as u32
    }

    /// Number of real leaves plus the recovery leaf.
    pub fn leaf_count(&self) -> u64 {
        self.lifespan() as u64 * self.slot_size as u64 + 1
    }

    /// Smallest layer count whose leaf layer holds `leaf_count()` nodes.
    pub fn height(&self) -> u8 {
        let leaves = self.leaf_count().next_power_of_two();
        let height = leaves.trailing_zeros() as u8 + 1;
        height.max(MIN_TREE_HEIGHT)
    }
}

//=============================================================================
// Progress
//=============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStage {
    Leaves,
    Layers,
    InnerTrees,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Leaves => "leaves",
            BuildStage::Layers => "layers",
            BuildStage::InnerTrees => "inner trees",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub stage: BuildStage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(duration: u64, slot_size: u8) -> TreeParams {
        TreeParams {
            seed: Seed::from_bytes([3u8; 20]),
            seed2: None,
            effective_time: 30 * 1000,
            duration,
            interval: 30,
            slot_size,
            inner_tree_count: 0,
        }
    }

    #[test]
    fn height_fits_recovery_leaf() {
        // 4 slots, 1 per slot, plus recovery: 5 leaves -> 8 -> 4 layers.
        assert_eq!(params(120, 1).height(), 4);
        // 3 slots: 4 leaves -> 3 layers.
        assert_eq!(params(90, 1).height(), 3);
        assert_eq!(params(30, 1).height(), MIN_TREE_HEIGHT);
    }

    #[test]
    fn validate_rejects_misaligned() {
        let mut p = params(100, 1);
        assert!(p.validate().is_err());
        p.duration = 120;
        p.effective_time += 1;
        assert!(p.validate().is_err());
        p.effective_time -= 1;
        p.slot_size = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn layers_serde_roundtrip() {
        let leaves = vec![[1u8; 32], [2u8; 32]];
        let root = otpkit_state::hash_pair(&leaves[0], &leaves[1]);
        let layers = Layers(vec![leaves, vec![root]]);
        let json = serde_json::to_string(&layers).unwrap();
        assert!(json.starts_with("[\"0101"));
        let back: Layers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layers);
        assert!(back.check().is_ok());
    }

    #[test]
    fn index_for_rejects_outside() {
        assert_eq!(index_for(100, 4, 2, 101, 1).unwrap(), 3);
        assert!(index_for(100, 4, 2, 99, 0).is_err());
        assert!(index_for(100, 4, 2, 104, 0).is_err());
        assert!(index_for(100, 4, 2, 100, 2).is_err());
    }
}
