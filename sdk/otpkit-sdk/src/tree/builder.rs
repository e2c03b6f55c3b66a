use otpkit_state::{hash_pair, leaf_capacity, leaf_from_proof, recovery_index, Hash, ZERO_HASH};
use tracing::debug;

use super::leaf::{inner_hseed, one_time_proof, recovery_proof};
use super::{BuildStage, InnerTree, Layers, Progress, ProofTree, TreeParams};
use crate::core::constants::PROGRESS_STEP;
use crate::error::Result;
use crate::otp::TotpGenerator;

/// Builds the primary tree and its inner trees. Deterministic in `params`;
/// `on_progress` only observes.
pub fn build_tree(params: &TreeParams, on_progress: &mut dyn FnMut(Progress)) -> Result<ProofTree> {
    params.validate()?;

    let primary = TotpGenerator::for_seed(&params.seed, params.interval)?;
    let secondary = params
        .seed2
        .as_ref()
        .map(|seed| TotpGenerator::for_seed(seed, params.interval))
        .transpose()?;
    let codes = SlotCodes {
        primary: &primary,
        secondary: secondary.as_ref(),
    };

    let hseed = params.seed.hseed();
    let height = params.height();
    debug!(
        height,
        lifespan = params.lifespan(),
        slot_size = params.slot_size,
        inner = params.inner_tree_count,
        "building proof tree"
    );

    let layers = build_layers(params, &codes, &hseed, height, on_progress);

    let mut inner_trees = Vec::with_capacity(params.inner_tree_count as usize);
    for k in 0..params.inner_tree_count {
        let inner_seed = inner_hseed(&hseed, k);
        let inner_layers = build_layers(params, &codes, &inner_seed, height, &mut |_| {});
        inner_trees.push(InnerTree {
            root: root_of(&inner_layers),
            hseed: inner_seed,
            layers: inner_layers,
        });
        on_progress(Progress {
            current: k as u64 + 1,
            total: params.inner_tree_count as u64,
            stage: BuildStage::InnerTrees,
        });
    }

    Ok(ProofTree {
        root: root_of(&layers),
        layers,
        hseed,
        interval: params.interval,
        t0: params.t0(),
        lifespan: params.lifespan(),
        slot_size: params.slot_size,
        inner_trees,
    })
}

struct SlotCodes<'a> {
    primary: &'a TotpGenerator,
    secondary: Option<&'a TotpGenerator>,
}

impl SlotCodes<'_> {
    fn at(&self, counter: u64) -> (u32, Option<u32>) {
        (
            self.primary.code_at_counter(counter),
            self.secondary.map(|gen| gen.code_at_counter(counter)),
        )
    }
}

fn build_layers(
    params: &TreeParams,
    codes: &SlotCodes<'_>,
    hseed: &Hash,
    height: u8,
    on_progress: &mut dyn FnMut(Progress),
) -> Layers {
    let t0 = params.t0();
    let slot_size = params.slot_size as usize;
    let total = params.lifespan() as u64 * slot_size as u64;

    let mut leaves = vec![ZERO_HASH; leaf_capacity(height) as usize];
    let mut done = 0u64;
    for slot in 0..params.lifespan() as u64 {
        let counter = t0 + slot;
        let (code, second_code) = codes.at(counter);
        for sub in 0..slot_size {
            let proof = one_time_proof(hseed, counter, sub as u8, code, second_code);
            leaves[slot as usize * slot_size + sub] = leaf_from_proof(&proof);
            done += 1;
            if done % PROGRESS_STEP as u64 == 0 {
                on_progress(Progress {
                    current: done,
                    total,
                    stage: BuildStage::Leaves,
                });
            }
        }
    }
    leaves[recovery_index(height) as usize] = leaf_from_proof(&recovery_proof(hseed));
    on_progress(Progress {
        current: total,
        total,
        stage: BuildStage::Leaves,
    });

    let mut layers = Vec::with_capacity(height as usize);
    layers.push(leaves);
    let upper = height as u64 - 1;
    while layers.last().map_or(0, Vec::len) > 1 {
        let parents = layers
            .last()
            .map(|below| {
                below
                    .chunks_exact(2)
                    .map(|pair| hash_pair(&pair[0], &pair[1]))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        layers.push(parents);
        on_progress(Progress {
            current: layers.len() as u64 - 1,
            total: upper,
            stage: BuildStage::Layers,
        });
    }
    Layers(layers)
}

fn root_of(layers: &Layers) -> Hash {
    layers.root().unwrap_or(ZERO_HASH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;
    use otpkit_state::verify_path;

    fn params(seed2: bool, inner: u32) -> TreeParams {
        TreeParams {
            seed: Seed::from_bytes([5u8; 20]),
            seed2: seed2.then(|| Seed::from_bytes([6u8; 20])),
            effective_time: 30 * 60_000,
            duration: 30 * 10,
            interval: 30,
            slot_size: 2,
            inner_tree_count: inner,
        }
    }

    #[test]
    fn build_is_deterministic_and_consistent() {
        let a = build_tree(&params(false, 1), &mut |_| {}).unwrap();
        let b = build_tree(&params(false, 1), &mut |_| {}).unwrap();
        assert_eq!(a, b);
        // 10 slots * 2 + recovery = 21 leaves -> 32 -> height 6.
        assert_eq!(a.height(), 6);
        assert_eq!(a.inner_trees.len(), 1);
        assert_ne!(a.inner_trees[0].root, a.root);
        a.check_consistency().unwrap();
    }

    #[test]
    fn second_factor_changes_root() {
        let single = build_tree(&params(false, 0), &mut |_| {}).unwrap();
        let double = build_tree(&params(true, 0), &mut |_| {}).unwrap();
        assert_ne!(single.root, double.root);
    }

    #[test]
    fn leaves_match_codes() {
        let p = params(false, 0);
        let tree = build_tree(&p, &mut |_| {}).unwrap();
        let gen = TotpGenerator::for_seed(&p.seed, p.interval).unwrap();
        let counter = p.t0() + 3;
        let proof = one_time_proof(&tree.hseed, counter, 1, gen.code_at_counter(counter), None);
        let index = tree.index_for(counter, 1).unwrap();
        assert_eq!(index, 7);
        let path = tree.proof_for(index).unwrap();
        assert!(verify_path(&tree.root, &leaf_from_proof(&proof), index, &path));
    }

    #[test]
    fn reports_every_stage() {
        let mut stages = Vec::new();
        build_tree(&params(false, 2), &mut |p| stages.push(p)).unwrap();
        assert!(stages.iter().any(|p| p.stage == BuildStage::Leaves && p.current == p.total));
        assert!(stages.iter().any(|p| p.stage == BuildStage::Layers && p.current == p.total));
        let last = stages.last().unwrap();
        assert_eq!((last.stage, last.current, last.total), (BuildStage::InnerTrees, 2, 2));
    }

    #[test]
    fn invalid_params_fail_before_building() {
        let mut p = params(false, 0);
        p.interval = 0;
        let mut called = false;
        assert!(build_tree(&p, &mut |_| called = true).is_err());
        assert!(!called);
    }
}
