use crate::config::ClientConfig;
use crate::error::{OtpSdkError, Result};
use crate::seed::SeedPair;
use crate::tree::TreeParams;

/// Builder for tree parameters, seeded from the client configuration.
pub struct TreeParamsBuilder {
    seeds: Option<SeedPair>,
    effective_time: Option<u64>,
    duration: u64,
    interval: u32,
    slot_size: u8,
    inner_tree_count: u32,
}

impl TreeParamsBuilder {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            seeds: None,
            effective_time: None,
            duration: config.duration,
            interval: config.interval,
            slot_size: config.slot_size,
            inner_tree_count: config.inner_tree_count,
        }
    }

    pub fn with_seeds(mut self, seeds: SeedPair) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub fn with_effective_time(mut self, effective_time: u64) -> Self {
        self.effective_time = Some(effective_time);
        self
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_slot_size(mut self, slot_size: u8) -> Self {
        self.slot_size = slot_size;
        self
    }

    pub fn with_inner_trees(mut self, count: u32) -> Self {
        self.inner_tree_count = count;
        self
    }

    pub fn build(self) -> Result<TreeParams> {
        let seeds = self
            .seeds
            .ok_or_else(|| OtpSdkError::Validation("seed required".into()))?;
        let effective_time = self
            .effective_time
            .ok_or_else(|| OtpSdkError::Validation("effective time required".into()))?;
        let params = TreeParams {
            seed: seeds.primary.clone(),
            seed2: seeds.secondary.clone(),
            effective_time,
            duration: self.duration,
            interval: self.interval,
            slot_size: self.slot_size,
            inner_tree_count: self.inner_tree_count,
        };
        params.validate()?;
        Ok(params)
    }
}
