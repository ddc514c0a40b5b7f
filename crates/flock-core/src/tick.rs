use crate::{rng, SplitMix64};

/// Per-tick inputs shared by every agent of one partition.
///
/// `dt_seconds` is the measured compute time of the partition's previous tick,
/// not a fixed external step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32, seed: u64) -> Self {
        Self {
            tick,
            dt_seconds: dt_seconds.max(0.0),
            seed,
        }
    }

    pub fn rng_for_partition(&self, partition: usize, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed ^ self.tick, partition as u64, stream);
        SplitMix64::new(seed)
    }
}
