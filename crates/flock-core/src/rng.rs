//! Seeded random streams for wander targets, speed jitter and startup delays.
//!
//! Every partition draws from its own [`SplitMix64`] stream, seeded with
//! [`derive_seed`], so a run replays exactly for a given seed and worker
//! count. Not suitable for anything security related.

/// Weyl increment of SplitMix64 (2^64 divided by the golden ratio).
const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    /// High half of the next word; the low bits of SplitMix64 are weaker.
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform in `[0, 1)`, built from 24 random bits so every value is
    /// exactly representable.
    fn next_f32_unit(&mut self) -> f32 {
        const SCALE: f32 = 1.0 / (1u32 << 24) as f32;
        (self.next_u32() >> 8) as f32 * SCALE
    }

    /// Uniform in `[lo, hi]`. Rounding can land on `hi`. An empty or
    /// inverted range yields `lo`.
    fn next_f32_range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.next_f32_unit()
    }

    fn next_bool(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GAMMA);
        mix64(self.state)
    }
}

/// SplitMix64 output finalizer; also used to scatter seed components.
pub fn mix64(x: u64) -> u64 {
    let x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    let x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Seed for one `stream` of one `partition` under the run seed.
///
/// Stream 0 drives ticks; other streams are for one-off draws such as the
/// startup delay.
pub fn derive_seed(global_seed: u64, partition: u64, stream: u64) -> u64 {
    mix64(global_seed ^ mix64(partition.wrapping_add(GAMMA)) ^ mix64(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_stays_inside_bounds() {
        let mut rng = SplitMix64::new(7);
        for _ in 0..1_000 {
            let v = rng.next_f32_range(35.0, 45.0);
            assert!((35.0..=45.0).contains(&v));
        }
        assert_eq!(rng.next_f32_range(3.0, 3.0), 3.0);
        assert_eq!(rng.next_f32_range(5.0, 1.0), 5.0);
    }

    #[test]
    fn unit_draws_never_reach_one() {
        let mut rng = SplitMix64::new(u64::MAX);
        assert!((0..10_000).all(|_| (0.0..1.0).contains(&rng.next_f32_unit())));
    }

    #[test]
    fn derived_streams_differ_per_partition() {
        assert_ne!(derive_seed(1, 0, 0), derive_seed(1, 1, 0));
        assert_ne!(derive_seed(1, 0, 0), derive_seed(1, 0, 1));
        assert_eq!(derive_seed(9, 3, 2), derive_seed(9, 3, 2));
    }
}
