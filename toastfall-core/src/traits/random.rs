//! Random number source

use rand::{Rng, RngCore};

/// Source of the randomness used for spawn points and speeds
///
/// Any `rand` generator works, so firmware can feed a hardware-seeded
/// `SmallRng` and tests a fixed-seed one.
pub trait RandomSource {
    /// Uniform integer in `[low, high]`
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32;

    /// Unbiased single bit
    fn bit(&mut self) -> bool;
}

impl<R: RngCore> RandomSource for R {
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn bit(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }
}
