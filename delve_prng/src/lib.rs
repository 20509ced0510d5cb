// Seeded pseudo-random number generator for world generation.
//
// xoshiro256++ (Blackman & Vigna, 2019) expanded from a single `u64` seed with
// SplitMix64. Hand-rolled so that a given seed produces the same world on every
// platform and toolchain; `rand`'s algorithms are allowed to change between
// releases, ours are not.
//
// `delve_sim` draws room counts, room positions, room definitions, and occupant
// cells from one `WorldRng` owned by the caller of `VoxelWorld::generate`.
//
// **Critical constraint: determinism.** Integer arithmetic only. Every method
// must yield identical output for identical prior state.

use serde::{Deserialize, Serialize};

/// The only randomness source used by world generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRng {
    s: [u64; 4],
}

impl WorldRng {
    /// Seed a generator. Equal seeds give equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let s = [
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
        ];
        Self { s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = &mut self.s;
        let out = s0.wrapping_add(*s3).rotate_left(23).wrapping_add(*s0);
        let t = *s1 << 17;

        *s2 ^= *s0;
        *s3 ^= *s1;
        *s1 ^= *s2;
        *s0 ^= *s3;
        *s2 ^= t;
        *s3 = s3.rotate_left(45);

        out
    }

    /// Upper 32 bits of the next `u64` (the stronger half for xoshiro).
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform integer in `[low, high)`, unbiased via rejection sampling.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: empty range {low}..{high}");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        // Values below this threshold would over-represent small residues.
        let threshold = span.wrapping_neg() % span;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + r % span;
            }
        }
    }

    /// Uniform integer in `[low, high)` for signed coordinates.
    ///
    /// Panics if `low >= high`.
    pub fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        assert!(low < high, "range_i32: empty range {low}..{high}");
        let span = (high as i64 - low as i64) as u64;
        (low as i64 + self.range_u64(0, span) as i64) as i32
    }

    /// Uniform integer in `[low, high]`. A degenerate range returns `low`.
    ///
    /// Panics if `low > high`.
    pub fn range_u32_inclusive(&mut self, low: u32, high: u32) -> u32 {
        assert!(low <= high, "range_u32_inclusive: empty range {low}..={high}");
        self.range_u64(low as u64, high as u64 + 1) as u32
    }

    /// Uniform index in `[0, len)`.
    ///
    /// Panics if `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        self.range_u64(0, len as u64) as usize
    }

    /// Pick one element uniformly, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.index(items.len())])
        }
    }
}

/// SplitMix64 step, used only to expand the seed.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
