// Seedable, portable random source for practice sessions.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// exposed through the `rand_core` traits so every generator in
// `fretwise_music` can take `&mut impl rand::Rng` and still be driven by a
// stream that replays identically on every platform.
//
// A session that records its seed can regenerate the exact same progressions
// later (bug reports, shared challenges, tests). `rand`'s `StdRng` makes no
// such promise across crate versions, so the engine's tests and the CLI use
// `SessionRng` instead.
//
// **Critical constraint: determinism.** The output stream for a given seed
// must never change. Do not touch the state update or seeding path without
// also accepting that every recorded seed now replays differently.

use rand_core::{RngCore, SeedableRng, impls};
use serde::{Deserialize, Serialize};

/// Xoshiro256++ generator backing a practice session's random decisions.
///
/// Serializable so that a paused session can resume mid-stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRng {
    s: [u64; 4],
}

impl SessionRng {
    /// Create a generator from a `u64` seed.
    ///
    /// SplitMix64 expands the seed into the 256-bit state, so even seeds
    /// that differ in one bit produce unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    fn step(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }
}

impl RngCore for SessionRng {
    fn next_u32(&mut self) -> u32 {
        // Upper bits of xoshiro output are the strongest.
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for SessionRng {
    type Seed = [u8; 32];

    /// Build directly from 256 bits of state.
    ///
    /// The all-zero state is a fixed point of xoshiro, so it is replaced by
    /// the state `SessionRng::new(0)` would produce.
    fn from_seed(seed: Self::Seed) -> Self {
        let mut s = [0u64; 4];
        for (word, chunk) in s.iter_mut().zip(seed.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_le_bytes(bytes);
        }
        if s == [0; 4] {
            return SessionRng::new(0);
        }
        SessionRng { s }
    }

    fn seed_from_u64(state: u64) -> Self {
        SessionRng::new(state)
    }
}

/// SplitMix64, used only to expand a `u64` seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
