//! Random Number Generator
//!
//! A PCG32 generator. Small, fast and reproducible across platforms,
//! which is all that's needed to scatter test scenes and rays.

use hexf::*;

// rs_accel
use crate::core::pbrt::Float;

pub const FLOAT_ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1");
pub const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
pub const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// Random number generator
#[derive(Debug, Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Default for Rng {
    fn default() -> Self {
        Rng::new()
    }
}

impl Rng {
    pub fn new() -> Self {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
    /// Generator for stream `initseq`. Different streams are
    /// independent of each other.
    pub fn with_sequence(initseq: u64) -> Self {
        let mut rng: Rng = Rng::new();
        rng.set_sequence(initseq);
        rng
    }
    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0_u64;
        self.inc = initseq.wrapping_shl(1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }
    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate: u64 = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted: u32 = (oldstate.wrapping_shr(18) ^ oldstate).wrapping_shr(27) as u32;
        let rot: u32 = oldstate.wrapping_shr(59) as u32;
        xorshifted.rotate_right(rot)
    }
    /// Uniform in `[0, b)`, without modulo bias.
    pub fn uniform_uint32_bounded(&mut self, b: u32) -> u32 {
        let threshold: u32 = b.wrapping_neg() % b;
        loop {
            let r: u32 = self.uniform_uint32();
            if r >= threshold {
                return r % b;
            }
        }
    }
    /// Uniform in `[0, 1)`.
    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_uint32() as Float * hexf32!("0x1.0p-32") as Float)
            .min(FLOAT_ONE_MINUS_EPSILON)
    }
    /// Uniform in `[lo, hi)`.
    pub fn uniform_float_range(&mut self, lo: Float, hi: Float) -> Float {
        lo + (hi - lo) * self.uniform_float()
    }
}
