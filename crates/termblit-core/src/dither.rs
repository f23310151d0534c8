//! Stochastic dithering decisions.

/// Turns a fractional blend ratio into a binary keep/drop decision for one
/// pixel.
///
/// The compositor consults this at low alpha ratios to avoid banding.
/// Implementations must be deterministic in `index` so repeated frames
/// dither identically.
pub trait DitherStrategy {
    /// Whether the pixel at linear `index` is drawn fully opaque for a
    /// blend ratio in (0, 1).
    fn keep(&self, index: usize, ratio: f64) -> bool;
}

/// Linear-congruential dither keyed only by the pixel's linear index.
///
/// `rn = (214013 * index + 2531011) mod 65536`; the pixel is kept when
/// `ratio * 65535 >= rn`. Reproduced bit-for-bit so captured frames stay
/// stable across versions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LcgDither;

impl DitherStrategy for LcgDither {
    fn keep(&self, index: usize, ratio: f64) -> bool {
        let rn = (214_013_u64.wrapping_mul(index as u64).wrapping_add(2_531_011)) & 0xffff;
        ratio * 65_535.0 >= rn as f64
    }
}
