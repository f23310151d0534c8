//! Core value types for the termblit rendering engine.
//!
//! This crate holds the types every backend shares: the packed [`Pixel`]
//! color value, the [`Bitmap`] source-image container, and the
//! [`DitherStrategy`] seam used by the compositor to turn fractional blend
//! ratios into binary per-pixel decisions.

mod bitmap;
mod dither;
mod pixel;

pub use bitmap::{Bitmap, BitmapError};
pub use dither::{DitherStrategy, LcgDither};
pub use pixel::Pixel;
