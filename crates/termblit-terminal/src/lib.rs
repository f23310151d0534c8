//! Terminal rendering core for termblit.
//!
//! Maintains a pixel-addressable off-screen canvas, composites bitmap and
//! primitive draws onto it (alpha blending, tinting, horizontal warp,
//! stochastic dithering, motion persistence), then emits the minimal
//! terminal escape sequences needed to redraw what changed since the
//! previous frame.
//!
//! # Example
//!
//! ```
//! use termblit_terminal::{
//!     Bitmap, BlitOptions, DiffRenderer, ColorMode, FrameOptions, Pixel, PixelBuffer,
//! };
//!
//! # fn main() -> Result<(), termblit_terminal::RenderError> {
//! let mut canvas = PixelBuffer::new(80, 50)?;
//! let mut renderer = DiffRenderer::with_color_mode(ColorMode::TrueColor);
//!
//! canvas.clear(Pixel::BLACK);
//! let sprite = Bitmap::filled(4, 4, Pixel::rgb(255, 200, 0));
//! canvas.draw_bitmap(&sprite, 10, 12, &BlitOptions::default());
//!
//! let mut frame = Vec::new();
//! let changed = renderer.flush(&mut canvas, &mut frame, &FrameOptions::default())?;
//! assert!(changed > 0);
//! # Ok(())
//! # }
//! ```

mod color;
pub mod direct;
mod error;

pub use color::ColorMode;
pub use direct::{BlitOptions, DiffRenderer, FrameOptions, LowRes, PixelBuffer};
pub use error::RenderError;

// Core pixel types, re-exported so embedders need only this crate.
pub use termblit_core::{Bitmap, BitmapError, DitherStrategy, LcgDither, Pixel};
