//! Direct terminal backend.
//!
//! Pixel compositing plus differential escape-sequence emission over
//! crossterm:
//!
//! ```text
//! draw calls → PixelBuffer → DiffRenderer → output sink
//! ```
//!
//! Two canvas rows map onto one character row via half-block glyphs, so a
//! W×H canvas renders as W×(H/2) character cells.

mod diff_renderer;
mod pixel_buffer;

pub use diff_renderer::{DiffRenderer, FrameOptions, LowRes};
pub use pixel_buffer::{BlitOptions, PixelBuffer, PERSISTENCE_EMPTY_ALPHA};
