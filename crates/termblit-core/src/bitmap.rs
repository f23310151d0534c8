//! Source bitmaps consumed by the compositor.

use serde::{Deserialize, Serialize};

use crate::pixel::Pixel;

/// A width × height grid of packed pixels used as a draw source.
///
/// Negative pixel values mark transparent/absent source pixels; see
/// [`Pixel::is_none`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

/// Errors from bitmap construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapError {
    /// Pixel count does not match width × height.
    SizeMismatch {
        /// width × height.
        expected: usize,
        /// Length of the provided pixel vector.
        actual: usize,
    },
}

impl std::fmt::Display for BitmapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "expected {expected} pixels, got {actual}")
            }
        }
    }
}

impl std::error::Error for BitmapError {}

impl Bitmap {
    /// Create a bitmap from row-major pixels.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::SizeMismatch`] when `pixels.len()` is not
    /// `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self, BitmapError> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(BitmapError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a bitmap filled with one pixel value.
    #[must_use]
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        }
    }

    /// Bitmap width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Bitmap height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// The pixel at (x, y), if in bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }
}
