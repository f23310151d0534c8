//! Differential half-block emitter.
//!
//! Converts the canvas into the minimal escape-sequence stream needed to
//! redraw what changed since the last frame:
//! - Two canvas rows per character row via the upper-half-block glyph,
//!   upper pixel as foreground and lower pixel as background
//! - Only emits cells whose post-processed color pair changed
//! - Skips cursor moves inside contiguous runs
//! - Caches the last emitted color pair

use std::io::{BufWriter, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color as CrosstermColor, Colors, Print, SetColors};

use crate::color::ColorMode;
use crate::direct::pixel_buffer::PixelBuffer;
use crate::error::RenderError;

/// Staging capacity for one flush; escape sequences accumulate here and
/// go to the sink in large writes.
const STAGING_CAPACITY: usize = 16 * 1024;

/// Upper half block. Foreground paints the upper pixel, background the
/// lower.
const HALF_BLOCK: &str = "\u{2580}";

/// Resolution-reduction mode for a frame, trading sharpness for fewer
/// distinct cells on slow terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LowRes {
    /// Full resolution.
    #[default]
    Off,
    /// Vertical halving: the lower pixel of every cell mirrors the upper.
    Half,
    /// Vertical and horizontal halving: odd columns mirror the even
    /// column to their left.
    Quarter,
}

/// Per-frame options for [`DiffRenderer::flush`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameOptions {
    /// Blend decaying trails into the frame; a disabled frame clears all
    /// trail state immediately.
    pub persistence_enabled: bool,
    /// Alpha subtracted from every trail pixel per frame, floored at 0.
    pub persistence_decay: i64,
    /// Low bits removed from each channel by the quantizer; 0 disables.
    pub removed_color_depth_bits: u32,
    /// Resolution reduction for this frame.
    pub low_res: LowRes,
}

/// Stateful differencing emitter.
///
/// Holds no canvas data itself; all frame state lives in the
/// [`PixelBuffer`], so one renderer can serve several canvases.
#[derive(Debug)]
pub struct DiffRenderer {
    /// Color mode for conversion.
    color_mode: ColorMode,
    /// Statistics: character cells emitted in the last flush.
    cells_written: usize,
    /// Statistics: cursor-positioning sequences in the last flush.
    cursor_moves: usize,
    /// Statistics: color-pair changes in the last flush.
    color_changes: usize,
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffRenderer {
    /// Create a renderer with auto-detected color mode.
    #[must_use]
    pub fn new() -> Self {
        Self::with_color_mode(ColorMode::detect())
    }

    /// Create a renderer with a specific color mode.
    #[must_use]
    pub const fn with_color_mode(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            cells_written: 0,
            cursor_moves: 0,
            color_changes: 0,
        }
    }

    /// Set the color mode.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    /// Get the color mode.
    #[must_use]
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Character cells emitted in the last flush.
    #[must_use]
    pub const fn cells_written(&self) -> usize {
        self.cells_written
    }

    /// Cursor moves emitted in the last flush.
    #[must_use]
    pub const fn cursor_moves(&self) -> usize {
        self.cursor_moves
    }

    /// Color-pair changes emitted in the last flush.
    #[must_use]
    pub const fn color_changes(&self) -> usize {
        self.color_changes
    }

    /// Run the per-frame pass and emit changed cells to the writer.
    ///
    /// Fades trails and quantizes colors, diffs the result against the
    /// previous frame, emits escape sequences for changed cells only, then
    /// snapshots current into previous. Rows pair up top-down; with an odd
    /// canvas height the trailing row is never emitted.
    ///
    /// Returns the number of character cells written.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if writing to the sink fails.
    #[allow(clippy::too_many_lines)]
    pub fn flush<W: Write>(
        &mut self,
        buffer: &mut PixelBuffer,
        writer: &mut W,
        opts: &FrameOptions,
    ) -> Result<usize, RenderError> {
        self.cells_written = 0;
        self.cursor_moves = 0;
        self.color_changes = 0;

        let mut out = BufWriter::with_capacity(STAGING_CAPACITY, writer);

        let width = buffer.width();
        let height = buffer.height();

        let mut last_colors: Option<(CrosstermColor, CrosstermColor)> = None;

        let mut row = 0;
        while row + 1 < height {
            // Sentinel: no cell emitted on this row pair yet.
            let mut last_col = width;

            for col in 0..width {
                if opts.low_res == LowRes::Quarter && col % 2 != 0 {
                    continue;
                }

                let upper_index = row * width + col;
                let lower_index = (row + 1) * width + col;

                let upper = buffer.process_pixel(
                    upper_index,
                    opts.persistence_enabled,
                    opts.persistence_decay,
                    opts.removed_color_depth_bits,
                );
                let mut lower = buffer.process_pixel(
                    lower_index,
                    opts.persistence_enabled,
                    opts.persistence_decay,
                    opts.removed_color_depth_bits,
                );

                if opts.low_res != LowRes::Off {
                    buffer.copy_pixel(upper_index, lower_index);
                    lower = upper;

                    if opts.low_res == LowRes::Quarter && col + 1 < width {
                        buffer.copy_pixel(upper_index, upper_index + 1);
                        buffer.copy_pixel(lower_index, lower_index + 1);
                    }
                }

                if upper == buffer.previous()[upper_index]
                    && lower == buffer.previous()[lower_index]
                {
                    if opts.low_res != LowRes::Quarter {
                        continue;
                    }

                    // Quarter mode also owns the duplicated column.
                    if col + 1 >= width
                        || (buffer.previous()[upper_index + 1]
                            == buffer.current()[upper_index + 1]
                            && buffer.previous()[lower_index + 1]
                                == buffer.current()[lower_index + 1])
                    {
                        continue;
                    }
                }

                self.cells_written += 1;

                if col <= 1 || last_col != col - 1 {
                    queue!(out, MoveTo(col as u16, (row / 2) as u16))?;
                    self.cursor_moves += 1;
                }

                let colors = (
                    self.color_mode.to_crossterm(upper),
                    self.color_mode.to_crossterm(lower),
                );
                if last_colors != Some(colors) {
                    queue!(out, SetColors(Colors::new(colors.0, colors.1)))?;
                    last_colors = Some(colors);
                    self.color_changes += 1;
                }

                queue!(out, Print(HALF_BLOCK))?;
                last_col = col;

                if opts.low_res == LowRes::Quarter && col + 1 < width {
                    self.cells_written += 1;
                    queue!(out, Print(HALF_BLOCK))?;
                    last_col = col + 1;
                }
            }

            row += 2;
        }

        out.flush()?;
        drop(out);

        buffer.snapshot_previous();

        Ok(self.cells_written)
    }
}
