//! Pixel canvas with compositing and motion-persistence buffers.
//!
//! Three parallel buffers back every canvas: the frame being composed,
//! the last frame emitted (for diffing), and a decaying trail buffer
//! whose alpha channel encodes trail strength.

use termblit_core::{Bitmap, DitherStrategy, LcgDither, Pixel};

use crate::error::RenderError;

/// Existing trail pixels with alpha at or below this are overwritten
/// outright instead of merged. Historical constant, pending product-owner
/// confirmation before any re-tune.
pub const PERSISTENCE_EMPTY_ALPHA: i64 = 2;

/// Per-draw compositing parameters for [`PixelBuffer::draw_bitmap`].
///
/// The defaults describe a plain opaque blit: full alpha, neutral
/// brightness, no tint, no distortion, no trail, no dithering.
#[derive(Debug, Clone, Copy)]
pub struct BlitOptions<'a> {
    /// Alpha multiplier (0-255) applied to every source pixel.
    pub global_alpha: u8,
    /// Brightness multiplier applied after tinting.
    pub brightness: f64,
    /// Tint applied to every pixel, weighted by the tint's own alpha.
    pub tint: Option<Pixel>,
    /// Per-column tints, merged with `tint` by alpha-weighted averaging
    /// when both are present. [`Pixel::NONE`] entries mean "no tint for
    /// this column"; missing trailing entries are treated the same way.
    pub column_tints: &'a [Pixel],
    /// Record this draw into the persistence buffer as a trail.
    pub persisted: bool,
    /// Trail color override; defaults to the composited pixel color.
    pub persisted_color: Option<Pixel>,
    /// Per-row horizontal shift of destination columns (wave/warp).
    pub distortion_offsets: &'a [i64],
    /// Per-row horizontal index shift used only when sampling the
    /// existing canvas for blending (parallax between a drawn element and
    /// its background).
    pub background_distortion_offsets: &'a [i64],
    /// Blend ratios at or below this threshold (in (0, 1]) dither to an
    /// all-or-nothing per-pixel decision; 0 disables dithering.
    pub dithering_alpha_ratio_threshold: f64,
}

impl Default for BlitOptions<'_> {
    fn default() -> Self {
        Self {
            global_alpha: 255,
            brightness: 1.0,
            tint: None,
            column_tints: &[],
            persisted: false,
            persisted_color: None,
            distortion_offsets: &[],
            background_distortion_offsets: &[],
            dithering_alpha_ratio_threshold: 0.0,
        }
    }
}

/// Pixel canvas holding the current, previous, and persistence buffers.
///
/// All buffers are exactly width × height pixels for the lifetime of the
/// instance. Draws clip silently at the edges; the only fallible
/// operation is construction. Not safe for concurrent use; callers
/// serialize access externally.
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixel_count: usize,
    current: Vec<Pixel>,
    previous: Vec<Pixel>,
    persistence: Vec<Pixel>,
    drawn_pixel_count: u64,
    dither: Box<dyn DitherStrategy + Send>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("drawn_pixel_count", &self.drawn_pixel_count)
            .finish_non_exhaustive()
    }
}

/// Truncating weighted average, `a * ratio + b * (1 - ratio)`.
///
/// Truncation toward zero, not rounding; visual regression captures
/// depend on it.
fn mix(a: i64, b: i64, ratio: f64) -> i64 {
    (a as f64 * ratio + b as f64 * (1.0 - ratio)) as i64
}

/// Channel value clamped to the storable range.
fn clamp_channel(c: i64) -> u8 {
    c.clamp(0, 255) as u8
}

fn try_filled(len: usize, value: Pixel) -> Result<Vec<Pixel>, RenderError> {
    // All-or-nothing: a failed reserve drops whatever was allocated
    // before it, so no partial canvas ever escapes.
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, value);
    Ok(buf)
}

impl PixelBuffer {
    /// Create a canvas of the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Alloc`] when any of the three buffers cannot
    /// be allocated; nothing is leaked in that case.
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        let pixel_count = width * height;

        Ok(Self {
            width,
            height,
            pixel_count,
            current: try_filled(pixel_count, Pixel::NONE)?,
            previous: try_filled(pixel_count, Pixel::NONE)?,
            persistence: try_filled(pixel_count, Pixel::TRANSPARENT)?,
            drawn_pixel_count: 0,
            dither: Box::new(LcgDither),
        })
    }

    /// Replace the dithering strategy.
    #[must_use]
    pub fn with_dither_strategy(mut self, dither: Box<dyn DitherStrategy + Send>) -> Self {
        self.dither = dither;
        self
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total pixel count.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Convert (x, y) to linear index.
    #[must_use]
    pub const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// The frame being composed.
    #[must_use]
    pub fn current(&self) -> &[Pixel] {
        &self.current
    }

    /// The last frame emitted.
    #[must_use]
    pub fn previous(&self) -> &[Pixel] {
        &self.previous
    }

    /// The trail buffer; alpha encodes trail strength.
    #[must_use]
    pub fn persistence(&self) -> &[Pixel] {
        &self.persistence
    }

    /// Pixels written by draw calls since the last `clear`. Diagnostic
    /// only.
    #[must_use]
    pub const fn drawn_pixel_count(&self) -> u64 {
        self.drawn_pixel_count
    }

    /// Fill current and previous with the "no pixel" sentinel and the
    /// trail buffer with zero alpha.
    pub fn reset(&mut self) {
        self.current.fill(Pixel::NONE);
        self.previous.fill(Pixel::NONE);
        self.persistence.fill(Pixel::TRANSPARENT);
    }

    /// Fill the current frame with one flat opaque color and reset the
    /// drawn-pixel counter. Previous and persistence are untouched.
    pub fn clear(&mut self, color: Pixel) {
        self.current.fill(color.opaque());
        self.drawn_pixel_count = 0;
    }

    /// Composite a bitmap onto the current frame at (x, y).
    ///
    /// Placement may fall partially or fully outside the canvas; out of
    /// range pixels are skipped. Source pixels that are the transparent
    /// sentinel or have zero alpha are skipped. A zero `global_alpha` is
    /// a fast no-op.
    #[allow(clippy::too_many_lines)]
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, x: i64, y: i64, opts: &BlitOptions<'_>) {
        if opts.global_alpha == 0 {
            return;
        }

        let width = self.width as i64;
        let height = self.height as i64;
        let global_alpha = i64::from(opts.global_alpha);
        let brightness = opts.brightness;
        let threshold = opts.dithering_alpha_ratio_threshold;
        let bitmap_width = bitmap.width();
        let pixels = bitmap.pixels();

        for row in 0..bitmap.height() {
            let px_pos_y = y + row as i64;
            if px_pos_y < 0 || px_pos_y >= height {
                continue;
            }

            let distortion = opts.distortion_offsets.get(row).copied().unwrap_or(0);
            let bg_distortion = opts
                .background_distortion_offsets
                .get(row)
                .copied()
                .unwrap_or(0);

            for col in 0..bitmap_width {
                let px_pos_x = x + col as i64 + distortion;
                if px_pos_x < 0 || px_pos_x >= width {
                    continue;
                }

                let source = pixels[row * bitmap_width + col];
                if source.is_none() {
                    continue;
                }

                let alpha = i64::from(source.alpha());
                if alpha == 0 {
                    continue;
                }

                let column_tint = opts
                    .column_tints
                    .get(col)
                    .copied()
                    .filter(|t| !t.is_none());
                let tint = merge_tints(opts.tint, column_tint);

                let px_index = (px_pos_y * width + px_pos_x) as usize;

                let mut color = source;
                let mut persisted_color = opts.persisted_color.unwrap_or(source);

                if alpha < 255 || global_alpha < 255 || brightness != 1.0 || tint.is_some() {
                    let mut r = i64::from(source.red());
                    let mut g = i64::from(source.green());
                    let mut b = i64::from(source.blue());

                    if let Some(tint) = tint {
                        let tint_alpha = i64::from(tint.alpha());
                        if tint_alpha > 0 {
                            let ratio = tint_alpha as f64 / 255.0;
                            r = mix(i64::from(tint.red()), r, ratio);
                            g = mix(i64::from(tint.green()), g, ratio);
                            b = mix(i64::from(tint.blue()), b, ratio);
                        }
                    }

                    r = i64::from(clamp_channel((r as f64 * brightness) as i64));
                    g = i64::from(clamp_channel((g as f64 * brightness) as i64));
                    b = i64::from(clamp_channel((b as f64 * brightness) as i64));

                    let mut combined_alpha = 255;
                    if global_alpha < 255 || alpha < 255 {
                        combined_alpha =
                            (255.0 * (global_alpha as f64 / 255.0) * (alpha as f64 / 255.0)) as i64;
                    }

                    if opts.persisted {
                        if opts.persisted_color.is_none() {
                            persisted_color = Pixel::argb(
                                combined_alpha as u8,
                                clamp_channel(r),
                                clamp_channel(g),
                                clamp_channel(b),
                            );
                        }

                        if brightness != 1.0 {
                            persisted_color = Pixel::argb(
                                persisted_color.alpha(),
                                clamp_channel(
                                    (f64::from(persisted_color.red()) * brightness) as i64,
                                ),
                                clamp_channel(
                                    (f64::from(persisted_color.green()) * brightness) as i64,
                                ),
                                clamp_channel(
                                    (f64::from(persisted_color.blue()) * brightness) as i64,
                                ),
                            );
                        }
                    }

                    if combined_alpha < 255 {
                        let mut combined_ratio = combined_alpha as f64 / 255.0;

                        if threshold != 0.0 && combined_ratio <= threshold {
                            combined_ratio = if self.dither.keep(px_index, combined_ratio) {
                                1.0
                            } else {
                                0.0
                            };

                            // Fully dropped: skip entirely, unless a
                            // background offset is in effect and the
                            // offset itself must stay visible.
                            if combined_ratio == 0.0 && bg_distortion == 0 {
                                continue;
                            }
                        }

                        if combined_ratio != 1.0 {
                            let bg_index = px_index as i64 + bg_distortion;
                            let background =
                                if bg_index >= 0 && (bg_index as usize) < self.pixel_count {
                                    self.current[bg_index as usize]
                                } else {
                                    Pixel::BLACK
                                };

                            let bg_r = i64::from(background.red());
                            let bg_g = i64::from(background.green());
                            let bg_b = i64::from(background.blue());

                            if combined_ratio == 0.0 {
                                r = bg_r;
                                g = bg_g;
                                b = bg_b;
                            } else {
                                r = mix(r, bg_r, combined_ratio);
                                g = mix(g, bg_g, combined_ratio);
                                b = mix(b, bg_b, combined_ratio);
                            }
                        }
                    }

                    color = Pixel::argb(255, clamp_channel(r), clamp_channel(g), clamp_channel(b));
                }

                self.current[px_index] = color;
                self.drawn_pixel_count += 1;

                if opts.persisted && alpha > 1 {
                    self.store_persistence(px_index, persisted_color, threshold);
                }
            }
        }
    }

    /// Merge one trail pixel into the persistence buffer.
    fn store_persistence(&mut self, px_index: usize, new: Pixel, threshold: f64) {
        let existing = self.persistence[px_index];
        let existing_alpha = i64::from(existing.alpha());

        if existing_alpha <= PERSISTENCE_EMPTY_ALPHA {
            self.persistence[px_index] = new;
            return;
        }

        let new_alpha = i64::from(new.alpha());
        let mut ratio = new_alpha as f64 / (new_alpha + existing_alpha) as f64;

        if threshold != 0.0 && ratio <= threshold {
            ratio = if self.dither.keep(px_index, ratio) {
                1.0
            } else {
                0.0
            };
        }

        if ratio == 1.0 {
            self.persistence[px_index] = new;
        } else if ratio != 0.0 {
            let merged_alpha = new_alpha.max(existing_alpha);
            self.persistence[px_index] = Pixel::argb(
                merged_alpha as u8,
                clamp_channel(mix(i64::from(new.red()), i64::from(existing.red()), ratio)),
                clamp_channel(mix(
                    i64::from(new.green()),
                    i64::from(existing.green()),
                    ratio,
                )),
                clamp_channel(mix(i64::from(new.blue()), i64::from(existing.blue()), ratio)),
            );
        }
    }

    /// Draw the border pixels of a rectangle in one flat color.
    ///
    /// Interior pixels are untouched; rows and columns clip to canvas
    /// bounds.
    pub fn draw_rect(
        &mut self,
        rect_width: usize,
        rect_height: usize,
        x: i64,
        y: i64,
        color: Pixel,
    ) {
        let width = self.width as i64;
        let height = self.height as i64;

        for row in 0..rect_height {
            let px_pos_y = y + row as i64;
            if px_pos_y < 0 || px_pos_y >= height {
                continue;
            }

            for col in 0..rect_width {
                let px_pos_x = x + col as i64;
                if px_pos_x < 0 || px_pos_x >= width {
                    continue;
                }

                // Interior
                if row > 0 && row < rect_height - 1 && col > 0 && col < rect_width - 1 {
                    continue;
                }

                let px_index = (px_pos_y * width + px_pos_x) as usize;
                self.current[px_index] = color;
                self.drawn_pixel_count += 1;
            }
        }
    }

    /// Run the persistence and quantization pass on one pixel and return
    /// the post-processed color the differ compares.
    pub(crate) fn process_pixel(
        &mut self,
        px_index: usize,
        persistence_enabled: bool,
        persistence_decay: i64,
        removed_color_depth_bits: u32,
    ) -> Pixel {
        let mut color = self.current[px_index];
        let trail = self.persistence[px_index];
        let trail_alpha = i64::from(trail.alpha());

        if !persistence_enabled && trail_alpha > 0 {
            // Trails turn off immediately, not gradually.
            self.persistence[px_index] = Pixel::TRANSPARENT;
        }

        if persistence_enabled && trail_alpha > 0 {
            let ratio = trail_alpha as f64 / 255.0;

            color = Pixel::argb(
                255,
                clamp_channel(mix(i64::from(trail.red()), i64::from(color.red()), ratio)),
                clamp_channel(mix(
                    i64::from(trail.green()),
                    i64::from(color.green()),
                    ratio,
                )),
                clamp_channel(mix(i64::from(trail.blue()), i64::from(color.blue()), ratio)),
            );

            let faded_alpha = (trail_alpha - persistence_decay).max(0);
            self.persistence[px_index] =
                Pixel::argb(faded_alpha as u8, trail.red(), trail.green(), trail.blue());
            self.current[px_index] = color;
        }

        if removed_color_depth_bits != 0 && !color.is_black_rgb() {
            color = color.reduce_depth(removed_color_depth_bits);
            self.current[px_index] = color;
        }

        color
    }

    /// Copy one pixel's current and trail state over another (low
    /// resolution duplication).
    pub(crate) fn copy_pixel(&mut self, src: usize, dst: usize) {
        self.current[dst] = self.current[src];
        self.persistence[dst] = self.persistence[src];
    }

    /// Snapshot the current frame into the previous buffer.
    pub(crate) fn snapshot_previous(&mut self) {
        self.previous.copy_from_slice(&self.current);
    }
}

/// Resolve the effective tint from the global and per-column tints.
///
/// Both present with nonzero alpha: alpha-weighted average with ratio
/// `globalA / (globalA + columnA)`. Otherwise whichever is present (a
/// zero-alpha side yields to the other).
fn merge_tints(global: Option<Pixel>, column: Option<Pixel>) -> Option<Pixel> {
    let Some(global) = global else {
        return column;
    };
    let Some(column) = column else {
        return Some(global);
    };

    let column_alpha = i64::from(column.alpha());
    if column_alpha == 0 {
        return Some(global);
    }

    let global_alpha = i64::from(global.alpha());
    if global_alpha == 0 {
        return Some(column);
    }

    let ratio = global_alpha as f64 / (global_alpha + column_alpha) as f64;

    Some(Pixel::argb(
        clamp_channel(mix(global_alpha, column_alpha, ratio)),
        clamp_channel(mix(i64::from(global.red()), i64::from(column.red()), ratio)),
        clamp_channel(mix(
            i64::from(global.green()),
            i64::from(column.green()),
            ratio,
        )),
        clamp_channel(mix(
            i64::from(global.blue()),
            i64::from(column.blue()),
            ratio,
        )),
    ))
}
