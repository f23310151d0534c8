//! Packed pixel color values.

use serde::{Deserialize, Serialize};

/// A packed `0xAARRGGBB` color value.
///
/// The four 8-bit channels live in the low 32 bits of an `i64`; the sign
/// bit carries the out-of-band "no pixel" sentinel. Any negative value is
/// transparent/absent and must never be read as a literal color, which
/// keeps the sentinel distinct from an explicit alpha-0 color such as
/// [`Pixel::TRANSPARENT`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel(i64);

impl Pixel {
    /// The "no pixel drawn" sentinel.
    pub const NONE: Self = Self(-1);
    /// Explicit alpha-0 black, distinct from [`Pixel::NONE`].
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Pack four channels into a pixel.
    #[must_use]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as i64) << 24 | (r as i64) << 16 | (g as i64) << 8 | b as i64)
    }

    /// Pack an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    /// Reinterpret a raw wire value as a pixel.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw wire value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whether this is the transparent/absent sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 < 0
    }

    /// Alpha channel.
    #[must_use]
    pub const fn alpha(self) -> u8 {
        ((self.0 >> 24) & 0xff) as u8
    }

    /// Red channel.
    #[must_use]
    pub const fn red(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    /// Green channel.
    #[must_use]
    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    /// Blue channel.
    #[must_use]
    pub const fn blue(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// The same color with alpha forced to 255.
    #[must_use]
    pub const fn opaque(self) -> Self {
        Self(self.0 & 0x00ff_ffff | 255 << 24)
    }

    /// Whether all three color channels are zero.
    #[must_use]
    pub const fn is_black_rgb(self) -> bool {
        self.0 & 0x00ff_ffff == 0
    }

    /// Drop the low `removed_bits` of each color channel, approximating a
    /// lower bit-depth display.
    ///
    /// A correction bit at position `removed_bits - 1` biases rounding
    /// toward mid-range instead of always down. Black passes through
    /// untouched; everything else comes back with alpha forced to 255.
    /// Idempotent for a fixed `removed_bits`.
    #[must_use]
    pub const fn reduce_depth(self, removed_bits: u32) -> Self {
        if removed_bits == 0 || self.is_black_rgb() {
            return self;
        }

        let correction = 1i64 << (removed_bits - 1);
        let r = ((self.0 >> 16 & 0xff) >> removed_bits << removed_bits) | correction;
        let g = ((self.0 >> 8 & 0xff) >> removed_bits << removed_bits) | correction;
        let b = ((self.0 & 0xff) >> removed_bits << removed_bits) | correction;

        Self(255 << 24 | r << 16 | g << 8 | b)
    }
}

impl std::fmt::Debug for Pixel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "Pixel(NONE)")
        } else {
            write!(f, "Pixel(#{:08x})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_unpack() {
        let px = Pixel::argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(px.raw(), 0x1234_5678);
        assert_eq!(px.alpha(), 0x12);
        assert_eq!(px.red(), 0x34);
        assert_eq!(px.green(), 0x56);
        assert_eq!(px.blue(), 0x78);
    }

    #[test]
    fn test_sentinel_is_not_transparent() {
        assert!(Pixel::NONE.is_none());
        assert!(!Pixel::TRANSPARENT.is_none());
        assert_eq!(Pixel::TRANSPARENT.alpha(), 0);
    }

    #[test]
    fn test_sentinel_channels_saturate() {
        // -1 carries 0xff in every channel when read with the masked
        // accessors; background sampling relies on this.
        assert_eq!(Pixel::NONE.red(), 255);
        assert_eq!(Pixel::NONE.alpha(), 255);
    }

    #[test]
    fn test_opaque() {
        let px = Pixel::argb(0, 10, 20, 30).opaque();
        assert_eq!(px.alpha(), 255);
        assert_eq!((px.red(), px.green(), px.blue()), (10, 20, 30));
    }

    #[test]
    fn test_black_rgb() {
        assert!(Pixel::BLACK.is_black_rgb());
        assert!(Pixel::TRANSPARENT.is_black_rgb());
        assert!(!Pixel::rgb(0, 0, 1).is_black_rgb());
    }

    #[test]
    fn test_reduce_depth_black_untouched() {
        assert_eq!(Pixel::BLACK.reduce_depth(4), Pixel::BLACK);
        assert_eq!(Pixel::TRANSPARENT.reduce_depth(4), Pixel::TRANSPARENT);
    }

    #[test]
    fn test_reduce_depth_zero_bits_untouched() {
        let px = Pixel::rgb(200, 100, 50);
        assert_eq!(px.reduce_depth(0), px);
    }

    #[test]
    fn test_reduce_depth_midpoint_correction() {
        // 4 removed bits: 0xc8 -> 0xc0 | 0x08 = 0xc8
        let px = Pixel::rgb(0xc8, 0x64, 0x32).reduce_depth(4);
        assert_eq!(px.red(), 0xc8);
        assert_eq!(px.green(), 0x68);
        assert_eq!(px.blue(), 0x38);
        assert_eq!(px.alpha(), 255);
    }

    proptest! {
        #[test]
        fn prop_pack_unpack_round_trip(a: u8, r: u8, g: u8, b: u8) {
            let px = Pixel::argb(a, r, g, b);
            prop_assert_eq!(px.alpha(), a);
            prop_assert_eq!(px.red(), r);
            prop_assert_eq!(px.green(), g);
            prop_assert_eq!(px.blue(), b);
            prop_assert!(!px.is_none());
        }

        #[test]
        fn prop_reduce_depth_idempotent(r: u8, g: u8, b: u8, bits in 1u32..=7) {
            let once = Pixel::rgb(r, g, b).reduce_depth(bits);
            prop_assert_eq!(once.reduce_depth(bits), once);
        }

        #[test]
        fn prop_reduce_depth_stays_in_range(r: u8, g: u8, b: u8, bits in 1u32..=7) {
            // u8 accessors can't overflow; check the packed value is a
            // valid opaque color.
            let px = Pixel::rgb(r, g, b).reduce_depth(bits);
            prop_assert!(px.raw() >= 0);
            prop_assert!(px.raw() <= 0xffff_ffff);
        }
    }
}
