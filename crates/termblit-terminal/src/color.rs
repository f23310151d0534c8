//! Color mode detection and palette mapping for terminals.

use crossterm::style::Color as CrosstermColor;
use termblit_core::Pixel;

/// Small fixed boost applied before rounding a channel into the 6-level
/// color cube, so dim colors don't collapse to black on 256-color terminals.
const CUBE_BRIGHTNESS_BOOST: f64 = 0.3;

/// Terminal color capability mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// 24-bit true color (COLORTERM=truecolor or 24bit).
    #[default]
    TrueColor,
    /// 256 color palette, rendered through the 216-entry color cube.
    Color256,
}

impl ColorMode {
    /// Auto-detect terminal color capabilities.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_with_env(std::env::var("COLORTERM").ok(), std::env::var("TERM").ok())
    }

    /// Detect color mode from environment variable values.
    /// This is the testable core of `detect()`.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn detect_with_env(colorterm: Option<String>, term: Option<String>) -> Self {
        // Check COLORTERM first (most reliable)
        if let Some(ref ct) = colorterm {
            if ct == "truecolor" || ct == "24bit" {
                return Self::TrueColor;
            }
        }

        match term.as_deref() {
            Some(t) if t.contains("truecolor") || t.contains("direct") => Self::TrueColor,
            _ => Self::Color256,
        }
    }

    /// Convert a pixel to a crossterm Color based on this mode.
    #[must_use]
    pub fn to_crossterm(self, pixel: Pixel) -> CrosstermColor {
        match self {
            Self::TrueColor => CrosstermColor::Rgb {
                r: pixel.red(),
                g: pixel.green(),
                b: pixel.blue(),
            },
            Self::Color256 => CrosstermColor::AnsiValue(Self::cube_index(pixel)),
        }
    }

    /// Round each channel into a 6-level scale and combine into a
    /// 216-entry color-cube index offset by 16, clamped to the cube's top.
    fn cube_index(pixel: Pixel) -> u8 {
        let level =
            |c: u8| (CUBE_BRIGHTNESS_BOOST + 5.0 * f64::from(c) / 255.0).round() as u16;

        let idx = 16 + 36 * level(pixel.red()) + 6 * level(pixel.green()) + level(pixel.blue());
        idx.min(231) as u8
    }
}
