// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label width estimation.
//!
//! Glyphs are shaped by whatever rasterizes the SVG, so layout only reserves room for legend
//! and axis labels from an estimate.

/// Estimates the extent of a single line of text.
pub trait TextMeasurer {
    /// `(width, height)` of `text` at `font_size`, in canvas units.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);

    /// Width only.
    fn width(&self, text: &str, font_size: f64) -> f64 {
        self.measure(text, font_size).0
    }
}

/// Fixed advance per character, one em tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicTextMeasurer {
    /// Average glyph advance as a fraction of the font size.
    pub advance: f64,
}

impl HeuristicTextMeasurer {
    /// Average advance of a proportional sans-serif face.
    pub const DEFAULT_ADVANCE: f64 = 0.6;

    /// A measurer with a custom advance ratio.
    pub const fn with_advance(advance: f64) -> Self {
        Self { advance }
    }
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self::with_advance(Self::DEFAULT_ADVANCE)
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let glyphs = text.chars().filter(|c| !c.is_control()).count() as f64;
        (glyphs * self.advance * font_size, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_chars_and_font_size() {
        let m = HeuristicTextMeasurer::default();
        assert!((m.width("abcd", 10.0) - 24.0).abs() < 1e-9);
        assert_eq!(m.measure("", 12.0), (0.0, 12.0));
        // Non-ASCII digits count as one glyph each.
        assert!((m.width("۳۰.۰%", 10.0) - 30.0).abs() < 1e-9);
        assert!((HeuristicTextMeasurer::with_advance(1.0).width("ab", 8.0) - 16.0).abs() < 1e-9);
    }
}
