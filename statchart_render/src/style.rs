// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-supplied chart styling.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;

use peniko::Color;
use peniko::color::{Srgb, parse_color};
use peniko::color::palette::css;

use crate::numeral::NumeralSet;

/// Fill used for any category code without a (parseable) entry in [`StyleConfig::colors`].
pub const NEUTRAL_COLOR: Color = css::SILVER;

/// Canvas size, pie radius, per-category colors and numeral script for one render call.
///
/// Styles are plain values: nothing here is global, and nothing is persisted alongside the
/// rendered artifact.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StyleConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Pie radius in pixels. Shrunk to fit when the plot area is smaller.
    pub radius: u32,
    /// Category code to CSS color string (`#4e79a7`, `rgb(…)`, `tomato`, …).
    pub colors: BTreeMap<String, String>,
    /// Digit script for counts and percentages.
    pub numeral_set: NumeralSet,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            radius: 150,
            colors: BTreeMap::new(),
            numeral_set: NumeralSet::Ascii,
        }
    }
}

impl StyleConfig {
    /// Creates a default style with the given canvas size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Sets the pie radius.
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the color for one category code.
    pub fn with_color(mut self, code: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(code.into(), color.into());
        self
    }

    /// Sets the numeral script.
    pub fn with_numeral_set(mut self, numeral_set: NumeralSet) -> Self {
        self.numeral_set = numeral_set;
        self
    }

    /// Resolves the fill color for a category code, falling back to [`NEUTRAL_COLOR`].
    pub fn color_for(&self, code: &str) -> Color {
        self.colors
            .get(code)
            .and_then(|s| parse_color(s).ok())
            .map(|c| c.to_alpha_color::<Srgb>())
            .unwrap_or(NEUTRAL_COLOR)
    }

    /// Canvas width as `f64`.
    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    /// Canvas height as `f64`.
    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve_and_unknown_codes_are_neutral() {
        let style = StyleConfig::default()
            .with_color("A", "#ff0000")
            .with_color("B", "not a color");

        assert_eq!(style.color_for("A").to_rgba8().r, 255);
        assert_eq!(style.color_for("A").to_rgba8().g, 0);
        assert_eq!(style.color_for("B"), NEUTRAL_COLOR);
        assert_eq!(style.color_for("Z"), NEUTRAL_COLOR);
    }
}
