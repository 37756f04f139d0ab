// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value and group scales for the bar chart.

extern crate alloc;

use alloc::vec::Vec;

use crate::math;

/// Maps a continuous domain onto a continuous range. Reversed ranges flip the axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// A scale taking `domain.0..domain.1` onto `range.0..range.1`.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps `x` into range space. A zero-width domain maps everything to `range.0`.
    pub fn map(&self, x: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return self.range.0;
        }
        self.range.0 + (x - self.domain.0) / span * (self.range.1 - self.range.0)
    }

    /// Round tick values for a count axis, never outside the domain.
    ///
    /// Steps come from the 1-2-5 sequence and are at least 1, since the axis counts whole
    /// entities. The domain is not widened to the next round number.
    pub fn count_ticks(&self, target: usize) -> Vec<f64> {
        let lo = self.domain.0.min(self.domain.1);
        let hi = self.domain.0.max(self.domain.1);
        if target == 0 || !(hi - lo).is_finite() {
            return Vec::new();
        }
        let step = round_step((hi - lo) / target as f64).max(1.0);
        let first = math::ceil(lo / step);
        let last = math::floor(hi / step + 1e-9);
        let mut out = Vec::new();
        let mut k = first;
        while k <= last {
            out.push(k * step);
            k += 1.0;
        }
        out
    }
}

/// Rounds `raw` up or down to the nearest of 1, 2, 5 or 10 times a power of ten.
fn round_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    let magnitude = math::pow10(math::floor(math::log10(raw)));
    let mantissa = raw / magnitude;
    let rounded = match mantissa {
        m if m < 1.5 => 1.0,
        m if m < 3.5 => 2.0,
        m if m < 7.5 => 5.0,
        _ => 10.0,
    };
    rounded * magnitude
}

/// Equal slots across a range, one per group, each holding a centered band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    start: f64,
    slot: f64,
    gutter: f64,
}

impl ScaleBand {
    /// Fraction of each slot left empty between neighbouring bars.
    pub const GUTTER: f64 = 0.1;

    /// `count` slots spanning `range`.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        let slot = if count == 0 {
            0.0
        } else {
            (range.1 - range.0).abs() / count as f64
        };
        Self {
            start: range.0.min(range.1),
            slot,
            gutter: Self::GUTTER,
        }
    }

    /// Width of one slot, band plus gutter.
    pub fn step(&self) -> f64 {
        self.slot
    }

    /// Width of a band.
    pub fn band_width(&self) -> f64 {
        self.slot * (1.0 - self.gutter)
    }

    /// Left edge of band `index`; half the gutter sits on either side.
    pub fn x(&self, index: usize) -> f64 {
        self.start + self.slot * (index as f64 + self.gutter * 0.5)
    }

    /// Horizontal center of band `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.start + self.slot * (index as f64 + 0.5)
    }
}
