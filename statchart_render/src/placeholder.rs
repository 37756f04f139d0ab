// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The "No data" chart drawn for empty or all-zero datasets.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Point, Rect};
use peniko::color::palette::css;

use crate::mark::{Mark, TextBaseline, TextStyle};
use crate::style::StyleConfig;
use crate::z_order;

/// Text shown in place of a chart.
pub(crate) const PLACEHOLDER_TEXT: &str = "No data";

const BACKGROUND_ID: u64 = 0x1;
const LABEL_ID: u64 = 0x2;

/// Placeholder marks at the configured canvas size.
pub(crate) fn placeholder_marks(style: &StyleConfig) -> Vec<Mark> {
    let (w, h) = (style.width_f64(), style.height_f64());
    let label = TextStyle::new(14.0, css::DIM_GRAY)
        .centered()
        .with_baseline(TextBaseline::Middle);
    alloc::vec![
        Mark::rect(
            BACKGROUND_ID,
            z_order::BACKGROUND,
            Rect::new(0.0, 0.0, w, h),
            css::WHITE_SMOKE,
        ),
        Mark::text(
            LABEL_ID,
            z_order::TITLES,
            Point::new(w * 0.5, h * 0.5),
            PLACEHOLDER_TEXT,
            &label,
        ),
    ]
}
