// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny measure/arrange layout helper.
//!
//! - **Measure**: the legend reports its desired size.
//! - **Arrange**: the fixed canvas is split into a plot area and a legend column on the right.
//!
//! The canvas never grows to fit content: when the legend is wider than the space allowed
//! for it, it is capped and the labels may overflow.

use kurbo::Rect;

/// A width/height pair used by chart layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// Width in canvas units.
    pub width: f64,
    /// Height in canvas units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Output of the arrange pass for one chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartFrame {
    /// The full canvas (`0, 0, width, height`).
    pub canvas: Rect,
    /// Area reserved for the series (pie or bars, including bar labels).
    pub plot: Rect,
    /// Area reserved for the legend, if any.
    pub legend: Option<Rect>,
}

impl ChartFrame {
    /// Padding applied on every side of the canvas.
    pub const OUTER_PADDING: f64 = 16.0;
    /// Gap between the plot and the legend column.
    pub const LEGEND_GAP: f64 = 18.0;
    /// Maximum share of the canvas width the legend may take.
    pub const LEGEND_MAX_SHARE: f64 = 0.4;

    /// Arranges a canvas with an optional legend of the given desired size.
    pub fn arrange(canvas: Size, legend: Option<Size>) -> Self {
        let canvas_rect = Rect::new(0.0, 0.0, canvas.width, canvas.height);
        let pad = Self::OUTER_PADDING;
        let inner = Rect::new(
            pad.min(canvas.width * 0.5),
            pad.min(canvas.height * 0.5),
            (canvas.width - pad).max(canvas.width * 0.5),
            (canvas.height - pad).max(canvas.height * 0.5),
        );

        let Some(legend) = legend else {
            return Self {
                canvas: canvas_rect,
                plot: inner,
                legend: None,
            };
        };

        let legend_w = legend
            .width
            .min(canvas.width * Self::LEGEND_MAX_SHARE)
            .max(0.0);
        let legend_x0 = (inner.x1 - legend_w).max(inner.x0);
        let plot_x1 = (legend_x0 - Self::LEGEND_GAP).max(inner.x0);
        let legend_h = legend.height.min(inner.height());
        let legend_y0 = inner.y0 + (inner.height() - legend_h) * 0.5;

        Self {
            canvas: canvas_rect,
            plot: Rect::new(inner.x0, inner.y0, plot_x1, inner.y1),
            legend: Some(Rect::new(
                legend_x0,
                legend_y0,
                inner.x1,
                legend_y0 + legend_h,
            )),
        }
    }
}
