// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie slice outlines.

use kurbo::{BezPath, Circle, Point, Shape};
use peniko::Brush;

use crate::mark::{Mark, MarkId, MarkPayload, PathItem, StrokeStyle};
use crate::z_order;

/// Flattening tolerance for the slice arc.
const ARC_TOLERANCE: f64 = 0.1;

/// A full-radius pie slice.
///
/// Angles are in degrees, clockwise in canvas coordinates (y grows downward), so `-90` is
/// 12 o'clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sector {
    /// Pie center.
    pub center: Point,
    /// Pie radius.
    pub radius: f64,
    /// Leading edge in degrees.
    pub start_deg: f64,
    /// Sweep in degrees.
    pub sweep_deg: f64,
}

impl Sector {
    /// Outline of the slice: center, leading edge, arc, back to center.
    pub fn to_path(&self) -> BezPath {
        Circle::new(self.center, self.radius)
            .segment(0.0, self.start_deg.to_radians(), self.sweep_deg.to_radians())
            .to_path(ARC_TOLERANCE)
    }

    /// A filled slice mark with a separator outline.
    pub fn mark(&self, id: u64, fill: impl Into<Brush>, outline: &StrokeStyle) -> Mark {
        Mark::new(
            MarkId(id),
            z_order::SERIES_FILL,
            MarkPayload::Path(PathItem {
                path: self.to_path(),
                fill: fill.into(),
                stroke: outline.brush.clone(),
                stroke_width: outline.stroke_width,
            }),
        )
    }
}
