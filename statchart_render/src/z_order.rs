// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for chart-generated marks.
//!
//! SVG serialization sorts by `(z_index, MarkId)`, so these values only need to be coarse.

/// Canvas background fill.
pub const BACKGROUND: i32 = -100;
/// Value gridlines drawn behind bars.
pub const GRID_LINES: i32 = -50;

/// Filled series marks (pie slices, bar segments).
pub const SERIES_FILL: i32 = 0;
/// Labels drawn on top of series marks (slice percentages).
pub const SERIES_LABELS: i32 = 20;

/// Axis tick labels and group labels.
pub const AXIS_LABELS: i32 = 40;

/// Legend swatches.
pub const LEGEND_SWATCHES: i32 = 60;
/// Legend labels.
pub const LEGEND_LABELS: i32 = 70;
/// Placeholder message and other chart-level annotations.
pub const TITLES: i32 = 80;
