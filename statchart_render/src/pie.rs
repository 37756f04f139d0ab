// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie chart geometry.
//!
//! Slices follow encounter order, start at 12 o'clock and advance clockwise. Zero-valued
//! categories produce neither a slice nor a legend row.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use peniko::Color;
use peniko::color::palette::css;

use crate::dataset::{CategoryDatum, percentages};
use crate::layout::{ChartFrame, Size};
use crate::legend::{Legend, LegendRow};
use crate::mark::{Mark, StrokeStyle, TextStyle};
use crate::math::polar;
use crate::measure::TextMeasurer;
use crate::numeral::{format_count, format_percent};
use crate::sector::Sector;
use crate::style::StyleConfig;
use crate::z_order;

/// Angle of the first slice's leading edge, in degrees (12 o'clock).
pub(crate) const START_ANGLE_DEG: f64 = -90.0;
/// Slice labels sit at this fraction of the radius.
pub(crate) const LABEL_RADIUS_RATIO: f64 = 0.7;

// One id layer per mark family; the low 48 bits index within a layer.
const BACKGROUND_ID: u64 = 0x1;
const SLICE_ID_BASE: u64 = 1 << 48;
const SLICE_LABEL_ID_BASE: u64 = 2 << 48;
const LEGEND_ID_BASE: u64 = 3 << 48;

/// One drawn pie slice.
#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
    /// Category code.
    pub code: String,
    /// Category label.
    pub label: String,
    /// Category count.
    pub value: f64,
    /// Share of the total, in `0..=100`.
    pub percentage: f64,
    /// Leading edge in degrees (`-90` is 12 o'clock, growing clockwise).
    pub start_angle: f64,
    /// Sweep in degrees.
    pub sweep_angle: f64,
    /// Anchor of the percentage label (mid-angle, 70% of the radius).
    pub label_pos: Point,
    /// Fill color.
    pub color: Color,
}

impl PieSlice {
    /// Mid-angle in degrees.
    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle * 0.5
    }
}

/// Pie chart geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct PieGeometry {
    /// Pie center.
    pub center: Point,
    /// Effective radius: the configured radius, shrunk only if the plot area is smaller.
    pub radius: f64,
    /// Slices in encounter order.
    pub slices: Vec<PieSlice>,
    /// Legend rows, same categories and order as `slices`.
    pub legend: Vec<LegendRow>,
}

impl PieGeometry {
    /// Sum of all slice sweeps in degrees.
    pub fn total_sweep(&self) -> f64 {
        self.slices.iter().map(|s| s.sweep_angle).sum()
    }
}

/// Computes pie geometry and marks, or `None` when the total is zero.
pub(crate) fn render_pie(
    categories: &[CategoryDatum],
    style: &StyleConfig,
    measurer: &impl TextMeasurer,
) -> Option<(PieGeometry, Vec<Mark>)> {
    let values: Vec<f64> = categories.iter().map(|c| c.value).collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let shares = percentages(&values);

    let visible: Vec<(&CategoryDatum, f64)> = categories
        .iter()
        .zip(shares)
        .filter(|(c, _)| c.value > 0.0)
        .collect();

    let legend: Vec<LegendRow> = visible
        .iter()
        .map(|(c, _)| LegendRow {
            code: c.code.clone(),
            label: c.label.clone(),
            count: c.value,
            text: format!("{} ({})", c.label, format_count(c.value, style.numeral_set)),
            color: style.color_for(&c.code),
        })
        .collect();

    let legend_column = Legend::new(LEGEND_ID_BASE, &legend);
    let canvas = Size::new(style.width_f64(), style.height_f64());
    let frame = ChartFrame::arrange(canvas, Some(legend_column.measure(measurer)));

    let plot = frame.plot;
    let center = plot.center();
    let radius = f64::from(style.radius)
        .min(plot.width().min(plot.height()) * 0.5)
        .max(0.0);

    let mut slices = Vec::with_capacity(visible.len());
    let mut start = START_ANGLE_DEG;
    for (c, percentage) in &visible {
        let sweep = c.value / total * 360.0;
        slices.push(PieSlice {
            code: c.code.clone(),
            label: c.label.clone(),
            value: c.value,
            percentage: *percentage,
            start_angle: start,
            sweep_angle: sweep,
            label_pos: polar(center, radius * LABEL_RADIUS_RATIO, start + sweep * 0.5),
            color: style.color_for(&c.code),
        });
        start += sweep;
    }

    let label_style = TextStyle::new(11.0, css::BLACK).centered();
    let outline = StrokeStyle::solid(css::WHITE, 1.0);
    let mut marks = Vec::with_capacity(1 + slices.len() * 2 + legend.len() * 2);
    marks.push(Mark::rect(
        BACKGROUND_ID,
        z_order::BACKGROUND,
        frame.canvas,
        css::WHITE,
    ));
    for (i, slice) in slices.iter().enumerate() {
        let sector = Sector {
            center,
            radius,
            start_deg: slice.start_angle,
            sweep_deg: slice.sweep_angle,
        };
        marks.push(sector.mark(SLICE_ID_BASE + i as u64, slice.color, &outline));
        marks.push(Mark::text(
            SLICE_LABEL_ID_BASE + i as u64,
            z_order::SERIES_LABELS,
            slice.label_pos,
            format_percent(slice.percentage, style.numeral_set),
            &label_style,
        ));
    }
    if let Some(area) = frame.legend {
        marks.extend(legend_column.marks(area.origin()));
    }

    Some((
        PieGeometry {
            center,
            radius,
            slices,
            legend,
        },
        marks,
    ))
}

