// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacked bar chart geometry.
//!
//! One bar per group. Segments stack bottom-up in a single global category order (first
//! encounter across all groups), so a color means the same category in every bar. The value
//! axis runs from zero to the largest stacked total. Zero-valued segments are skipped.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Point, Rect};
use peniko::Color;
use peniko::color::palette::css;
use smallvec::SmallVec;

use crate::dataset::{CategoryDatum, Group, percentages};
use crate::layout::{ChartFrame, Size};
use crate::legend::{Legend, LegendRow};
use crate::mark::{Mark, TextAnchor, TextBaseline, TextStyle};
use crate::measure::TextMeasurer;
use crate::numeral::format_count;
use crate::scale::{ScaleBand, ScaleLinear};
use crate::style::StyleConfig;
use crate::z_order;

// One id layer per mark family; the low 48 bits index within a layer.
const BACKGROUND_ID: u64 = 0x1;
const GROUP_LABEL_ID_BASE: u64 = 1 << 48;
const GRID_ID_BASE: u64 = 2 << 48;
const TICK_LABEL_ID_BASE: u64 = 3 << 48;
const LEGEND_ID_BASE: u64 = 4 << 48;
const SEGMENT_ID_BASE: u64 = 5 << 48;

/// Height reserved under the bars for group labels.
const GROUP_LABEL_BAND: f64 = 22.0;
/// Gap between the value axis labels and the bars.
const TICK_LABEL_GAP: f64 = 6.0;
const TICK_COUNT: usize = 5;
const LABEL_FONT_SIZE: f64 = 11.0;

/// One stacked segment.
#[derive(Clone, Debug, PartialEq)]
pub struct BarSegment {
    /// Category code.
    pub code: String,
    /// Category label.
    pub label: String,
    /// Category count within this group.
    pub value: f64,
    /// Share of this group's total, in `0..=100`.
    pub percentage: f64,
    /// Segment rectangle in canvas coordinates.
    pub rect: Rect,
    /// Fill color.
    pub color: Color,
}

/// One bar (one group).
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    /// Group id.
    pub group_id: String,
    /// Stacked total for the group.
    pub total: f64,
    /// Left edge of the bar.
    pub x: f64,
    /// Bar width.
    pub width: f64,
    /// Non-zero segments, bottom to top, in the global category order.
    pub segments: SmallVec<[BarSegment; 4]>,
}

/// Stacked bar chart geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct BarGeometry {
    /// The value-axis reference: the largest stacked total across groups.
    pub scale_max: f64,
    /// Global category order shared by every bar.
    pub order: Vec<String>,
    /// Bars in group order.
    pub bars: Vec<Bar>,
    /// Legend rows: categories that are non-zero in at least one group, in global order.
    pub legend: Vec<LegendRow>,
    /// Area the bars were fit into (excluding axis and group labels).
    pub plot: Rect,
}

/// Segment `j` of bar `i`: 24 bits of group index above 24 bits of category index.
fn segment_id(group: usize, category: usize) -> u64 {
    SEGMENT_ID_BASE + ((group as u64) << 24) + category as u64
}

/// Global category order: first encounter across groups, in group order.
pub(crate) fn global_order(groups: &[Group]) -> Vec<&CategoryDatum> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for g in groups {
        for c in &g.categories {
            if seen.insert(c.code.as_str()) {
                out.push(c);
            }
        }
    }
    out
}

/// Computes bar geometry and marks, or `None` when there is nothing to draw.
pub(crate) fn render_bar(
    groups: &[Group],
    style: &StyleConfig,
    measurer: &impl TextMeasurer,
) -> Option<(BarGeometry, Vec<Mark>)> {
    let totals: Vec<f64> = groups.iter().map(Group::total).collect();
    let scale_max = totals.iter().copied().fold(0.0, f64::max);
    if groups.is_empty() || scale_max <= 0.0 {
        return None;
    }

    let order = global_order(groups);
    let legend: Vec<LegendRow> = order
        .iter()
        .filter_map(|first| {
            let count: f64 = groups
                .iter()
                .flat_map(|g| g.categories.iter())
                .filter(|c| c.code == first.code)
                .map(|c| c.value)
                .sum();
            (count > 0.0).then(|| LegendRow {
                code: first.code.clone(),
                label: first.label.clone(),
                count,
                text: format!("{} ({})", first.label, format_count(count, style.numeral_set)),
                color: style.color_for(&first.code),
            })
        })
        .collect();

    let legend_column = Legend::new(LEGEND_ID_BASE, &legend);
    let canvas = Size::new(style.width_f64(), style.height_f64());
    let frame = ChartFrame::arrange(canvas, Some(legend_column.measure(measurer)));

    let ticks = ScaleLinear::new((0.0, scale_max), (1.0, 0.0)).count_ticks(TICK_COUNT);
    let tick_texts: Vec<String> = ticks
        .iter()
        .map(|t| format_count(*t, style.numeral_set))
        .collect();
    let axis_w = tick_texts
        .iter()
        .map(|t| measurer.width(t, LABEL_FONT_SIZE))
        .fold(0.0, f64::max)
        + TICK_LABEL_GAP;

    let plot = frame.plot;
    let area = Rect::new(
        (plot.x0 + axis_w).min(plot.x1),
        plot.y0,
        plot.x1,
        (plot.y1 - GROUP_LABEL_BAND).max(plot.y0),
    );
    let y_scale = ScaleLinear::new((0.0, scale_max), (area.y1, area.y0));
    let band = ScaleBand::new((area.x0, area.x1), groups.len());

    let tick_style = TextStyle::new(LABEL_FONT_SIZE, css::DIM_GRAY).with_anchor(TextAnchor::End);
    let group_style = TextStyle::new(LABEL_FONT_SIZE, css::BLACK)
        .centered()
        .with_baseline(TextBaseline::Hanging);

    let mut marks = Vec::new();
    marks.push(Mark::rect(
        BACKGROUND_ID,
        z_order::BACKGROUND,
        frame.canvas,
        css::WHITE,
    ));

    for (k, (tick, text)) in ticks.iter().zip(tick_texts).enumerate() {
        let y = y_scale.map(*tick);
        marks.push(Mark::rect(
            GRID_ID_BASE + k as u64,
            z_order::GRID_LINES,
            Rect::new(area.x0, y - 0.5, area.x1, y + 0.5),
            css::GAINSBORO,
        ));
        marks.push(Mark::text(
            TICK_LABEL_ID_BASE + k as u64,
            z_order::AXIS_LABELS,
            Point::new(area.x0 - TICK_LABEL_GAP, y),
            text,
            &tick_style,
        ));
    }

    let mut bars = Vec::with_capacity(groups.len());
    for (i, (group, total)) in groups.iter().zip(&totals).enumerate() {
        let values: Vec<f64> = group.categories.iter().map(|c| c.value).collect();
        let shares = percentages(&values);
        let x = band.x(i);
        let width = band.band_width();

        let mut segments: SmallVec<[BarSegment; 4]> = SmallVec::new();
        let mut stacked = 0.0;
        for (j, category) in order.iter().enumerate() {
            let Some(pos) = group
                .categories
                .iter()
                .position(|c| c.code == category.code)
            else {
                continue;
            };
            let datum = &group.categories[pos];
            if datum.value <= 0.0 {
                continue;
            }
            let y_top = y_scale.map(stacked + datum.value);
            let y_bottom = y_scale.map(stacked);
            stacked += datum.value;

            let segment = BarSegment {
                code: datum.code.clone(),
                label: datum.label.clone(),
                value: datum.value,
                percentage: shares[pos],
                rect: Rect::new(x, y_top, x + width, y_bottom),
                color: style.color_for(&datum.code),
            };
            marks.push(Mark::rect(
                segment_id(i, j),
                z_order::SERIES_FILL,
                segment.rect,
                segment.color,
            ));
            segments.push(segment);
        }

        marks.push(Mark::text(
            GROUP_LABEL_ID_BASE + i as u64,
            z_order::AXIS_LABELS,
            Point::new(band.center(i), area.y1 + TICK_LABEL_GAP),
            group.id.clone(),
            &group_style,
        ));

        bars.push(Bar {
            group_id: group.id.clone(),
            total: *total,
            x,
            width,
            segments,
        });
    }

    if let Some(legend_area) = frame.legend {
        marks.extend(legend_column.marks(legend_area.origin()));
    }

    Some((
        BarGeometry {
            scale_max,
            order: order.iter().map(|c| c.code.clone()).collect(),
            bars,
            legend,
            plot: area,
        },
        marks,
    ))
}
