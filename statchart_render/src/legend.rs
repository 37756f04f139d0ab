// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend column: one color swatch plus `label (count)` text per category.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use peniko::Color;
use peniko::color::palette::css;

use crate::layout::Size;
use crate::mark::{Mark, TextStyle};
use crate::measure::TextMeasurer;
use crate::z_order;

/// One legend row as reported in chart geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendRow {
    /// Category code.
    pub code: String,
    /// Category label.
    pub label: String,
    /// The count shown for this category (for bars, summed across groups).
    pub count: f64,
    /// The full row text as drawn (label plus formatted count).
    pub text: String,
    /// Swatch color.
    pub color: Color,
}

/// Legend metrics and rows, measured before the canvas is split and placed afterwards.
#[derive(Clone, Debug)]
pub struct Legend {
    id_base: u64,
    swatch_size: f64,
    row_gap: f64,
    label_gap: f64,
    label_style: TextStyle,
    rows: Vec<(String, Color)>,
}

impl Legend {
    /// A legend over `rows`. Row `i` uses mark ids `id_base + 2i` (swatch) and
    /// `id_base + 2i + 1` (label).
    pub fn new<'a>(id_base: u64, rows: impl IntoIterator<Item = &'a LegendRow>) -> Self {
        Self {
            id_base,
            swatch_size: 12.0,
            row_gap: 6.0,
            label_gap: 6.0,
            label_style: TextStyle::new(12.0, css::BLACK),
            rows: rows
                .into_iter()
                .map(|r| (r.text.clone(), r.color))
                .collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row_height(&self) -> f64 {
        self.swatch_size.max(self.label_style.font_size)
    }

    /// Desired size of the whole column.
    pub fn measure(&self, measurer: &impl TextMeasurer) -> Size {
        if self.rows.is_empty() {
            return Size::default();
        }
        let widest = self
            .rows
            .iter()
            .map(|(text, _)| measurer.width(text, self.label_style.font_size))
            .fold(0.0, f64::max);
        let n = self.rows.len() as f64;
        Size::new(
            self.swatch_size + self.label_gap + widest,
            n * self.row_height() + (n - 1.0) * self.row_gap,
        )
    }

    /// Swatch and label marks with the column's top-left corner at `origin`.
    pub fn marks(&self, origin: Point) -> Vec<Mark> {
        let row_height = self.row_height();
        let mut out = Vec::with_capacity(self.rows.len() * 2);
        for (i, (text, color)) in self.rows.iter().enumerate() {
            let top = origin.y + i as f64 * (row_height + self.row_gap);
            let swatch_top = top + (row_height - self.swatch_size) * 0.5;
            let id = self.id_base + 2 * i as u64;
            out.push(Mark::rect(
                id,
                z_order::LEGEND_SWATCHES,
                Rect::new(
                    origin.x,
                    swatch_top,
                    origin.x + self.swatch_size,
                    swatch_top + self.swatch_size,
                ),
                *color,
            ));
            out.push(Mark::text(
                id + 1,
                z_order::LEGEND_LABELS,
                Point::new(
                    origin.x + self.swatch_size + self.label_gap,
                    top + row_height * 0.5,
                ),
                text.clone(),
                &self.label_style,
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;
    use crate::mark::MarkId;
    use crate::measure::HeuristicTextMeasurer;

    fn row(text: &str, color: Color) -> LegendRow {
        LegendRow {
            code: String::from(text),
            label: String::from(text),
            count: 1.0,
            text: format!("{text} (1)"),
            color,
        }
    }

    #[test]
    fn emits_swatch_and_label_per_row_in_order() {
        let rows = [row("Alpha", css::TOMATO), row("Beta", css::GOLD)];
        let marks = Legend::new(100, &rows).marks(Point::new(10.0, 20.0));
        assert_eq!(marks.len(), 4);

        let labels: Vec<&str> = marks
            .iter()
            .filter_map(|m| m.as_text())
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(labels, ["Alpha (1)", "Beta (1)"]);
        assert_eq!(marks[0].id, MarkId(100));
        assert_eq!(marks[1].id, MarkId(101));
        assert_eq!(marks[2].id, MarkId(102));
        assert_eq!(
            marks[0].as_rect().map(|r| r.rect),
            Some(Rect::new(10.0, 20.0, 22.0, 32.0))
        );
    }

    #[test]
    fn ids_stay_unique_for_long_legends() {
        let rows: Vec<LegendRow> = (0..1500).map(|_| row("x", css::BLACK)).collect();
        let mut ids: Vec<MarkId> = Legend::new(0, &rows)
            .marks(Point::ORIGIN)
            .iter()
            .map(|m| m.id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3000);
    }

    #[test]
    fn measure_covers_rows_and_gaps() {
        let rows = [
            row("A", css::BLACK),
            row("BBBB", css::BLACK),
            row("CC", css::BLACK),
        ];
        let size = Legend::new(1, &rows).measure(&HeuristicTextMeasurer::default());
        // Three rows of 12 plus two gaps of 6.
        assert!((size.height - 48.0).abs() < 1e-9);
        // Swatch, gap, then the widest label "BBBB (1)" at 0.6em per glyph.
        assert!((size.width - (12.0 + 6.0 + 8.0 * 0.6 * 12.0)).abs() < 1e-9);
        let empty = Legend::new(1, core::iter::empty());
        assert_eq!(empty.measure(&HeuristicTextMeasurer::default()), Size::default());
    }
}
