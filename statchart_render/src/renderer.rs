// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart renderer entry point.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::bar::{BarGeometry, render_bar};
use crate::dataset::{CategoryDatum, Dataset, Group, InvalidDataset};
use crate::mark::Mark;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::pie::{PieGeometry, render_pie};
use crate::placeholder::placeholder_marks;
use crate::style::StyleConfig;
use crate::svg::to_svg;

/// Geometry computed for one chart.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartGeometry {
    /// A pie with at least one non-zero slice.
    Pie(PieGeometry),
    /// Stacked bars with at least one non-zero segment.
    Bar(BarGeometry),
    /// The "No data" placeholder.
    Placeholder,
}

/// A fully laid out chart at a fixed canvas size.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedChart {
    /// Canvas width (always the configured width).
    pub width: u32,
    /// Canvas height (always the configured height).
    pub height: u32,
    /// Chart geometry.
    pub geometry: ChartGeometry,
    /// Resolved marks, in generation order.
    pub marks: Vec<Mark>,
}

impl RenderedChart {
    fn placeholder(style: &StyleConfig) -> Self {
        Self {
            width: style.width,
            height: style.height,
            geometry: ChartGeometry::Placeholder,
            marks: placeholder_marks(style),
        }
    }

    /// Returns `true` if this is the "No data" placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.geometry, ChartGeometry::Placeholder)
    }

    /// Serializes the chart to a self-contained SVG document.
    pub fn to_svg(&self) -> String {
        to_svg(self)
    }
}

/// Deterministic pie and stacked-bar renderer.
///
/// Rendering is pure: no I/O, no global state, and identical inputs give identical output.
#[derive(Clone, Debug, Default)]
pub struct ChartRenderer<M = HeuristicTextMeasurer> {
    measurer: M,
}

impl ChartRenderer {
    /// Creates a renderer using [`HeuristicTextMeasurer`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: TextMeasurer> ChartRenderer<M> {
    /// Creates a renderer with a custom text measurer.
    pub fn with_measurer(measurer: M) -> Self {
        Self { measurer }
    }

    /// Renders a dataset in the chart kind matching its shape.
    pub fn render(
        &self,
        dataset: &Dataset,
        style: &StyleConfig,
    ) -> Result<RenderedChart, InvalidDataset> {
        dataset.validate()?;
        Ok(match dataset {
            Dataset::Pie(categories) => self.pie(categories, style),
            Dataset::Bar(groups) => self.bar(groups, style),
        })
    }

    /// Renders a pie chart.
    pub fn render_pie(
        &self,
        categories: &[CategoryDatum],
        style: &StyleConfig,
    ) -> Result<RenderedChart, InvalidDataset> {
        self.render(&Dataset::Pie(categories.to_vec()), style)
    }

    /// Renders a stacked bar chart, one bar per group.
    pub fn render_bar(
        &self,
        groups: &[Group],
        style: &StyleConfig,
    ) -> Result<RenderedChart, InvalidDataset> {
        self.render(&Dataset::Bar(groups.to_vec()), style)
    }

    fn pie(&self, categories: &[CategoryDatum], style: &StyleConfig) -> RenderedChart {
        match render_pie(categories, style, &self.measurer) {
            Some((geometry, marks)) => RenderedChart {
                width: style.width,
                height: style.height,
                geometry: ChartGeometry::Pie(geometry),
                marks,
            },
            None => RenderedChart::placeholder(style),
        }
    }

    fn bar(&self, groups: &[Group], style: &StyleConfig) -> RenderedChart {
        match render_bar(groups, style, &self.measurer) {
            Some((geometry, marks)) => RenderedChart {
                width: style.width,
                height: style.height,
                geometry: ChartGeometry::Bar(geometry),
                marks,
            },
            None => RenderedChart::placeholder(style),
        }
    }
}
