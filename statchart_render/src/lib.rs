// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie and stacked-bar chart rendering for category statistics.
//!
//! This crate is the pure half of `statchart`:
//! - **Datasets** are validated at the boundary ([`Dataset::pie`], [`Dataset::bar`]).
//! - **Renderers** turn a dataset plus a [`StyleConfig`] into chart geometry and a list of
//!   [`Mark`]s ([`ChartRenderer`]).
//! - **Markup** serialization turns those marks into a self-contained SVG document ([`to_svg`]).
//!
//! Nothing here touches the filesystem or spawns processes; the same input always yields
//! byte-identical markup.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod bar;
mod dataset;
mod layout;
mod legend;
mod mark;
mod math;
mod measure;
mod numeral;
mod pie;
mod placeholder;
mod renderer;
mod scale;
mod sector;
mod style;
mod svg;
mod z_order;

pub use bar::{Bar, BarGeometry, BarSegment};
pub use dataset::{CategoryDatum, CategoryInput, Dataset, Group, InvalidDataset, percentages};
pub use layout::{ChartFrame, Size};
pub use legend::{Legend, LegendRow};
pub use mark::{
    Mark, MarkId, MarkPayload, PathItem, RectItem, StrokeStyle, TextAnchor, TextBaseline,
    TextItem, TextStyle,
};
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use numeral::{NumeralSet, format, format_count, format_percent};
pub use pie::{PieGeometry, PieSlice};
pub use renderer::{ChartGeometry, ChartRenderer, RenderedChart};
pub use scale::{ScaleBand, ScaleLinear};
pub use sector::Sector;
pub use style::{NEUTRAL_COLOR, StyleConfig};
pub use svg::to_svg;
pub use z_order::*;
