// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved chart marks.
//!
//! A [`Mark`] is a fully evaluated primitive (rect, text, or path) with a stable id and a
//! z-index. Renderers emit marks; the SVG writer consumes them.

extern crate alloc;

use alloc::string::String;

use kurbo::{BezPath, Point, Rect, Shape};
use peniko::Brush;

/// Stable identity for a mark within one rendered chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkId(pub u64);

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    Start,
    /// Text is centered on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

/// Vertical text baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    /// The anchor point is the vertical middle of the text.
    Middle,
    /// The anchor point is the alphabetic baseline.
    Alphabetic,
    /// The anchor point is the top of the text.
    Hanging,
}

/// A filled rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct RectItem {
    /// Geometry in canvas coordinates.
    pub rect: Rect,
    /// Fill paint.
    pub fill: Brush,
}

/// A single line of unshaped text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    /// Anchor position.
    pub pos: Point,
    /// Text content.
    pub text: String,
    /// Font and placement.
    pub style: TextStyle,
}

/// Font size, anchoring and paint for one kind of label.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in canvas units.
    pub font_size: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline.
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
}

impl TextStyle {
    /// Start-anchored, vertically centered text.
    pub fn new(font_size: f64, fill: impl Into<Brush>) -> Self {
        Self {
            font_size,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Middle,
            fill: fill.into(),
        }
    }

    /// Centers the text on its anchor point.
    pub fn centered(mut self) -> Self {
        self.anchor = TextAnchor::Middle;
        self
    }

    /// Sets the horizontal anchor.
    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the baseline.
    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }
}

/// A filled (and optionally stroked) path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathItem {
    /// Path geometry.
    pub path: BezPath,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint, only drawn when `stroke_width > 0`.
    pub stroke: Brush,
    /// Stroke width.
    pub stroke_width: f64,
}

/// The evaluated content of a mark.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkPayload {
    /// A rectangle.
    Rect(RectItem),
    /// A text label.
    Text(TextItem),
    /// A path.
    Path(PathItem),
}

impl MarkPayload {
    /// Geometric bounds, if the payload has intrinsic geometry.
    ///
    /// Text has no intrinsic bounds without a measurer, so this returns `None` for text.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            Self::Path(p) => Some(p.path.bounding_box()),
            Self::Text(_) => None,
        }
    }
}

/// A resolved mark.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Stable id, used as the paint-order tie-break.
    pub id: MarkId,
    /// Paint order hint; lower values paint first.
    pub z_index: i32,
    /// Evaluated content.
    pub payload: MarkPayload,
}

impl Mark {
    /// Creates a mark.
    pub fn new(id: MarkId, z_index: i32, payload: MarkPayload) -> Self {
        Self {
            id,
            z_index,
            payload,
        }
    }

    /// A filled rectangle.
    pub fn rect(id: u64, z_index: i32, rect: Rect, fill: impl Into<Brush>) -> Self {
        Self::new(
            MarkId(id),
            z_index,
            MarkPayload::Rect(RectItem {
                rect,
                fill: fill.into(),
            }),
        )
    }

    /// A single line of text anchored at `pos`.
    pub fn text(
        id: u64,
        z_index: i32,
        pos: Point,
        text: impl Into<String>,
        style: &TextStyle,
    ) -> Self {
        Self::new(
            MarkId(id),
            z_index,
            MarkPayload::Text(TextItem {
                pos,
                text: text.into(),
                style: style.clone(),
            }),
        )
    }

    /// Returns the text payload, if this is a text mark.
    pub fn as_text(&self) -> Option<&TextItem> {
        match &self.payload {
            MarkPayload::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the rect payload, if this is a rect mark.
    pub fn as_rect(&self) -> Option<&RectItem> {
        match &self.payload {
            MarkPayload::Rect(r) => Some(r),
            _ => None,
        }
    }
}

/// A paint + width pair for stroked outlines and gridlines.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width in canvas units.
    pub stroke_width: f64,
}

impl StrokeStyle {
    /// Convenience for a solid stroke.
    pub fn solid(brush: impl Into<Brush>, stroke_width: f64) -> Self {
        Self {
            brush: brush.into(),
            stroke_width,
        }
    }
}
