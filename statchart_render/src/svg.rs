// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG serialization of rendered charts.
//!
//! Output is byte-stable: marks are written in `(z_index, id)` order and every number is
//! printed with at most two decimals.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use kurbo::{BezPath, PathEl, Point};
use peniko::Brush;

use crate::mark::{Mark, MarkPayload, TextAnchor, TextBaseline};
use crate::renderer::RenderedChart;

const FONT_FAMILY: &str = "sans-serif";

/// Serializes a rendered chart to a self-contained SVG document.
///
/// `width`, `height` and the `viewBox` always equal the chart canvas.
pub fn to_svg(chart: &RenderedChart) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_svg(&mut out, chart);
    out
}

fn write_svg(out: &mut String, chart: &RenderedChart) -> fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = chart.width,
        h = chart.height,
    )?;

    let mut marks: Vec<&Mark> = chart.marks.iter().collect();
    marks.sort_by_key(|m| (m.z_index, m.id));

    for mark in marks {
        match &mark.payload {
            MarkPayload::Rect(r) => {
                write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                    Num(r.rect.x0),
                    Num(r.rect.y0),
                    Num(r.rect.width()),
                    Num(r.rect.height()),
                )?;
                write_paint_attr(out, "fill", &r.fill)?;
                out.push_str("/>\n");
            }
            MarkPayload::Text(t) => {
                let baseline = match t.style.baseline {
                    TextBaseline::Middle => "middle",
                    TextBaseline::Alphabetic => "alphabetic",
                    TextBaseline::Hanging => "hanging",
                };
                let anchor = match t.style.anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                    TextAnchor::End => "end",
                };
                write!(
                    out,
                    r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}" dominant-baseline="{baseline}" text-anchor="{anchor}""#,
                    Num(t.pos.x),
                    Num(t.pos.y),
                    Num(t.style.font_size),
                )?;
                write_paint_attr(out, "fill", &t.style.fill)?;
                out.push('>');
                escape_xml(out, &t.text);
                out.push_str("</text>\n");
            }
            MarkPayload::Path(p) => {
                out.push_str(r#"<path d=""#);
                write_path_data(out, &p.path)?;
                out.push('"');
                write_paint_attr(out, "fill", &p.fill)?;
                if p.stroke_width > 0.0 {
                    write_paint_attr(out, "stroke", &p.stroke)?;
                    write!(out, r#" stroke-width="{}""#, Num(p.stroke_width))?;
                }
                out.push_str("/>\n");
            }
        }
    }

    out.push_str("</svg>\n");
    Ok(())
}

/// A coordinate printed with at most two decimals, trailing zeros trimmed.
struct Num(f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = alloc::format!("{:.2}", self.0);
        if s.contains('.') {
            let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
            s.truncate(trimmed);
        }
        if s == "-0" {
            s = String::from("0");
        }
        f.write_str(&s)
    }
}

fn pt(out: &mut String, p: Point) -> fmt::Result {
    write!(out, "{},{}", Num(p.x), Num(p.y))
}

fn write_path_data(out: &mut String, path: &BezPath) -> fmt::Result {
    for (i, el) in path.elements().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match *el {
            PathEl::MoveTo(p) => {
                out.push('M');
                pt(out, p)?;
            }
            PathEl::LineTo(p) => {
                out.push('L');
                pt(out, p)?;
            }
            PathEl::QuadTo(p1, p2) => {
                out.push('Q');
                pt(out, p1)?;
                out.push(' ');
                pt(out, p2)?;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                out.push('C');
                pt(out, p1)?;
                out.push(' ');
                pt(out, p2)?;
                out.push(' ');
                pt(out, p3)?;
            }
            PathEl::ClosePath => out.push('Z'),
        }
    }
    Ok(())
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) -> fmt::Result {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            write!(
                out,
                r##" {name}="#{:02x}{:02x}{:02x}""##,
                rgba.r, rgba.g, rgba.b
            )?;
            if rgba.a != 255 {
                write!(out, r#" {name}-opacity="{}""#, Num(f64::from(rgba.a) / 255.0))?;
            }
            Ok(())
        }
        _ => write!(out, r#" {name}="none""#),
    }
}

fn escape_xml(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}
