// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart slot addressing.

use std::fmt;

use statchart_render::Dataset;

/// The two chart kinds that can be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartKind {
    /// A pie chart over one category list.
    Pie,
    /// A stacked bar chart, one bar per group.
    Bar,
}

impl ChartKind {
    /// The slug used in file names (`pie` / `bar`).
    pub fn slug(self) -> &'static str {
        match self {
            Self::Pie => "pie",
            Self::Bar => "bar",
        }
    }

    /// The kind matching a dataset's shape.
    pub fn of(dataset: &Dataset) -> Self {
        match dataset {
            Dataset::Pie(_) => Self::Pie,
            Dataset::Bar(_) => Self::Bar,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// `(domain, category, kind)`: the address of one cached chart.
///
/// Segments are normalized to `[a-z0-9-]`; `_` only ever appears as the separator in
/// [`ChartKey::slug`], so two distinct keys never share a file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartKey {
    domain: String,
    category: String,
    kind: ChartKind,
}

impl ChartKey {
    /// Builds a key, slugifying `domain` and `category`.
    pub fn new(domain: &str, category: &str, kind: ChartKind) -> Self {
        Self {
            domain: slugify(domain),
            category: slugify(category),
            kind,
        }
    }

    /// Shorthand for a pie chart key.
    pub fn pie(domain: &str, category: &str) -> Self {
        Self::new(domain, category, ChartKind::Pie)
    }

    /// Shorthand for a bar chart key.
    pub fn bar(domain: &str, category: &str) -> Self {
        Self::new(domain, category, ChartKind::Bar)
    }

    /// Slugified domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Slugified category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Chart kind.
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// `{domain}_{category}`.
    pub fn slug(&self) -> String {
        format!("{}_{}", self.domain, self.category)
    }

    /// `{domain}_{category}_{kind}_chart`, the shared stem of every artifact file.
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}_chart", self.domain, self.category, self.kind)
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.domain, self.category, self.kind)
    }
}

fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        String::from("chart")
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_slugified() {
        let key = ChartKey::pie("Housing Stats", "Tenure / Type");
        assert_eq!(key.domain(), "housing-stats");
        assert_eq!(key.category(), "tenure-type");
        assert_eq!(key.file_stem(), "housing-stats_tenure-type_pie_chart");
        assert_eq!(key.to_string(), "housing-stats/tenure-type/pie");
    }

    #[test]
    fn underscores_cannot_collide_across_segments() {
        let a = ChartKey::bar("a_b", "c");
        let b = ChartKey::bar("a", "b_c");
        assert_ne!(a.file_stem(), b.file_stem());
        assert_eq!(a.slug(), "a-b_c");
    }

    #[test]
    fn empty_segment_becomes_placeholder_slug() {
        let key = ChartKey::bar("  ", "!!!");
        assert_eq!(key.slug(), "chart_chart");
    }
}
