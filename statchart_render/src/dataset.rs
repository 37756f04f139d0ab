// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Category datasets.
//!
//! The aggregation layer hands over loosely shaped `code -> {label, value}` mappings (or, for
//! bar charts, `group -> that mapping`). This module turns them into [`Dataset`] values and
//! rejects anything malformed up front:
//! - values must be finite and non-negative (no clamping),
//! - codes and group ids must be unique and non-empty,
//! - a bar group must contain at least one category.
//!
//! Percentages are always derived from values here; callers never supply them.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;

/// A raw category record from the aggregation boundary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryInput {
    /// Human-readable label. A missing or blank label is replaced by the category code.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    /// Count for this category.
    pub value: f64,
}

impl CategoryInput {
    /// Creates a labelled record.
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: Some(label.into()),
            value,
        }
    }

    /// Creates a record without a label.
    pub fn unlabeled(value: f64) -> Self {
        Self { label: None, value }
    }
}

/// One validated category with its derived percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryDatum {
    /// Stable category code (the color key).
    pub code: String,
    /// Display label.
    pub label: String,
    /// Non-negative count.
    pub value: f64,
    /// Share of the enclosing group total, in `0..=100`.
    pub percentage: f64,
}

/// One bar-chart group (one bar).
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    /// Group identifier, shown under the bar.
    pub id: String,
    /// Categories in encounter order.
    pub categories: Vec<CategoryDatum>,
}

impl Group {
    /// Sum of all category values.
    pub fn total(&self) -> f64 {
        self.categories.iter().map(|c| c.value).sum()
    }
}

/// A validated chart dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum Dataset {
    /// A flat category list, rendered as a pie.
    Pie(Vec<CategoryDatum>),
    /// Per-group category lists, rendered as stacked bars.
    Bar(Vec<Group>),
}

/// Malformed input rejected at the dataset boundary or by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum InvalidDataset {
    /// A category value was negative.
    NegativeValue {
        /// Offending category code.
        code: String,
        /// The rejected value.
        value: f64,
    },
    /// A category value was NaN or infinite.
    NonFiniteValue {
        /// Offending category code.
        code: String,
    },
    /// A category code was empty.
    EmptyCode,
    /// The same category code appeared twice within one collection.
    DuplicateCode {
        /// The repeated code.
        code: String,
    },
    /// A group id was empty.
    EmptyGroupId,
    /// The same group id appeared twice.
    DuplicateGroup {
        /// The repeated group id.
        group: String,
    },
    /// A bar group contained no categories.
    EmptyGroup {
        /// The empty group id.
        group: String,
    },
    /// Every value is finite but their sum is not.
    NonFiniteTotal {
        /// The group whose total overflowed; `None` for a pie or for the sum across groups.
        group: Option<String>,
    },
    /// The dataset shape does not match the requested chart kind.
    KindMismatch {
        /// The chart kind that was requested.
        expected: &'static str,
    },
}

impl fmt::Display for InvalidDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeValue { code, value } => {
                write!(f, "category `{code}` has negative value {value}")
            }
            Self::NonFiniteValue { code } => write!(f, "category `{code}` has a non-finite value"),
            Self::EmptyCode => f.write_str("category code is empty"),
            Self::DuplicateCode { code } => write!(f, "category `{code}` appears more than once"),
            Self::EmptyGroupId => f.write_str("group id is empty"),
            Self::DuplicateGroup { group } => write!(f, "group `{group}` appears more than once"),
            Self::EmptyGroup { group } => write!(f, "group `{group}` has no categories"),
            Self::NonFiniteTotal { group: Some(group) } => {
                write!(f, "values of group `{group}` sum to a non-finite total")
            }
            Self::NonFiniteTotal { group: None } => {
                f.write_str("values sum to a non-finite total")
            }
            Self::KindMismatch { expected } => {
                write!(f, "dataset shape does not match a {expected} chart")
            }
        }
    }
}

impl core::error::Error for InvalidDataset {}

/// Derives percentages (`0..=100`) for a list of values.
///
/// When the total is zero every percentage is zero.
pub fn percentages(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return values.iter().map(|_| 0.0).collect();
    }
    values.iter().map(|v| v / total * 100.0).collect()
}

fn check_value(code: &str, value: f64) -> Result<(), InvalidDataset> {
    if !value.is_finite() {
        return Err(InvalidDataset::NonFiniteValue {
            code: String::from(code),
        });
    }
    if value < 0.0 {
        return Err(InvalidDataset::NegativeValue {
            code: String::from(code),
            value,
        });
    }
    Ok(())
}

/// Values are finite and non-negative, so a finite sum bounds every partial sum.
fn check_total<'a>(
    values: impl IntoIterator<Item = &'a f64>,
    group: Option<&str>,
) -> Result<(), InvalidDataset> {
    let total: f64 = values.into_iter().sum();
    if total.is_finite() {
        Ok(())
    } else {
        Err(InvalidDataset::NonFiniteTotal {
            group: group.map(String::from),
        })
    }
}

fn build_categories<I, C>(entries: I) -> Result<Vec<CategoryDatum>, InvalidDataset>
where
    I: IntoIterator<Item = (C, CategoryInput)>,
    C: Into<String>,
{
    let mut out: Vec<CategoryDatum> = Vec::new();
    for (code, input) in entries {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(InvalidDataset::EmptyCode);
        }
        check_value(&code, input.value)?;
        if out.iter().any(|c| c.code == code) {
            return Err(InvalidDataset::DuplicateCode { code });
        }
        let label = match input.label {
            Some(label) if !label.trim().is_empty() => label,
            _ => code.clone(),
        };
        out.push(CategoryDatum {
            code,
            label,
            // -0.0 passes the sign check; store it as +0.0 so hashing is stable.
            value: input.value + 0.0,
            percentage: 0.0,
        });
    }
    assign_percentages(&mut out);
    Ok(out)
}

fn assign_percentages(categories: &mut [CategoryDatum]) {
    let values: Vec<f64> = categories.iter().map(|c| c.value).collect();
    for (c, p) in categories.iter_mut().zip(percentages(&values)) {
        c.percentage = p;
    }
}

fn check_categories(categories: &[CategoryDatum]) -> Result<(), InvalidDataset> {
    let mut seen: HashSet<&str> = HashSet::new();
    for c in categories {
        if c.code.trim().is_empty() {
            return Err(InvalidDataset::EmptyCode);
        }
        check_value(&c.code, c.value)?;
        if !seen.insert(c.code.as_str()) {
            return Err(InvalidDataset::DuplicateCode {
                code: c.code.clone(),
            });
        }
    }
    Ok(())
}

/// Legend counts sum one code across groups; the grand total bounds them.
fn check_bar_total(groups: &[Group]) -> Result<(), InvalidDataset> {
    check_total(
        groups
            .iter()
            .flat_map(|g| g.categories.iter().map(|c| &c.value)),
        None,
    )
}

impl Dataset {
    /// Builds a pie dataset from `(code, input)` pairs in encounter order.
    pub fn pie<I, C>(entries: I) -> Result<Self, InvalidDataset>
    where
        I: IntoIterator<Item = (C, CategoryInput)>,
        C: Into<String>,
    {
        let categories = build_categories(entries)?;
        check_total(categories.iter().map(|c| &c.value), None)?;
        Ok(Self::Pie(categories))
    }

    /// Builds a bar dataset from `(group_id, entries)` pairs, one group per bar.
    pub fn bar<G, K, I, C>(groups: G) -> Result<Self, InvalidDataset>
    where
        G: IntoIterator<Item = (K, I)>,
        K: Into<String>,
        I: IntoIterator<Item = (C, CategoryInput)>,
        C: Into<String>,
    {
        let mut out: Vec<Group> = Vec::new();
        for (id, entries) in groups {
            let id = id.into();
            if id.trim().is_empty() {
                return Err(InvalidDataset::EmptyGroupId);
            }
            if out.iter().any(|g| g.id == id) {
                return Err(InvalidDataset::DuplicateGroup { group: id });
            }
            let categories = build_categories(entries)?;
            if categories.is_empty() {
                return Err(InvalidDataset::EmptyGroup { group: id });
            }
            check_total(categories.iter().map(|c| &c.value), Some(id.as_str()))?;
            out.push(Group { id, categories });
        }
        check_bar_total(&out)?;
        Ok(Self::Bar(out))
    }

    /// Re-checks the structural invariants.
    ///
    /// Fields are public, so a dataset assembled by hand may not have gone through
    /// [`Dataset::pie`] or [`Dataset::bar`]; renderers call this before doing any geometry.
    pub fn validate(&self) -> Result<(), InvalidDataset> {
        match self {
            Self::Pie(categories) => {
                check_categories(categories)?;
                check_total(categories.iter().map(|c| &c.value), None)
            }
            Self::Bar(groups) => {
                let mut seen: HashSet<&str> = HashSet::new();
                for g in groups {
                    if g.id.trim().is_empty() {
                        return Err(InvalidDataset::EmptyGroupId);
                    }
                    if !seen.insert(g.id.as_str()) {
                        return Err(InvalidDataset::DuplicateGroup {
                            group: g.id.clone(),
                        });
                    }
                    if g.categories.is_empty() {
                        return Err(InvalidDataset::EmptyGroup { group: g.id.clone() });
                    }
                    check_categories(&g.categories)?;
                    check_total(g.categories.iter().map(|c| &c.value), Some(g.id.as_str()))?;
                }
                check_bar_total(groups)
            }
        }
    }

    /// Returns `true` when there is nothing to draw (no categories, or every value is zero).
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Pie(categories) => categories.iter().all(|c| c.value == 0.0),
            Self::Bar(groups) => groups
                .iter()
                .all(|g| g.categories.iter().all(|c| c.value == 0.0)),
        }
    }

    /// The chart kind slug matching this dataset's shape (`"pie"` or `"bar"`).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Pie(_) => "pie",
            Self::Bar(_) => "bar",
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn pie_percentages_sum_to_one_hundred() {
        let ds = Dataset::pie([
            ("A", CategoryInput::new("Alpha", 1.0)),
            ("B", CategoryInput::new("Beta", 1.0)),
            ("C", CategoryInput::new("Gamma", 1.0)),
        ])
        .unwrap();
        let Dataset::Pie(cats) = ds else {
            panic!("expected pie");
        };
        let sum: f64 = cats.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn zero_total_has_zero_percentages() {
        let ds = Dataset::pie([
            ("A", CategoryInput::unlabeled(0.0)),
            ("B", CategoryInput::unlabeled(0.0)),
        ])
        .unwrap();
        let Dataset::Pie(cats) = &ds else {
            panic!("expected pie");
        };
        assert!(cats.iter().all(|c| c.percentage == 0.0));
        assert!(ds.is_blank());
    }

    #[test]
    fn missing_and_blank_labels_fall_back_to_code() {
        let ds = Dataset::pie([
            ("A", CategoryInput::unlabeled(1.0)),
            ("B", CategoryInput::new("  ", 1.0)),
        ])
        .unwrap();
        let Dataset::Pie(cats) = ds else {
            panic!("expected pie");
        };
        assert_eq!(cats[0].label, "A");
        assert_eq!(cats[1].label, "B");
    }

    #[test]
    fn negative_and_non_finite_values_are_rejected() {
        let err = Dataset::pie([("A", CategoryInput::unlabeled(-1.0))]).unwrap_err();
        assert_eq!(
            err,
            InvalidDataset::NegativeValue {
                code: "A".into(),
                value: -1.0
            }
        );

        let err = Dataset::pie([("A", CategoryInput::unlabeled(f64::NAN))]).unwrap_err();
        assert_eq!(err, InvalidDataset::NonFiniteValue { code: "A".into() });
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let err = Dataset::pie([
            ("A", CategoryInput::unlabeled(f64::MAX)),
            ("B", CategoryInput::unlabeled(f64::MAX)),
        ])
        .unwrap_err();
        assert_eq!(err, InvalidDataset::NonFiniteTotal { group: None });

        let err = Dataset::bar([(
            "ward1",
            vec![
                ("A", CategoryInput::unlabeled(f64::MAX)),
                ("B", CategoryInput::unlabeled(f64::MAX)),
            ],
        )])
        .unwrap_err();
        assert_eq!(
            err,
            InvalidDataset::NonFiniteTotal {
                group: Some("ward1".into())
            }
        );

        // Each ward is finite, the legend count for `A` across both is not.
        let err = Dataset::bar([
            ("ward1", vec![("A", CategoryInput::unlabeled(f64::MAX))]),
            ("ward2", vec![("A", CategoryInput::unlabeled(f64::MAX))]),
        ])
        .unwrap_err();
        assert_eq!(err, InvalidDataset::NonFiniteTotal { group: None });

        let hand_built = Dataset::Pie(vec![
            CategoryDatum {
                code: "A".into(),
                label: "A".into(),
                value: f64::MAX,
                percentage: 50.0,
            },
            CategoryDatum {
                code: "B".into(),
                label: "B".into(),
                value: f64::MAX,
                percentage: 50.0,
            },
        ]);
        assert_eq!(
            hand_built.validate(),
            Err(InvalidDataset::NonFiniteTotal { group: None })
        );
    }

    #[test]
    fn empty_bar_group_is_rejected() {
        let groups: Vec<(&str, Vec<(&str, CategoryInput)>)> = vec![
            ("ward1", vec![("A", CategoryInput::unlabeled(1.0))]),
            ("ward2", vec![]),
        ];
        let err = Dataset::bar(groups).unwrap_err();
        assert_eq!(
            err,
            InvalidDataset::EmptyGroup {
                group: "ward2".into()
            }
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = Dataset::pie([
            ("A", CategoryInput::unlabeled(1.0)),
            ("A", CategoryInput::unlabeled(2.0)),
        ])
        .unwrap_err();
        assert_eq!(err, InvalidDataset::DuplicateCode { code: "A".into() });

        let groups = vec![
            ("w", vec![("A", CategoryInput::unlabeled(1.0))]),
            ("w", vec![("A", CategoryInput::unlabeled(1.0))]),
        ];
        let err = Dataset::bar(groups).unwrap_err();
        assert_eq!(err, InvalidDataset::DuplicateGroup { group: "w".into() });
    }

    #[test]
    fn validate_catches_hand_built_datasets() {
        let ds = Dataset::Pie(vec![CategoryDatum {
            code: "A".into(),
            label: "A".into(),
            value: -3.0,
            percentage: 100.0,
        }]);
        assert!(matches!(
            ds.validate(),
            Err(InvalidDataset::NegativeValue { .. })
        ));

        let ds = Dataset::Bar(vec![Group {
            id: "ward1".into(),
            categories: vec![],
        }]);
        assert!(matches!(ds.validate(), Err(InvalidDataset::EmptyGroup { .. })));
    }
}
