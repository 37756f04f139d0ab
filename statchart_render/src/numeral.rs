// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeral-script substitution for chart text.
//!
//! Values are formatted with ASCII digits first and then each digit is mapped through a fixed
//! table. Signs, decimal points and `%` pass through untouched; there is no other locale
//! behavior.

extern crate alloc;

use alloc::format;
use alloc::string::String;

/// The digit script used for numbers in chart labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum NumeralSet {
    /// Plain ASCII digits (pass-through).
    #[default]
    Ascii,
    /// The deployment's localized script (Extended Arabic-Indic / Persian digits).
    Localized,
    /// Arabic-Indic digits.
    ArabicIndic,
    /// Devanagari digits.
    Devanagari,
    /// Bengali digits.
    Bengali,
}

const EXTENDED_ARABIC_INDIC: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];
const ARABIC_INDIC: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];
const DEVANAGARI: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];
const BENGALI: [char; 10] = ['০', '১', '২', '৩', '৪', '৫', '৬', '৭', '৮', '৯'];

impl NumeralSet {
    /// Parses a configuration name. Unknown names fall back to [`NumeralSet::Ascii`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "localized" | "persian" | "extended_arabic_indic" => Self::Localized,
            "arabic_indic" | "arabic-indic" => Self::ArabicIndic,
            "devanagari" => Self::Devanagari,
            "bengali" => Self::Bengali,
            _ => Self::Ascii,
        }
    }

    /// Returns the canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Localized => "localized",
            Self::ArabicIndic => "arabic_indic",
            Self::Devanagari => "devanagari",
            Self::Bengali => "bengali",
        }
    }

    fn digits(self) -> Option<&'static [char; 10]> {
        match self {
            Self::Ascii => None,
            Self::Localized => Some(&EXTENDED_ARABIC_INDIC),
            Self::ArabicIndic => Some(&ARABIC_INDIC),
            Self::Devanagari => Some(&DEVANAGARI),
            Self::Bengali => Some(&BENGALI),
        }
    }

    /// Maps every ASCII digit in `text` to this script.
    pub fn transliterate(self, text: &str) -> String {
        let Some(table) = self.digits() else {
            return String::from(text);
        };
        text.chars()
            .map(|c| match c.to_digit(10) {
                Some(d) => table[d as usize],
                None => c,
            })
            .collect()
    }
}

impl From<String> for NumeralSet {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<NumeralSet> for String {
    fn from(value: NumeralSet) -> Self {
        Self::from(value.name())
    }
}

/// Formats `value` in the requested numeral script.
///
/// Uses the shortest round-trip representation (`30` for `30.0`, `2.5` for `2.5`).
pub fn format(value: f64, numeral_set: NumeralSet) -> String {
    numeral_set.transliterate(&format!("{value}"))
}

/// Formats a category count for legends and axis ticks.
pub fn format_count(value: f64, numeral_set: NumeralSet) -> String {
    format(value, numeral_set)
}

/// Formats a percentage with the single display precision used across charts (one decimal).
pub fn format_percent(percentage: f64, numeral_set: NumeralSet) -> String {
    numeral_set.transliterate(&format!("{percentage:.1}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_pass_through() {
        assert_eq!(format(1234.0, NumeralSet::Ascii), "1234");
        assert_eq!(format(2.5, NumeralSet::Ascii), "2.5");
    }

    #[test]
    fn localized_maps_every_digit() {
        assert_eq!(format(1234567890.0, NumeralSet::Localized), "۱۲۳۴۵۶۷۸۹۰");
        assert_eq!(format(12.5, NumeralSet::Devanagari), "१२.५");
        assert_eq!(format(7.0, NumeralSet::Bengali), "৭");
        assert_eq!(format(30.0, NumeralSet::ArabicIndic), "٣٠");
    }

    #[test]
    fn percent_uses_one_decimal_and_keeps_symbols() {
        assert_eq!(format_percent(30.0, NumeralSet::Ascii), "30.0%");
        assert_eq!(format_percent(33.333, NumeralSet::Ascii), "33.3%");
        assert_eq!(format_percent(66.666, NumeralSet::Localized), "۶۶.۷%");
    }

    #[test]
    fn unknown_names_fall_back_to_ascii() {
        assert_eq!(NumeralSet::from_name("klingon"), NumeralSet::Ascii);
        assert_eq!(NumeralSet::from_name(""), NumeralSet::Ascii);
        assert_eq!(NumeralSet::from_name(" Localized "), NumeralSet::Localized);
        for set in [
            NumeralSet::Ascii,
            NumeralSet::Localized,
            NumeralSet::ArabicIndic,
            NumeralSet::Devanagari,
            NumeralSet::Bengali,
        ] {
            assert_eq!(NumeralSet::from_name(set.name()), set);
        }
    }
}
