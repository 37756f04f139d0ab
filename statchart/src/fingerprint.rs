// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content fingerprints: the only staleness signal the cache uses.
//!
//! The digest covers the chart kind, every `(code, label, value)` triple sorted by code (bars:
//! groups sorted by id), the canvas size, the pie radius, the numeral script and the resolved
//! color of each code present. Encounter order is not part of it.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use statchart_render::{CategoryDatum, Dataset, StyleConfig};

/// Bumped whenever the digest input layout changes.
const FINGERPRINT_VERSION: u32 = 2;

/// Hex-encoded SHA-256 over a dataset and the style fields that affect its rendering.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `dataset` rendered with `style`.
    pub fn compute(dataset: &Dataset, style: &StyleConfig) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_VERSION.to_le_bytes());

        let mut codes: Vec<&str> = Vec::new();
        match dataset {
            Dataset::Pie(categories) => {
                hasher.update(b"pie");
                feed_categories(&mut hasher, categories, &mut codes);
            }
            Dataset::Bar(groups) => {
                hasher.update(b"bar");
                let mut sorted: Vec<_> = groups.iter().collect();
                sorted.sort_by(|a, b| a.id.cmp(&b.id));
                hasher.update((sorted.len() as u64).to_le_bytes());
                for group in sorted {
                    feed_str(&mut hasher, &group.id);
                    feed_categories(&mut hasher, &group.categories, &mut codes);
                }
            }
        }

        hasher.update(style.width.to_le_bytes());
        hasher.update(style.height.to_le_bytes());
        hasher.update(style.radius.to_le_bytes());
        feed_str(&mut hasher, style.numeral_set.name());

        codes.sort_unstable();
        codes.dedup();
        for code in codes {
            let rgba = style.color_for(code).to_rgba8();
            feed_str(&mut hasher, code);
            hasher.update([rgba.r, rgba.g, rgba.b, rgba.a]);
        }

        Self(format!("{:x}", hasher.finalize()))
    }

    /// The full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn feed_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn feed_categories<'a>(
    hasher: &mut Sha256,
    categories: &'a [CategoryDatum],
    codes: &mut Vec<&'a str>,
) {
    let mut sorted: Vec<&CategoryDatum> = categories.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));
    hasher.update((sorted.len() as u64).to_le_bytes());
    for c in sorted {
        feed_str(hasher, &c.code);
        feed_str(hasher, &c.label);
        // +0.0 folds -0.0 into 0.0.
        hasher.update((c.value + 0.0).to_bits().to_le_bytes());
        codes.push(&c.code);
    }
}
