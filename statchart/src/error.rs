// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::PathBuf;

use statchart_render::InvalidDataset;
use thiserror::Error;

/// Errors surfaced to callers of the chart service.
///
/// Raster conversion problems never show up here; they degrade to a vector-only artifact.
#[derive(Error, Debug)]
pub enum ChartError {
    /// The dataset was malformed or did not match the requested chart kind.
    #[error("invalid dataset: {0}")]
    InvalidDataset(#[from] InvalidDataset),

    /// Writing or reading an artifact failed.
    #[error("I/O error at {}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact file was replaced by a newer generation after it was resolved.
    #[error("artifact at {} was superseded", path.display())]
    Superseded {
        /// The replaced file.
        path: PathBuf,
    },

    /// A manifest could not be serialized.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The configuration was rejected.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file was not valid TOML.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ChartError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ChartError>;
