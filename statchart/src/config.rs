// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TOML configuration.
//!
//! ```toml
//! output_dir = "charts"
//!
//! [raster]
//! enabled = true
//! program = "rsvg-convert"
//! args = ["-f", "png", "-o", "{output}", "{input}"]
//! timeout_secs = 30
//!
//! [style]
//! width = 640
//! height = 400
//! radius = 150
//! numeral_set = "ascii"
//!
//! [style.colors]
//! A = "#4e79a7"
//! ```
//!
//! Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use statchart_render::StyleConfig;

use crate::error::{ChartError, Result};
use crate::raster::{
    CommandRasterConverter, DEFAULT_PROGRAM, DEFAULT_TIMEOUT, NoopRasterConverter,
    RasterConverter,
};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Directory that receives every artifact.
    pub output_dir: PathBuf,
    /// External raster conversion.
    pub raster: RasterConfig,
    /// Default style for callers that do not bring their own.
    pub style: StyleConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            raster: RasterConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

/// `[raster]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// When `false`, artifacts are vector-only.
    pub enabled: bool,
    /// Conversion program.
    pub program: String,
    /// Program arguments; `{input}` and `{output}` are substituted.
    pub args: Vec<String>,
    /// Per-conversion timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: DEFAULT_PROGRAM.to_owned(),
            args: ["-f", "png", "-o", "{output}", "{input}"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl RasterConfig {
    /// The conversion timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the configured converter.
    pub fn converter(&self) -> Arc<dyn RasterConverter> {
        if self.enabled {
            Arc::new(CommandRasterConverter::new(
                self.program.clone(),
                self.args.iter().cloned(),
            ))
        } else {
            Arc::new(NoopRasterConverter)
        }
    }
}

impl ChartConfig {
    /// Loads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ChartError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ChartError::Config("output_dir must not be empty".into()));
        }
        if self.style.width == 0 || self.style.height == 0 {
            return Err(ChartError::Config(format!(
                "style canvas must be non-empty, got {}x{}",
                self.style.width, self.style.height
            )));
        }
        if self.raster.enabled {
            if self.raster.program.trim().is_empty() {
                return Err(ChartError::Config("raster.program must not be empty".into()));
            }
            if !self.raster.args.iter().any(|a| a.contains("{output}")) {
                return Err(ChartError::Config(
                    "raster.args must reference {output}".into(),
                ));
            }
            if self.raster.timeout_secs == 0 {
                return Err(ChartError::Config("raster.timeout_secs must be positive".into()));
            }
        }
        Ok(())
    }
}
