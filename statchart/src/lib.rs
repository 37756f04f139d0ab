// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached pie and stacked-bar chart artifacts for category statistics.
//!
//! [`ChartService::get_or_render`] is the entry point: it fingerprints a [`Dataset`] together
//! with its [`StyleConfig`], renders through [`statchart_render`] only when the cached artifact
//! for the [`ChartKey`] is missing or stale, attempts a raster conversion, and publishes the
//! result atomically into the output directory.
//!
//! ```no_run
//! use statchart::{CategoryInput, ChartConfig, ChartKey, ChartService, Dataset};
//!
//! # fn main() -> statchart::Result<()> {
//! let config = ChartConfig::default();
//! let service = ChartService::new(&config)?;
//! let dataset = Dataset::pie([
//!     ("A", CategoryInput::new("Owner", 30.0)),
//!     ("B", CategoryInput::new("Renter", 70.0)),
//! ])?;
//! let key = ChartKey::pie("housing", "tenure");
//! let artifact = service.get_or_render(&key, &dataset, &config.style)?;
//! println!("{}", artifact.preferred_path().display());
//! # Ok(())
//! # }
//! ```
//!
//! Raster conversion never fails a request: if the tool fails for any reason the
//! artifact is vector-only and [`ArtifactRef::raster_unavailable`] is set.

mod cache;
mod config;
mod error;
mod fingerprint;
mod key;
mod raster;
mod service;
#[cfg(test)]
mod service_tests;

pub use cache::{ArtifactRef, ChartCache, KeyGuard};
pub use config::{ChartConfig, RasterConfig};
pub use error::{ChartError, Result};
pub use fingerprint::Fingerprint;
pub use key::{ChartKey, ChartKind};
pub use raster::{
    CommandRasterConverter, DEFAULT_PROGRAM, DEFAULT_TIMEOUT, NoopRasterConverter,
    RasterConversionFailure, RasterConverter, RasterOutcome,
};
pub use service::ChartService;

pub use statchart_render::{
    CategoryDatum, CategoryInput, Dataset, Group, InvalidDataset, NumeralSet, StyleConfig,
};
