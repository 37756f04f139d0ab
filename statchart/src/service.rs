// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-or-reuse orchestration.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use statchart_render::{ChartRenderer, Dataset, InvalidDataset, StyleConfig};
use tracing::{debug, info};

use crate::cache::{ArtifactRef, ChartCache};
use crate::config::ChartConfig;
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::key::{ChartKey, ChartKind};
use crate::raster::{DEFAULT_TIMEOUT, RasterConverter};

/// Serves chart artifacts, rendering only when the cached one is missing or stale.
///
/// For a given key and fingerprint, concurrent callers trigger exactly one render; the rest
/// wait for the per-key lock and receive the published artifact.
#[derive(Debug)]
pub struct ChartService {
    cache: ChartCache,
    converter: Arc<dyn RasterConverter>,
    renderer: ChartRenderer,
    raster_timeout: Duration,
    generations: AtomicU64,
}

impl ChartService {
    /// Builds a service from configuration, opening the output directory.
    pub fn new(config: &ChartConfig) -> Result<Self> {
        config.validate()?;
        let cache = ChartCache::open(&config.output_dir)?;
        Ok(Self::with_parts(cache, config.raster.converter())
            .with_raster_timeout(config.raster.timeout()))
    }

    /// Builds a service from an existing cache and converter.
    pub fn with_parts(cache: ChartCache, converter: Arc<dyn RasterConverter>) -> Self {
        Self {
            cache,
            converter,
            renderer: ChartRenderer::new(),
            raster_timeout: DEFAULT_TIMEOUT,
            generations: AtomicU64::new(0),
        }
    }

    /// Sets the raster conversion timeout.
    pub fn with_raster_timeout(mut self, timeout: Duration) -> Self {
        self.raster_timeout = timeout;
        self
    }

    /// The underlying cache.
    pub fn cache(&self) -> &ChartCache {
        &self.cache
    }

    /// Number of renders performed so far.
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    /// Returns the current artifact for `key`, rendering and publishing a new one if the
    /// cached artifact is missing or was built from different input.
    pub fn get_or_render(
        &self,
        key: &ChartKey,
        dataset: &Dataset,
        style: &StyleConfig,
    ) -> Result<ArtifactRef> {
        if ChartKind::of(dataset) != key.kind() {
            return Err(InvalidDataset::KindMismatch {
                expected: key.kind().slug(),
            }
            .into());
        }
        dataset.validate()?;
        let fingerprint = Fingerprint::compute(dataset, style);

        if let Some(artifact) = self.fresh(key, &fingerprint) {
            debug!(key = %key, fingerprint = %fingerprint.short(), "cache hit");
            return Ok(artifact);
        }

        let guard = self.cache.lock(key);
        if let Some(artifact) = self.fresh(key, &fingerprint) {
            debug!(key = %key, fingerprint = %fingerprint.short(), "published while waiting");
            return Ok(artifact);
        }

        let chart = self.renderer.render(dataset, style)?;
        let svg = chart.to_svg();
        // Dropping `staged` removes whatever the converter left behind if publishing never
        // moves it, including on unwind.
        let staged = self.cache.stage_raster(key)?;
        let (converted, raster) = self
            .converter
            .convert(svg.as_bytes(), &staged, self.raster_timeout)
            .into_parts();
        let artifact =
            self.cache
                .publish(&guard, key, &fingerprint, svg.as_bytes(), raster.as_deref())?;
        self.generations.fetch_add(1, Ordering::Relaxed);

        info!(
            key = %key,
            fingerprint = %fingerprint.short(),
            placeholder = chart.is_placeholder(),
            raster = converted && !artifact.raster_unavailable,
            "rendered chart"
        );
        Ok(artifact)
    }

    fn fresh(&self, key: &ChartKey, fingerprint: &Fingerprint) -> Option<ArtifactRef> {
        if self.cache.needs_generation(key, fingerprint) {
            return None;
        }
        self.cache
            .resolve(key)
            .filter(|artifact| artifact.fingerprint == *fingerprint)
    }
}
