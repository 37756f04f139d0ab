// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders a few sample charts into the configured output directory.
//!
//! ```text
//! statchart_demo [config.toml]
//! ```
//!
//! Run it twice: the second run is served entirely from the cache.

use std::path::PathBuf;

use statchart::{
    ArtifactRef, CategoryInput, ChartConfig, ChartKey, ChartService, Dataset, NumeralSet,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> statchart::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => ChartConfig::load(&path)?,
        None => ChartConfig::default(),
    };
    let service = ChartService::new(&config)?;
    let style = config
        .style
        .clone()
        .with_color("owner", "#4e79a7")
        .with_color("renter", "#f28e2b")
        .with_color("social", "#59a14f")
        .with_color("other", "#bab0ac");

    let tenure = Dataset::pie([
        ("owner", CategoryInput::new("Owner occupied", 412.0)),
        ("renter", CategoryInput::new("Private rent", 268.0)),
        ("social", CategoryInput::new("Social rent", 131.0)),
        ("other", CategoryInput::unlabeled(0.0)),
    ])?;

    let wards = Dataset::bar([
        (
            "Ward 1",
            vec![
                ("owner", CategoryInput::new("Owner occupied", 120.0)),
                ("renter", CategoryInput::new("Private rent", 45.0)),
            ],
        ),
        (
            "Ward 2",
            vec![
                ("renter", CategoryInput::new("Private rent", 88.0)),
                ("social", CategoryInput::new("Social rent", 61.0)),
            ],
        ),
        (
            "Ward 3",
            vec![
                ("owner", CategoryInput::new("Owner occupied", 70.0)),
                ("social", CategoryInput::new("Social rent", 0.0)),
            ],
        ),
    ])?;

    let empty = Dataset::pie(std::iter::empty::<(&str, CategoryInput)>())?;

    let artifacts = [
        service.get_or_render(&ChartKey::pie("housing", "tenure"), &tenure, &style)?,
        service.get_or_render(
            &ChartKey::pie("housing", "tenure localized"),
            &tenure,
            &style.clone().with_numeral_set(NumeralSet::Localized),
        )?,
        service.get_or_render(&ChartKey::bar("housing", "tenure by ward"), &wards, &style)?,
        service.get_or_render(&ChartKey::pie("housing", "vacancy"), &empty, &style)?,
    ];

    for artifact in &artifacts {
        report(artifact);
    }
    info!(
        generated = service.generations(),
        total = artifacts.len(),
        dir = %service.cache().dir().display(),
        "done"
    );
    Ok(())
}

fn report(artifact: &ArtifactRef) {
    let form = if artifact.raster_unavailable {
        "svg only"
    } else {
        "svg + png"
    };
    println!(
        "{:<40} {:<10} {}",
        artifact.chart_key.to_string(),
        form,
        artifact.preferred_path().display()
    );
}
