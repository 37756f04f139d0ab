// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use statchart_render::{CategoryDatum, CategoryInput, Dataset, InvalidDataset, StyleConfig};
use tempfile::TempDir;

use crate::{
    ChartCache, ChartConfig, ChartError, ChartKey, ChartService, NoopRasterConverter,
    RasterConversionFailure, RasterConverter, RasterOutcome,
};

/// Counts conversions; optionally writes the vector bytes as the "raster".
#[derive(Debug, Default)]
struct CountingConverter {
    calls: AtomicUsize,
    succeed: bool,
    delay: Duration,
}

impl CountingConverter {
    fn succeeding() -> Self {
        Self {
            succeed: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RasterConverter for CountingConverter {
    fn convert(&self, vector: &[u8], target: &Path, _timeout: Duration) -> RasterOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        if !self.succeed {
            return RasterOutcome::Unavailable(RasterConversionFailure::ToolMissing);
        }
        match fs::write(target, vector) {
            Ok(()) => RasterOutcome::Converted(target.to_path_buf()),
            Err(e) => RasterOutcome::Unavailable(RasterConversionFailure::Io(e.to_string())),
        }
    }
}

/// Writes a bogus raster to its target, then unwinds as a cancelled generation would.
#[derive(Debug)]
struct AbortingConverter;

impl RasterConverter for AbortingConverter {
    fn convert(&self, _vector: &[u8], target: &Path, _timeout: Duration) -> RasterOutcome {
        fs::write(target, b"half-written").expect("write target");
        panic!("conversion aborted");
    }
}

/// Remembers every target it was asked to write.
#[derive(Debug, Default)]
struct RecordingConverter(Mutex<Vec<PathBuf>>);

impl RasterConverter for RecordingConverter {
    fn convert(&self, vector: &[u8], target: &Path, _timeout: Duration) -> RasterOutcome {
        self.0.lock().push(target.to_path_buf());
        match fs::write(target, vector) {
            Ok(()) => RasterOutcome::Converted(target.to_path_buf()),
            Err(e) => RasterOutcome::Unavailable(RasterConversionFailure::Io(e.to_string())),
        }
    }
}

fn service(dir: &TempDir, converter: Arc<dyn RasterConverter>) -> ChartService {
    let cache = ChartCache::open(dir.path()).expect("open cache");
    ChartService::with_parts(cache, converter)
}

fn pie(entries: &[(&str, f64)]) -> Dataset {
    Dataset::pie(
        entries
            .iter()
            .map(|(c, v)| (*c, CategoryInput::unlabeled(*v))),
    )
    .expect("valid pie")
}

#[test]
fn unchanged_input_renders_once() {
    let dir = TempDir::new().expect("tempdir");
    let converter = Arc::new(CountingConverter::default());
    let svc = service(&dir, converter.clone());
    let key = ChartKey::pie("housing", "tenure");
    let ds = pie(&[("A", 30.0), ("B", 70.0)]);
    let style = StyleConfig::default();

    let first = svc.get_or_render(&key, &ds, &style).expect("first");
    let second = svc.get_or_render(&key, &ds, &style).expect("second");

    assert_eq!(first, second);
    assert_eq!(svc.generations(), 1);
    assert_eq!(converter.calls(), 1);
    assert_eq!(
        first.vector_path,
        dir.path().join("housing_tenure_pie_chart.svg")
    );
}

#[test]
fn changed_value_regenerates_and_permutation_does_not() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, Arc::new(NoopRasterConverter));
    let key = ChartKey::pie("housing", "tenure");
    let style = StyleConfig::default();

    let a = svc
        .get_or_render(&key, &pie(&[("A", 30.0), ("B", 70.0)]), &style)
        .expect("a");
    let permuted = svc
        .get_or_render(&key, &pie(&[("B", 70.0), ("A", 30.0)]), &style)
        .expect("permuted");
    assert_eq!(a.fingerprint, permuted.fingerprint);
    assert_eq!(svc.generations(), 1);

    let changed = svc
        .get_or_render(&key, &pie(&[("A", 31.0), ("B", 70.0)]), &style)
        .expect("changed");
    assert_ne!(a.fingerprint, changed.fingerprint);
    assert_eq!(svc.generations(), 2);
    assert!(changed.read_vector().expect("svg").contains("A (31)"));

    let restyled = svc
        .get_or_render(
            &key,
            &pie(&[("A", 31.0), ("B", 70.0)]),
            &StyleConfig::default().with_color("A", "#4e79a7"),
        )
        .expect("restyled");
    assert_ne!(changed.fingerprint, restyled.fingerprint);
    assert_eq!(svc.generations(), 3);
}

#[test]
fn concurrent_callers_share_one_render() {
    const CALLERS: usize = 8;
    let dir = TempDir::new().expect("tempdir");
    let converter = Arc::new(CountingConverter {
        delay: Duration::from_millis(50),
        ..CountingConverter::succeeding()
    });
    let svc = service(&dir, converter.clone());
    let key = ChartKey::bar("census", "wards");
    let ds = Dataset::bar([
        ("ward1", vec![("A", CategoryInput::unlabeled(10.0))]),
        ("ward2", vec![("B", CategoryInput::unlabeled(5.0))]),
    ])
    .expect("valid bar");
    let style = StyleConfig::default();
    let barrier = Barrier::new(CALLERS);

    let artifacts: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    svc.get_or_render(&key, &ds, &style)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("caller thread").expect("artifact"))
            .collect()
    });

    assert_eq!(svc.generations(), 1);
    assert_eq!(converter.calls(), 1);
    assert!(artifacts.iter().all(|a| *a == artifacts[0]));
    assert!(artifacts[0].preferred_path().exists());
}

#[test]
fn different_keys_render_independently() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, Arc::new(NoopRasterConverter));
    let ds = pie(&[("A", 1.0)]);
    let style = StyleConfig::default();

    thread::scope(|s| {
        for category in ["a", "b", "c", "d"] {
            let (svc, ds, style) = (&svc, &ds, &style);
            s.spawn(move || {
                svc.get_or_render(&ChartKey::pie("d", category), ds, style)
                    .expect("artifact")
            });
        }
    });

    assert_eq!(svc.generations(), 4);
}

#[test]
fn unavailable_raster_degrades_to_vector() {
    let dir = TempDir::new().expect("tempdir");
    let converter = Arc::new(CountingConverter::default());
    let svc = service(&dir, converter.clone());
    let key = ChartKey::pie("d", "c");

    let artifact = svc
        .get_or_render(&key, &pie(&[("A", 1.0)]), &StyleConfig::default())
        .expect("vector-only artifact");

    assert!(artifact.raster_unavailable);
    assert!(artifact.raster_path.is_none());
    assert_eq!(artifact.preferred_path(), artifact.vector_path.as_path());
    assert!(artifact.read_vector().expect("svg").starts_with("<svg"));
    assert!(!svc.cache().raster_path(&key).exists());
}

#[test]
fn successful_raster_is_preferred() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, Arc::new(CountingConverter::succeeding()));
    let key = ChartKey::pie("d", "c");

    let artifact = svc
        .get_or_render(&key, &pie(&[("A", 1.0)]), &StyleConfig::default())
        .expect("artifact");

    assert!(!artifact.raster_unavailable);
    let expected = dir.path().join("d_c_pie_chart.png");
    assert_eq!(artifact.raster_path.as_deref(), Some(expected.as_path()));
    assert_eq!(artifact.preferred_path(), svc.cache().raster_path(&key));
}

#[test]
fn missing_artifact_file_self_heals() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, Arc::new(CountingConverter::succeeding()));
    let key = ChartKey::pie("d", "c");
    let ds = pie(&[("A", 1.0)]);
    let style = StyleConfig::default();

    let first = svc.get_or_render(&key, &ds, &style).expect("first");
    fs::remove_file(first.raster_path.as_ref().expect("raster")).expect("remove raster");

    let healed = svc.get_or_render(&key, &ds, &style).expect("healed");
    assert_eq!(svc.generations(), 2);
    assert!(healed.preferred_path().exists());
    assert_eq!(healed.fingerprint, first.fingerprint);
}

#[test]
fn artifacts_survive_a_restart() {
    let dir = TempDir::new().expect("tempdir");
    let key = ChartKey::pie("d", "c");
    let ds = pie(&[("A", 1.0)]);
    let style = StyleConfig::default();

    let first = service(&dir, Arc::new(NoopRasterConverter))
        .get_or_render(&key, &ds, &style)
        .expect("first");

    let restarted = service(&dir, Arc::new(NoopRasterConverter));
    let again = restarted.get_or_render(&key, &ds, &style).expect("again");
    assert_eq!(restarted.generations(), 0);
    assert_eq!(first, again);
}

#[test]
fn blank_dataset_publishes_the_placeholder() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, Arc::new(NoopRasterConverter));
    let style = StyleConfig::new(300, 200);

    let artifact = svc
        .get_or_render(&ChartKey::pie("d", "c"), &pie(&[("A", 0.0), ("B", 0.0)]), &style)
        .expect("placeholder");
    let svg = artifact.read_vector().expect("svg");
    assert!(svg.contains(r#"width="300" height="200" viewBox="0 0 300 200""#));
    assert!(svg.contains("No data"));
}

#[test]
fn kind_mismatch_and_bad_data_fail_fast() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, Arc::new(NoopRasterConverter));
    let style = StyleConfig::default();

    let err = svc
        .get_or_render(&ChartKey::bar("d", "c"), &pie(&[("A", 1.0)]), &style)
        .expect_err("pie data under a bar key");
    assert!(matches!(
        err,
        ChartError::InvalidDataset(InvalidDataset::KindMismatch { expected: "bar" })
    ));

    let negative = Dataset::Pie(vec![CategoryDatum {
        code: "A".into(),
        label: "A".into(),
        value: -3.0,
        percentage: 0.0,
    }]);
    let err = svc
        .get_or_render(&ChartKey::pie("d", "c"), &negative, &style)
        .expect_err("negative value");
    assert!(matches!(
        err,
        ChartError::InvalidDataset(InvalidDataset::NegativeValue { .. })
    ));
    assert_eq!(svc.generations(), 0);
}

#[test]
fn service_from_config_writes_into_output_dir() {
    let dir = TempDir::new().expect("tempdir");
    let config = ChartConfig::from_toml_str(&format!(
        "output_dir = {:?}\n[raster]\nenabled = false\n",
        dir.path().join("out")
    ))
    .expect("config");
    let svc = ChartService::new(&config).expect("service");

    let artifact = svc
        .get_or_render(&ChartKey::pie("d", "c"), &pie(&[("A", 1.0)]), &config.style)
        .expect("artifact");
    assert!(artifact.vector_path.starts_with(dir.path().join("out")));
    assert!(artifact.raster_unavailable);
}

#[test]
fn aborted_generation_leaves_the_previous_artifact_intact() {
    let dir = TempDir::new().expect("tempdir");
    let key = ChartKey::pie("d", "c");
    let style = StyleConfig::default();

    let first = service(&dir, Arc::new(CountingConverter::succeeding()))
        .get_or_render(&key, &pie(&[("A", 1.0)]), &style)
        .expect("first");
    let svg = first.read_vector().expect("svg");
    let png = first.read_raster().expect("png").expect("raster present");

    let aborting = service(&dir, Arc::new(AbortingConverter));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        aborting.get_or_render(&key, &pie(&[("A", 5.0)]), &style)
    }));
    assert!(outcome.is_err());

    let current = aborting.cache().resolve(&key).expect("still current");
    assert_eq!(current, first);
    assert_eq!(current.read_vector().expect("svg"), svg);
    assert_eq!(current.read_raster().expect("png"), Some(png));
    assert!(!aborting.cache().needs_generation(&key, &first.fingerprint));

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        ["d_c_pie_chart.json", "d_c_pie_chart.png", "d_c_pie_chart.svg"]
    );

    // The lock was released by the unwind; the next request renders normally.
    let healed = service(&dir, Arc::new(NoopRasterConverter))
        .get_or_render(&key, &pie(&[("A", 5.0)]), &style)
        .expect("after abort");
    assert!(healed.read_vector().expect("svg").contains("A (5)"));
}

#[test]
fn converter_writes_only_to_a_staging_path() {
    let dir = TempDir::new().expect("tempdir");
    let recorder = Arc::new(RecordingConverter::default());
    let svc = service(&dir, recorder.clone());
    let key = ChartKey::pie("d", "c");
    let artifact = svc
        .get_or_render(&key, &pie(&[("A", 1.0)]), &StyleConfig::default())
        .expect("artifact");

    let targets = recorder.0.lock().clone();
    assert_eq!(targets.len(), 1);
    assert_ne!(targets[0], svc.cache().raster_path(&key));
    assert!(targets[0].starts_with(dir.path()));
    assert!(!targets[0].exists());
    assert_eq!(artifact.raster_path, Some(svc.cache().raster_path(&key)));
}
