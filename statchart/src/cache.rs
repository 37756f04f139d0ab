// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! File-backed chart artifact cache.
//!
//! Each [`ChartKey`] owns one slot in the output directory:
//!
//! ```text
//! {dir}/{domain}_{category}_{kind}_chart.svg    vector artifact
//! {dir}/{domain}_{category}_{kind}_chart.png    raster artifact (optional)
//! {dir}/{domain}_{category}_{kind}_chart.json   manifest: fingerprint, created_at, digests
//! ```
//!
//! A new generation is fully staged in temporary siblings before anything live changes. The
//! swap then retracts the old manifest, renames the artifact files into place and writes the
//! new manifest last, all under the slot's record lock. A failure part-way leaves the key
//! absent, never pointing at a mix of two generations. The manifest records a SHA-256 per
//! file, so an [`ArtifactRef`] held across a later swap reads [`ChartError::Superseded`]
//! instead of newer bytes. Staleness is decided only by comparing fingerprints.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::{Builder, NamedTempFile, TempPath};
use tracing::{debug, warn};

use crate::error::{ChartError, Result};
use crate::fingerprint::Fingerprint;
use crate::key::ChartKey;

/// Sidecar record of the current artifact for one key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Manifest {
    fingerprint: Fingerprint,
    /// Unix milliseconds.
    created_at: u64,
    /// Hex SHA-256 of the SVG file.
    vector_sha256: String,
    /// Hex SHA-256 of the raster file, if one belongs to this generation.
    #[serde(default)]
    raster_sha256: Option<String>,
}

#[derive(Debug)]
enum Record {
    /// The manifest has not been read from disk yet.
    Unloaded,
    /// No usable artifact.
    Missing,
    Current(Manifest),
}

#[derive(Debug)]
struct Slot {
    /// Serializes render + publish for the key.
    publish: Arc<Mutex<()>>,
    record: Mutex<Record>,
}

impl Slot {
    fn new() -> Self {
        Self {
            publish: Arc::new(Mutex::new(())),
            record: Mutex::new(Record::Unloaded),
        }
    }
}

/// Proof that the per-key publish lock is held.
///
/// Obtained from [`ChartCache::lock`]; dropping it releases the lock.
pub struct KeyGuard {
    key: ChartKey,
    slot: Arc<Slot>,
    _held: ArcMutexGuard<RawMutex, ()>,
}

impl KeyGuard {
    /// The key this guard locks.
    pub fn key(&self) -> &ChartKey {
        &self.key
    }
}

impl fmt::Debug for KeyGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A reference to the current artifact of one chart key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactRef {
    /// The chart slot.
    pub chart_key: ChartKey,
    /// Fingerprint of the input this artifact was rendered from.
    pub fingerprint: Fingerprint,
    /// The SVG file.
    pub vector_path: PathBuf,
    /// The raster file, if conversion succeeded.
    pub raster_path: Option<PathBuf>,
    /// `true` when only the vector form exists.
    pub raster_unavailable: bool,
    /// Publication time in Unix milliseconds.
    pub created_at: u64,
    vector_sha256: String,
    raster_sha256: Option<String>,
}

impl ArtifactRef {
    /// The raster path when present, else the vector path.
    pub fn preferred_path(&self) -> &Path {
        self.raster_path.as_deref().unwrap_or(&self.vector_path)
    }

    /// Reads the SVG markup.
    ///
    /// Fails with [`ChartError::Superseded`] if a newer generation replaced the file since
    /// this reference was resolved.
    pub fn read_vector(&self) -> Result<String> {
        let bytes = read_verified(&self.vector_path, &self.vector_sha256)?;
        String::from_utf8(bytes).map_err(|e| {
            ChartError::io(&self.vector_path, io::Error::new(io::ErrorKind::InvalidData, e))
        })
    }

    /// Reads the raster bytes, if this generation has a raster.
    ///
    /// Same superseding rule as [`ArtifactRef::read_vector`].
    pub fn read_raster(&self) -> Result<Option<Vec<u8>>> {
        match (&self.raster_path, &self.raster_sha256) {
            (Some(path), Some(digest)) => read_verified(path, digest).map(Some),
            _ => Ok(None),
        }
    }
}

/// Fingerprint-addressed artifact store rooted at one output directory.
///
/// Safe to share between threads. Manifests are loaded lazily per key, so a cache opened on
/// an existing directory picks up artifacts published by an earlier process.
#[derive(Debug)]
pub struct ChartCache {
    dir: PathBuf,
    slots: Mutex<HashMap<ChartKey, Arc<Slot>>>,
}

impl ChartCache {
    /// Opens (creating if needed) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ChartError::io(&dir, e))?;
        Ok(Self {
            dir,
            slots: Mutex::new(HashMap::new()),
        })
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the vector artifact for `key`.
    pub fn vector_path(&self, key: &ChartKey) -> PathBuf {
        self.dir.join(format!("{}.svg", key.file_stem()))
    }

    /// Path of the raster artifact for `key`.
    pub fn raster_path(&self, key: &ChartKey) -> PathBuf {
        self.dir.join(format!("{}.png", key.file_stem()))
    }

    /// Creates an empty temporary file for a converter to write `key`'s raster into.
    ///
    /// The file lives in the cache directory so [`ChartCache::publish`] can rename it into
    /// place. It is deleted when the returned path drops, unless publishing moved it.
    pub fn stage_raster(&self, key: &ChartKey) -> Result<TempPath> {
        Builder::new()
            .prefix(&format!(".{}-", key.file_stem()))
            .suffix(".png")
            .tempfile_in(&self.dir)
            .map(NamedTempFile::into_temp_path)
            .map_err(|e| ChartError::io(&self.dir, e))
    }

    fn manifest_path(&self, key: &ChartKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }

    fn slot(&self, key: &ChartKey) -> Arc<Slot> {
        self.slots
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Slot::new()))
            .clone()
    }

    /// Acquires the per-key publish lock, blocking while another caller holds it.
    pub fn lock(&self, key: &ChartKey) -> KeyGuard {
        let slot = self.slot(key);
        let held = slot.publish.lock_arc();
        KeyGuard {
            key: key.clone(),
            slot,
            _held: held,
        }
    }

    /// Returns `true` if nothing usable is recorded for `key`, or it was rendered from a
    /// different fingerprint.
    pub fn needs_generation(&self, key: &ChartKey, fingerprint: &Fingerprint) -> bool {
        let slot = self.slot(key);
        let mut record = slot.record.lock();
        match self.current(key, &mut record) {
            Some(manifest) => manifest.fingerprint != *fingerprint,
            None => true,
        }
    }

    /// Returns the current artifact for `key`, if any.
    pub fn resolve(&self, key: &ChartKey) -> Option<ArtifactRef> {
        let slot = self.slot(key);
        let mut record = slot.record.lock();
        let manifest = self.current(key, &mut record)?;
        Some(self.artifact_ref(key, manifest))
    }

    /// Records a new artifact for `key`, superseding the current one.
    ///
    /// `raster` is the converter's output, normally a path from [`ChartCache::stage_raster`];
    /// it is moved to [`ChartCache::raster_path`]. Readers of `key` observe either the previous
    /// artifact or this one. If an error is returned after the swap began, `key` has no
    /// current artifact and the next request regenerates it.
    ///
    /// # Panics
    ///
    /// Panics if `guard` does not hold the lock for `key`.
    pub fn publish(
        &self,
        guard: &KeyGuard,
        key: &ChartKey,
        fingerprint: &Fingerprint,
        vector: &[u8],
        raster: Option<&Path>,
    ) -> Result<ArtifactRef> {
        let slot = self.slot(key);
        assert!(
            guard.key == *key && Arc::ptr_eq(&guard.slot, &slot),
            "publish for {key} without holding its lock (guard is for {})",
            guard.key
        );
        assert!(slot.publish.is_locked(), "publish lock for {key} is not held");

        let vector_path = self.vector_path(key);
        let raster_path = self.raster_path(key);
        let manifest_path = self.manifest_path(key);

        let staged_vector = stage(&self.dir, vector)?;
        let raster = raster.and_then(|src| match fs::read(src) {
            Ok(bytes) if !bytes.is_empty() => Some((src, sha256_hex(&bytes))),
            Ok(_) => {
                warn!(key = %key, from = %src.display(), "empty raster; keeping vector only");
                None
            }
            Err(e) => {
                warn!(
                    key = %key,
                    from = %src.display(),
                    error = %e,
                    "unreadable raster; keeping vector only"
                );
                None
            }
        });

        let mut record = slot.record.lock();
        remove_if_exists(&manifest_path)?;
        *record = Record::Missing;

        staged_vector
            .persist(&vector_path)
            .map_err(|e| ChartError::io(&vector_path, e.error))?;
        let raster_sha256 = match raster {
            Some((src, digest)) if src == raster_path => Some(digest),
            Some((src, digest)) => match fs::rename(src, &raster_path) {
                Ok(()) => Some(digest),
                Err(e) => {
                    warn!(
                        key = %key,
                        from = %src.display(),
                        error = %e,
                        "could not move raster into place; keeping vector only"
                    );
                    None
                }
            },
            None => None,
        };
        if raster_sha256.is_none() {
            remove_if_exists(&raster_path)?;
        }

        let manifest = Manifest {
            fingerprint: fingerprint.clone(),
            created_at: now_millis(),
            vector_sha256: sha256_hex(vector),
            raster_sha256,
        };
        let json = serde_json::to_vec_pretty(&manifest)?;
        stage(&self.dir, &json)?
            .persist(&manifest_path)
            .map_err(|e| ChartError::io(&manifest_path, e.error))?;

        let artifact = self.artifact_ref(key, &manifest);
        *record = Record::Current(manifest);
        debug!(key = %key, fingerprint = %fingerprint.short(), "published artifact");
        Ok(artifact)
    }

    /// Forgets the current artifact for `key` so the next request regenerates it.
    pub fn invalidate(&self, key: &ChartKey) -> Result<()> {
        let slot = self.slot(key);
        let mut record = slot.record.lock();
        remove_if_exists(&self.manifest_path(key))?;
        *record = Record::Missing;
        Ok(())
    }

    /// Loads the manifest if needed and checks that its files exist.
    fn current<'a>(&self, key: &ChartKey, record: &'a mut Record) -> Option<&'a Manifest> {
        if matches!(*record, Record::Unloaded) {
            *record = self.load(key);
        }
        if let Record::Current(manifest) = &*record {
            let vector = self.vector_path(key);
            let raster = self.raster_path(key);
            let missing = if !vector.exists() {
                Some(vector)
            } else if manifest.raster_sha256.is_some() && !raster.exists() {
                Some(raster)
            } else {
                None
            };
            if let Some(path) = missing {
                warn!(
                    key = %key,
                    path = %path.display(),
                    "artifact file missing; scheduling regeneration"
                );
                *record = Record::Missing;
            }
        }
        match record {
            Record::Current(manifest) => Some(&*manifest),
            _ => None,
        }
    }

    fn load(&self, key: &ChartKey) -> Record {
        let path = self.manifest_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Record::Missing,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable manifest");
                return Record::Missing;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(manifest) => Record::Current(manifest),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt manifest");
                Record::Missing
            }
        }
    }

    fn artifact_ref(&self, key: &ChartKey, manifest: &Manifest) -> ArtifactRef {
        ArtifactRef {
            chart_key: key.clone(),
            fingerprint: manifest.fingerprint.clone(),
            vector_path: self.vector_path(key),
            raster_path: manifest
                .raster_sha256
                .as_ref()
                .map(|_| self.raster_path(key)),
            raster_unavailable: manifest.raster_sha256.is_none(),
            created_at: manifest.created_at,
            vector_sha256: manifest.vector_sha256.clone(),
            raster_sha256: manifest.raster_sha256.clone(),
        }
    }
}

/// Writes `bytes` to a synced temporary file in `dir`, ready to be persisted.
fn stage(dir: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ChartError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| ChartError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ChartError::io(tmp.path(), e))?;
    Ok(tmp)
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn read_verified(path: &Path, sha256: &str) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| ChartError::io(path, e))?;
    if sha256_hex(&bytes) != sha256 {
        return Err(ChartError::Superseded {
            path: path.to_path_buf(),
        });
    }
    Ok(bytes)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ChartError::io(path, e)),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
