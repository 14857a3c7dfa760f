//! Disk-backed store for seed-independent intermediate results
//!
//! Artifacts live under `<root>/<graph fingerprint>/<name>.bin`. Because the
//! directory is keyed by the graph content, switching networks never serves
//! another network's artifacts. Blobs are bincode envelopes carrying a format
//! version and the node count they were computed for; anything that fails to
//! decode or has the wrong shape is treated as a miss and recomputed.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{ProximityError, Result};
use crate::graph::CompressedGraph;
use crate::progress::{CacheEvent, Progress};

/// Bumped whenever an artifact layout changes; older blobs become misses
const FORMAT_VERSION: u32 = 1;

/// Identity of a stored artifact: the dataset it belongs to and its name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub dataset: String,
    pub name: String,
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = &self.dataset[..self.dataset.len().min(12)];
        write!(f, "{}@{}", self.name, short)
    }
}

/// A cacheable intermediate that knows which graph size it belongs to
pub trait Artifact: Serialize + DeserializeOwned {
    fn fits(&self, node_count: usize) -> bool;
}

impl Artifact for Vec<f64> {
    fn fits(&self, node_count: usize) -> bool {
        self.len() == node_count
    }
}

impl Artifact for Vec<Vec<u32>> {
    fn fits(&self, node_count: usize) -> bool {
        self.len() == node_count
            && self.iter().flatten().all(|&n| (n as usize) < node_count)
    }
}

impl Artifact for Array2<f64> {
    fn fits(&self, node_count: usize) -> bool {
        self.dim() == (node_count, node_count)
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    format: u32,
    node_count: u64,
    payload: T,
}

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub stores: usize,
}

pub struct ArtifactCache {
    /// Dataset directory; `None` keeps nothing between runs
    dir: Option<PathBuf>,
    dataset: String,
    node_count: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
    stores: AtomicUsize,
}

impl ArtifactCache {
    /// Open the cache for `graph` under `root`
    pub fn open(root: impl AsRef<Path>, graph: &CompressedGraph) -> Self {
        let dataset = graph.fingerprint();
        let dir = root.as_ref().join(&dataset);
        Self::with_dir(Some(dir), dataset, graph.node_count)
    }

    /// A cache that never persists anything
    pub fn disabled(graph: &CompressedGraph) -> Self {
        Self::with_dir(None, graph.fingerprint(), graph.node_count)
    }

    fn with_dir(dir: Option<PathBuf>, dataset: String, node_count: usize) -> Self {
        Self {
            dir,
            dataset,
            node_count,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            stores: AtomicUsize::new(0),
        }
    }

    pub fn key(&self, name: &str) -> ArtifactKey {
        ArtifactKey {
            dataset: self.dataset.clone(),
            name: name.to_string(),
        }
    }

    /// Directory holding this dataset's artifacts
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{}.bin", name)))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
        }
    }

    /// Look up an artifact.
    ///
    /// Returns `Ok(None)` when nothing is stored and `CacheCorruption` when a
    /// blob exists but cannot be used for this graph.
    pub fn get<T: Artifact>(&self, name: &str) -> Result<Option<T>> {
        let path = match self.path_for(name) {
            Some(path) if path.is_file() => path,
            _ => return Ok(None),
        };

        let corrupt = |reason: String| ProximityError::CacheCorruption {
            key: self.key(name).to_string(),
            reason,
        };

        let file = File::open(&path).map_err(|e| corrupt(e.to_string()))?;
        let envelope: Envelope<T> = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| corrupt(e.to_string()))?;

        if envelope.format != FORMAT_VERSION {
            return Err(corrupt(format!("format version {}", envelope.format)));
        }
        if envelope.node_count != self.node_count as u64 || !envelope.payload.fits(self.node_count) {
            return Err(corrupt(format!(
                "computed for {} nodes, graph has {}",
                envelope.node_count, self.node_count
            )));
        }

        Ok(Some(envelope.payload))
    }

    /// Store an artifact. The blob is written to a temporary file in the
    /// dataset directory and renamed into place, so readers never see a
    /// partial write.
    pub fn put<T: Artifact>(&self, name: &str, artifact: &T) -> Result<()> {
        let (dir, path) = match (&self.dir, self.path_for(name)) {
            (Some(dir), Some(path)) => (dir, path),
            _ => return Ok(()),
        };

        fs::create_dir_all(dir)?;

        let envelope = Envelope {
            format: FORMAT_VERSION,
            node_count: self.node_count as u64,
            payload: artifact,
        };

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            bincode::serialize_into(&mut writer, &envelope)?;
            writer.flush()?;
        }
        tmp.persist(&path).map_err(|e| e.error)?;

        self.stores.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Return the stored artifact, or compute and store it.
    ///
    /// Concurrent misses on the same name may both compute; the last
    /// rename wins and both results are identical.
    pub fn get_or_compute<T, F>(&self, name: &str, progress: &dyn Progress, compute: F) -> Result<T>
    where
        T: Artifact,
        F: FnOnce() -> Result<T>,
    {
        let key = self.key(name);

        match self.get::<T>(name) {
            Ok(Some(artifact)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                progress.cache_event(&key, CacheEvent::Hit);
                return Ok(artifact);
            }
            Ok(None) => progress.cache_event(&key, CacheEvent::Miss),
            Err(ProximityError::CacheCorruption { reason, .. }) => {
                log::warn!("Discarding artifact {}: {}", key, reason);
                progress.cache_event(&key, CacheEvent::Corrupt);
            }
            Err(e) => return Err(e),
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let artifact = compute()?;

        match self.put(name, &artifact) {
            Ok(()) if self.dir.is_some() => progress.cache_event(&key, CacheEvent::Stored),
            Ok(()) => {}
            // Storing is an optimisation, the result is still valid
            Err(e) => log::warn!("Could not store artifact {}: {}", key, e),
        }

        Ok(artifact)
    }

    /// Remove every stored artifact of this dataset
    pub fn clear(&self) -> Result<()> {
        if let Some(dir) = &self.dir {
            if dir.exists() {
                fs::remove_dir_all(dir)?;
                log::info!("Cleared stored artifacts in {}", dir.display());
            }
        }
        Ok(())
    }
}
