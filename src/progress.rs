//! Progress reporting hooks for long-running computations

use crate::cache::ArtifactKey;
use crate::metrics::Metric;

/// What happened when an artifact was looked up or written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Hit,
    Miss,
    Stored,
    /// The blob existed but could not be used; it will be recomputed
    Corrupt,
}

/// Observer invoked by the engines and the artifact cache.
///
/// Implementations must be cheap; `sources_processed` is called from worker
/// threads once per finished batch of sources.
pub trait Progress: Send + Sync {
    fn sources_processed(&self, metric: Metric, done: usize, total: usize);

    fn cache_event(&self, key: &ArtifactKey, event: CacheEvent);
}

/// Reports through the `log` facade
pub struct LogProgress {
    /// Minimum number of sources between two progress lines
    pub every: usize,
}

impl Default for LogProgress {
    fn default() -> Self {
        Self { every: 500 }
    }
}

impl Progress for LogProgress {
    fn sources_processed(&self, metric: Metric, done: usize, total: usize) {
        let every = self.every.max(1);
        // Batches rarely land on a multiple, so report on crossing one
        if done == total || done % every < crate::metrics::SOURCE_CHUNK.min(every) {
            log::debug!("{}: {}/{} sources processed", metric, done, total);
        }
    }

    fn cache_event(&self, key: &ArtifactKey, event: CacheEvent) {
        match event {
            CacheEvent::Hit => log::info!("Loaded stored artifact {}", key),
            CacheEvent::Miss => log::info!("No stored artifact {}, computing", key),
            CacheEvent::Stored => log::info!("Stored artifact {}", key),
            CacheEvent::Corrupt => log::warn!("Stored artifact {} is unusable, recomputing", key),
        }
    }
}

/// Discards all events
pub struct NoProgress;

impl Progress for NoProgress {
    fn sources_processed(&self, _metric: Metric, _done: usize, _total: usize) {}

    fn cache_event(&self, _key: &ArtifactKey, _event: CacheEvent) {}
}
