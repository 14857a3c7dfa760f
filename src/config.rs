//! Configuration management for proximity scoring runs

use std::path::PathBuf;

use crate::metrics::Metric;

/// Settings of a scoring run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for stored seed-independent artifacts
    pub cache_dir: PathBuf,

    /// Directory for score files and the run summary
    pub output_dir: PathBuf,

    /// Metrics to compute
    pub metrics: Vec<Metric>,

    /// Sources between two progress lines
    pub progress_interval: usize,

    /// Worker threads (0 = all available cores)
    pub threads: usize,

    /// Reduce the network to its largest connected component first
    pub largest_component: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("stored_vals"),
            output_dir: PathBuf::from("results"),
            metrics: Metric::ALL.to_vec(),
            progress_interval: 500,
            threads: 0,
            largest_component: true,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        metrics: Vec<Metric>,
        threads: usize,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            output_dir: output_dir.into(),
            metrics,
            threads,
            ..Self::default()
        }
    }

    /// Number of worker threads to use
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get()
        }
    }
}
