//! Connectivity metrics scoring proximity to a seed set
//!
//! Each engine turns a raw graph statistic into a per-node enrichment score
//! Sj: positive when the node is more strongly connected to the seeds than to
//! the rest of the network, negative otherwise.

pub mod betweenness;
pub mod mfpt;
pub mod shared_neighbors;
pub mod inverse_path;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::cache::ArtifactCache;
use crate::error::Result;
use crate::graph::CompressedGraph;
use crate::partition::SeedPartition;
use crate::progress::Progress;

/// Number of sources handled by one worker task. Partial sums are merged in
/// chunk order, which keeps results identical across thread counts.
pub const SOURCE_CHUNK: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Mean first passage time of a random walk
    Mfpt,
    /// Shortest-path betweenness restricted to seed sources
    Betweenness,
    /// Tanimoto overlap of neighborhoods
    SharedNeighbors,
    /// Reciprocal shortest-path distance
    InversePath,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Mfpt,
        Metric::Betweenness,
        Metric::SharedNeighbors,
        Metric::InversePath,
    ];

    /// Short name used in file names and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Metric::Mfpt => "mfpt",
            Metric::Betweenness => "bc",
            Metric::SharedNeighbors => "sn",
            Metric::InversePath => "isp",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown metric '{}' (expected mfpt, bc, sn or isp)", s))
    }
}

/// Sj score of every node for one metric, keyed by node identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMap {
    pub metric: Metric,
    pub scores: BTreeMap<String, f64>,
}

impl ScoreMap {
    /// Pair dense per-index scores with the graph's identifiers
    pub fn from_dense(metric: Metric, graph: &CompressedGraph, values: &[f64]) -> Self {
        let scores = values
            .iter()
            .enumerate()
            .map(|(idx, &value)| (graph.node_id(idx).to_string(), value))
            .collect();
        Self { metric, scores }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.scores.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(id, &score)| (id.as_str(), score))
    }
}

/// Everything an engine needs for one seed set
pub struct ScoringContext<'a> {
    pub graph: &'a CompressedGraph,
    pub partition: &'a SeedPartition,
    pub cache: &'a ArtifactCache,
    pub progress: &'a dyn Progress,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        graph: &'a CompressedGraph,
        partition: &'a SeedPartition,
        cache: &'a ArtifactCache,
        progress: &'a dyn Progress,
    ) -> Self {
        Self { graph, partition, cache, progress }
    }
}

/// Compute one metric's scores
pub fn run_metric(ctx: &ScoringContext<'_>, metric: Metric) -> Result<ScoreMap> {
    log::info!("Running {} for {} seeds", metric, ctx.partition.seed_count());
    let scores = match metric {
        Metric::Mfpt => mfpt::scores(ctx),
        Metric::Betweenness => betweenness::scores(ctx),
        Metric::SharedNeighbors => shared_neighbors::scores(ctx),
        Metric::InversePath => inverse_path::scores(ctx),
    }?;

    log::info!(
        "{} neighborhood size: {}",
        metric,
        crate::ranking::neighborhood_size(&scores)
    );
    Ok(scores)
}

/// Compute several metrics concurrently, returned in the requested order
pub fn run_metrics(ctx: &ScoringContext<'_>, metrics: &[Metric]) -> Result<Vec<ScoreMap>> {
    metrics
        .par_iter()
        .map(|&metric| run_metric(ctx, metric))
        .collect()
}

/// Sum per-source contribution vectors over `sources` in parallel.
///
/// `contribute(source, acc)` adds one source's contribution into `acc`
/// (length `node_count`). Progress is reported per finished chunk.
pub(crate) fn accumulate_sources<F>(
    metric: Metric,
    node_count: usize,
    sources: &[u32],
    progress: &dyn Progress,
    contribute: F,
) -> Vec<f64>
where
    F: Fn(usize, &mut [f64]) + Sync,
{
    let done = AtomicUsize::new(0);
    let total = sources.len();

    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCE_CHUNK)
        .map(|chunk| {
            let mut acc = vec![0.0; node_count];
            for &source in chunk {
                contribute(source as usize, &mut acc);
            }
            let finished = done.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
            progress.sources_processed(metric, finished, total);
            acc
        })
        .collect();

    let mut totals = vec![0.0; node_count];
    for partial in partials {
        for (total, value) in totals.iter_mut().zip(partial) {
            *total += value;
        }
    }
    totals
}

/// Enrichment of a node from its all/seed sums, shared by the shared
/// neighbors and inverse shortest path metrics:
/// `(seeds/|S| - comp/|C|) / (all/N)`. Zero when the all-sum is zero.
pub fn group_enrichment(
    all: f64,
    seeds: f64,
    seed_count: usize,
    complement_count: usize,
    node_count: usize,
) -> f64 {
    if all == 0.0 {
        return 0.0;
    }
    let comp = all - seeds;
    let num_seeds = seeds / seed_count as f64;
    let num_comp = comp / complement_count as f64;
    let denominator = all / node_count as f64;
    (num_seeds - num_comp) / denominator
}
