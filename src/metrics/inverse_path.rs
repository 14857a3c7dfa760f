//! Inverse shortest-path distance as a proximity measure

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::{ProximityError, Result};
use crate::graph::algorithms::{bfs_distances, UNREACHABLE};
use crate::graph::CompressedGraph;
use crate::metrics::{group_enrichment, Metric, ScoreMap, ScoringContext, SOURCE_CHUNK};
use crate::progress::Progress;

pub const ISP_SUMS: &str = "isp_all";

/// `1/d(source, i)` for every node, 0 at the source itself
pub fn inverse_distances(graph: &CompressedGraph, source: usize) -> Result<Vec<f64>> {
    bfs_distances(graph, source)
        .into_iter()
        .enumerate()
        .map(|(node, d)| match d {
            0 => Ok(0.0),
            UNREACHABLE => Err(ProximityError::DisconnectedGraph {
                from: graph.node_id(source).to_string(),
                to: graph.node_id(node).to_string(),
            }),
            d => Ok(1.0 / d as f64),
        })
        .collect()
}

/// `isp_all[j]`: sum of 1/d(i, j) over all i != j
pub fn inverse_path_sums(graph: &CompressedGraph, progress: &dyn Progress) -> Result<Vec<f64>> {
    let n = graph.node_count;
    let targets: Vec<u32> = (0..n as u32).collect();
    let done = AtomicUsize::new(0);

    // Distances are symmetric, so a BFS from j yields every d(i, j)
    targets
        .par_chunks(SOURCE_CHUNK)
        .flat_map_iter(|chunk| {
            let sums: Vec<Result<f64>> = chunk
                .iter()
                .map(|&j| inverse_distances(graph, j as usize).map(|row| row.iter().sum::<f64>()))
                .collect();
            let finished = done.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
            progress.sources_processed(Metric::InversePath, finished, n);
            sums
        })
        .collect()
}

/// `isp_seeds[j]`: sum of 1/d(i, j) over seeds i != j
pub fn seed_inverse_path_sums(graph: &CompressedGraph, seeds: &[u32]) -> Result<Vec<f64>> {
    let rows = seeds
        .par_iter()
        .map(|&seed| inverse_distances(graph, seed as usize))
        .collect::<Result<Vec<_>>>()?;

    let mut sums = vec![0.0; graph.node_count];
    for row in rows {
        for (sum, value) in sums.iter_mut().zip(row) {
            *sum += value;
        }
    }
    Ok(sums)
}

pub fn scores(ctx: &ScoringContext<'_>) -> Result<ScoreMap> {
    let graph = ctx.graph;
    let partition = ctx.partition;

    let all = ctx.cache.get_or_compute(ISP_SUMS, ctx.progress, || {
        log::info!("Computing inverse shortest path sums for {} nodes", graph.node_count);
        inverse_path_sums(graph, ctx.progress)
    })?;
    let seeds = seed_inverse_path_sums(graph, partition.seeds())?;

    let values: Vec<f64> = all
        .iter()
        .zip(&seeds)
        .map(|(&all, &seed)| {
            group_enrichment(
                all,
                seed,
                partition.seed_count(),
                partition.complement_count(),
                graph.node_count,
            )
        })
        .collect();

    Ok(ScoreMap::from_dense(Metric::InversePath, graph, &values))
}
