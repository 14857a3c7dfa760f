//! Neighborhood overlap (Tanimoto coefficient) between node pairs

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::Result;
use crate::graph::CompressedGraph;
use crate::metrics::{group_enrichment, Metric, ScoreMap, ScoringContext, SOURCE_CHUNK};
use crate::progress::Progress;

pub const NEIGHBORS: &str = "sn_neighbors";
pub const TANIMOTO_SUMS: &str = "sn_tanimoto_all";

/// Open neighborhood of every node, as sorted index lists
pub fn neighbor_lists(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    (0..graph.node_count)
        .map(|node| graph.neighbors(node).to_vec())
        .collect()
}

/// |a ∩ b| / |a ∪ b| for sorted neighbor lists; 0 when both are empty
pub fn tanimoto(a: &[u32], b: &[u32]) -> f64 {
    let (mut i, mut j, mut shared) = (0, 0, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }

    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Sum of Tc(i, j) over all i != j, visiting only nodes two hops from j
/// (every other pair shares no neighbor). `stamp` marks visited nodes.
fn two_hop_sum(neighbors: &[Vec<u32>], j: u32, stamp: &mut [u32]) -> f64 {
    let mut sum = 0.0;
    for &k in &neighbors[j as usize] {
        for &i in &neighbors[k as usize] {
            if i != j && stamp[i as usize] != j {
                stamp[i as usize] = j;
                sum += tanimoto(&neighbors[i as usize], &neighbors[j as usize]);
            }
        }
    }
    sum
}

/// `Tc_all[j]` for every node
pub fn tanimoto_sums(neighbors: &[Vec<u32>], progress: &dyn Progress) -> Vec<f64> {
    let n = neighbors.len();
    let targets: Vec<u32> = (0..n as u32).collect();
    let done = AtomicUsize::new(0);

    targets
        .par_chunks(SOURCE_CHUNK)
        .flat_map_iter(|chunk| {
            let mut stamp = vec![u32::MAX; n];
            let sums: Vec<f64> = chunk
                .iter()
                .map(|&j| two_hop_sum(neighbors, j, &mut stamp))
                .collect();
            let finished = done.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
            progress.sources_processed(Metric::SharedNeighbors, finished, n);
            sums
        })
        .collect()
}

/// `Tc_seeds[j]`: sum of Tc(i, j) over seeds i != j
pub fn seed_tanimoto_sums(neighbors: &[Vec<u32>], seeds: &[u32]) -> Vec<f64> {
    (0..neighbors.len() as u32)
        .into_par_iter()
        .map(|j| {
            seeds
                .iter()
                .filter(|&&i| i != j)
                .map(|&i| tanimoto(&neighbors[i as usize], &neighbors[j as usize]))
                .sum::<f64>()
        })
        .collect()
}

pub fn scores(ctx: &ScoringContext<'_>) -> Result<ScoreMap> {
    let graph = ctx.graph;
    let partition = ctx.partition;

    let neighbors: Vec<Vec<u32>> = ctx
        .cache
        .get_or_compute(NEIGHBORS, ctx.progress, || Ok(neighbor_lists(graph)))?;
    let all = ctx.cache.get_or_compute(TANIMOTO_SUMS, ctx.progress, || {
        log::info!("Computing Tanimoto sums for {} nodes", graph.node_count);
        Ok(tanimoto_sums(&neighbors, ctx.progress))
    })?;

    let seeds = seed_tanimoto_sums(&neighbors, partition.seeds());

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

    Ok(ScoreMap::from_dense(Metric::SharedNeighbors, graph, &values))
}
