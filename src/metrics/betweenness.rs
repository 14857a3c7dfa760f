//! Seed-restricted shortest-path betweenness

use std::collections::VecDeque;

use crate::error::Result;
use crate::graph::algorithms::UNREACHABLE;
use crate::graph::CompressedGraph;
use crate::metrics::{accumulate_sources, Metric, ScoreMap, ScoringContext};
use crate::progress::Progress;

/// Cache name of the all-sources betweenness vector
pub const ALL_CENTRALITIES: &str = "betweenness_all";

/// Add the dependencies of every node on shortest paths from `source` into
/// `betweenness` (Brandes accumulation; the source itself is excluded).
pub fn source_dependencies(graph: &CompressedGraph, source: usize, betweenness: &mut [f64]) {
    let n = graph.node_count;
    let mut dist = vec![UNREACHABLE; n];
    let mut sigma = vec![0.0f64; n];
    let mut delta = vec![0.0f64; n];
    let mut order = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    dist[source] = 0;
    sigma[source] = 1.0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        for &w in graph.neighbors(v) {
            let w = w as usize;
            if dist[w] == UNREACHABLE {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
            }
        }
    }

    // Predecessors of w are exactly its neighbors one level closer to the source
    for &w in order.iter().rev() {
        let coeff = (1.0 + delta[w]) / sigma[w];
        for &v in graph.neighbors(w) {
            let v = v as usize;
            if dist[v] + 1 == dist[w] {
                delta[v] += sigma[v] * coeff;
            }
        }
        if w != source {
            betweenness[w] += delta[w];
        }
    }
}

/// Unnormalized betweenness counting only shortest paths that start in
/// `sources`. Ordered pairs are counted, so an undirected path contributes
/// once per endpoint that is a source.
pub fn sub_betweenness(graph: &CompressedGraph, sources: &[u32], progress: &dyn Progress) -> Vec<f64> {
    accumulate_sources(
        Metric::Betweenness,
        graph.node_count,
        sources,
        progress,
        |source, acc| source_dependencies(graph, source, acc),
    )
}

/// Betweenness with every node as a source
pub fn all_source_betweenness(graph: &CompressedGraph, progress: &dyn Progress) -> Vec<f64> {
    let sources: Vec<u32> = (0..graph.node_count as u32).collect();
    sub_betweenness(graph, &sources, progress)
}

/// Per-source-pair share of a group's betweenness; an empty group
/// contributes nothing.
fn group_share(centrality: f64, group_size: usize, pairs: f64) -> f64 {
    if group_size == 0 {
        0.0
    } else {
        centrality / (group_size as f64 * pairs)
    }
}

/// Sj for one node from its all/seed betweenness
pub fn node_score(
    all: f64,
    seed: f64,
    is_seed: bool,
    seed_count: usize,
    complement_count: usize,
    node_count: usize,
) -> f64 {
    if all == 0.0 {
        return 0.0;
    }

    // A nonzero betweenness implies at least three nodes
    let pairs = (node_count - 2) as f64;
    let comp = all - seed;

    let denominator = all / ((node_count - 1) as f64 * pairs);
    let in_seed = group_share(seed, seed_count - usize::from(is_seed), pairs);
    let comp_val = group_share(comp, complement_count - usize::from(!is_seed), pairs);

    (in_seed - comp_val) / denominator
}

pub fn scores(ctx: &ScoringContext<'_>) -> Result<ScoreMap> {
    let graph = ctx.graph;
    let partition = ctx.partition;

    let all = ctx.cache.get_or_compute(ALL_CENTRALITIES, ctx.progress, || {
        log::info!("Computing betweenness over all {} sources", graph.node_count);
        Ok(all_source_betweenness(graph, ctx.progress))
    })?;

    log::info!("Computing betweenness over {} seed sources", partition.seed_count());
    let seed = sub_betweenness(graph, partition.seeds(), ctx.progress);

    let values: Vec<f64> = (0..graph.node_count)
        .map(|j| {
            node_score(
                all[j],
                seed[j],
                partition.is_seed(j),
                partition.seed_count(),
                partition.complement_count(),
                graph.node_count,
            )
        })
        .collect();

    Ok(ScoreMap::from_dense(Metric::Betweenness, graph, &values))
}
