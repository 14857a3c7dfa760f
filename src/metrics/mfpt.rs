//! Mean first passage time of an unweighted random walk
//!
//! Uses the Kemeny–Snell fundamental matrix `B = (K - A + K·J)^-1`, where `K`
//! is the diagonal degree matrix and `J` the all-ones matrix. The expected
//! number of steps from `i` to first reach `j` is then `T·(B[j,j] - B[i,j])`
//! with `T` the sum of all adjacency entries.

use nalgebra::DMatrix;
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::{ProximityError, Result};
use crate::graph::algorithms::{bfs_distances, UNREACHABLE};
use crate::graph::CompressedGraph;
use crate::metrics::{Metric, ScoreMap, ScoringContext};
use crate::progress::Progress;

pub const FUNDAMENTAL_MATRIX: &str = "mfpt_fundamental";
pub const MFPT_MATRIX: &str = "mfpt_matrix";

/// Build `K - A + K·J` for the graph
fn kemeny_snell_matrix(graph: &CompressedGraph) -> DMatrix<f64> {
    let n = graph.node_count;
    let mut matrix = DMatrix::zeros(n, n);

    for i in 0..n {
        let degree = graph.degree(i) as f64;
        matrix.row_mut(i).fill(degree);
        matrix[(i, i)] += degree;
        for &j in graph.neighbors(i) {
            matrix[(i, j as usize)] -= 1.0;
        }
    }

    matrix
}

/// LU inverse of a square matrix
pub fn invert(matrix: DMatrix<f64>) -> Result<DMatrix<f64>> {
    matrix.lu().try_inverse().ok_or(ProximityError::SingularMatrix)
}

/// Fundamental matrix `(K - A + K·J)^-1`
pub fn fundamental_matrix(graph: &CompressedGraph) -> Result<Array2<f64>> {
    ensure_connected(graph)?;

    let n = graph.node_count;
    log::info!("Inverting {}x{} fundamental matrix", n, n);
    let inverse = invert(kemeny_snell_matrix(graph))?;

    Ok(Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)]))
}

/// Mean first passage times from a fundamental matrix.
/// `mfpt[[i, j]]` is the expected number of steps from i to first reach j.
pub fn passage_times(graph: &CompressedGraph, fundamental: &Array2<f64>) -> Array2<f64> {
    let n = graph.node_count;
    let total = graph.edges.len() as f64;
    let diag = fundamental.diag().to_owned();
    Array2::from_shape_fn((n, n), |(i, j)| total * (diag[j] - fundamental[[i, j]]))
}

/// Full mean first passage time matrix
pub fn mfpt_matrix(graph: &CompressedGraph) -> Result<Array2<f64>> {
    let fundamental = fundamental_matrix(graph)?;
    Ok(passage_times(graph, &fundamental))
}

fn ensure_connected(graph: &CompressedGraph) -> Result<()> {
    if graph.is_empty() {
        return Err(ProximityError::EmptyGraph);
    }
    let dist = bfs_distances(graph, 0);
    match dist.iter().position(|&d| d == UNREACHABLE) {
        Some(unreached) => Err(ProximityError::DisconnectedGraph {
            from: graph.node_id(0).to_string(),
            to: graph.node_id(unreached).to_string(),
        }),
        None => Ok(()),
    }
}

fn mean_over(column: &ndarray::ArrayView1<'_, f64>, rows: &[u32]) -> f64 {
    rows.iter().map(|&i| column[i as usize]).sum::<f64>() / rows.len() as f64
}

/// Load or build the passage time matrix through the artifact cache
fn cached_matrix(ctx: &ScoringContext<'_>) -> Result<Array2<f64>> {
    let graph = ctx.graph;
    let progress: &dyn Progress = ctx.progress;
    ctx.cache.get_or_compute(MFPT_MATRIX, progress, || {
        let fundamental = ctx
            .cache
            .get_or_compute(FUNDAMENTAL_MATRIX, progress, || fundamental_matrix(graph))?;
        Ok(passage_times(graph, &fundamental))
    })
}

pub fn scores(ctx: &ScoringContext<'_>) -> Result<ScoreMap> {
    let graph = ctx.graph;
    let partition = ctx.partition;
    let mfpt = cached_matrix(ctx)?;
    let n = graph.node_count;

    let values: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|j| {
            let column = mfpt.column(j);
            let denominator = column.sum() / n as f64;
            if denominator == 0.0 {
                return 0.0;
            }
            let in_set = mean_over(&column, partition.seeds());
            let complement = mean_over(&column, partition.complement());
            // Shorter passage from the seeds means closer, hence the order
            (complement - in_set) / denominator
        })
        .collect();

    ctx.progress.sources_processed(Metric::Mfpt, n, n);
    Ok(ScoreMap::from_dense(Metric::Mfpt, graph, &values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ArtifactCache;
    use crate::graph::GraphBuilder;
    use crate::metrics::test_graphs::*;
    use crate::partition::SeedPartition;
    use crate::progress::NoProgress;

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = DMatrix::from_row_slice(3, 3, &[4.0, 7.0, 2.0, 3.0, 6.0, 1.0, 2.0, 5.0, 3.0]);
        let product = &m * invert(m.clone()).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_close(product[(i, j)], if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(matches!(invert(m), Err(ProximityError::SingularMatrix)));
    }

    #[test]
    fn kemeny_constant_is_the_same_from_every_start() {
        let nodes = 120;
        let mut builder = GraphBuilder::with_capacity(nodes);
        let name = |i: usize| format!("P{:04}", i);
        for i in 0..nodes {
            builder.add_edge(&name(i), &name((i + 1) % nodes));
            builder.add_edge(&name(i), &name((i * 37 + 11) % nodes));
        }
        let graph = builder.build().unwrap();
        let mfpt = mfpt_matrix(&graph).unwrap();

        let total = graph.edges.len() as f64;
        let kemeny = |i: usize| {
            (0..graph.node_count)
                .map(|j| graph.degree(j) as f64 / total * mfpt[[i, j]])
                .sum::<f64>()
        };
        let reference = kemeny(0);
        for i in 1..graph.node_count {
            assert!((kemeny(i) - reference).abs() < 1e-6 * reference);
        }
    }

    #[test]
    fn path_passage_times() {
        let graph = path5();
        let mfpt = mfpt_matrix(&graph).unwrap();

        assert_close(mfpt[[0, 1]], 1.0);
        assert_close(mfpt[[2, 1]], 5.0);
        assert_close(mfpt[[0, 4]], 16.0);
        assert_close(mfpt[[4, 0]], 16.0);
        assert_close(mfpt[[1, 0]], 7.0);
        for i in 0..5 {
            assert_close(mfpt[[i, i]], 0.0);
        }
    }

    #[test]
    fn star_passage_times() {
        let graph = star();
        let hub = graph.index_of("H").unwrap() as usize;
        let leaf = graph.index_of("L2").unwrap() as usize;
        let other = graph.index_of("L3").unwrap() as usize;
        let mfpt = mfpt_matrix(&graph).unwrap();

        assert_close(mfpt[[leaf, hub]], 1.0);
        assert_close(mfpt[[hub, leaf]], 5.0);
        assert_close(mfpt[[other, leaf]], 6.0);
    }

    #[test]
    fn path_scores_follow_closer_is_positive() {
        let graph = path5();
        let partition = SeedPartition::new(&graph, &["A"]).unwrap();
        let cache = ArtifactCache::disabled(&graph);
        let scores = scores(&ScoringContext::new(&graph, &partition, &cache, &NoProgress)).unwrap();

        assert_close(scores.get("B").unwrap(), 4.5 / 4.6);
        assert_close(scores.get("E").unwrap(), -0.75);
    }

    #[test]
    fn disconnected_graph_is_reported() {
        let mut builder = GraphBuilder::with_capacity(4);
        builder.add_edge("a", "b");
        builder.add_edge("c", "d");
        let graph = builder.build().unwrap();

        assert!(matches!(
            mfpt_matrix(&graph),
            Err(ProximityError::DisconnectedGraph { .. })
        ));
    }
}
