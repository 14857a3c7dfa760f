//! End-to-end scoring over small networks

use std::fs;
use std::path::Path;

use netprox::cache::CacheStats;
use netprox::data;
use netprox::metrics::{self, Metric, ScoreMap, ScoringContext};
use netprox::progress::NoProgress;
use netprox::storage;
use netprox::{ArtifactCache, CompressedGraph, GraphBuilder, ProximityError, SeedPartition};
use tempfile::TempDir;

fn path_network(dir: &Path) -> CompressedGraph {
    let path = dir.join("path.tsv");
    fs::write(&path, "A\tB\nB\tC\nC\tD\nD\tE\n").unwrap();
    data::load_edge_list(&path).unwrap()
}

/// Deterministic pseudo-random connected network: a ring plus chords
fn ring_with_chords(nodes: usize, chords: usize) -> CompressedGraph {
    let mut builder = GraphBuilder::with_capacity(nodes);
    let name = |i: usize| format!("ENSP{:05}", i);
    for i in 0..nodes {
        builder.add_edge(&name(i), &name((i + 1) % nodes));
    }
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    for _ in 0..chords {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let a = (state >> 33) as usize % nodes;
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let b = (state >> 33) as usize % nodes;
        builder.add_edge(&name(a), &name(b));
    }
    builder.build().unwrap()
}

fn run_all(graph: &CompressedGraph, partition: &SeedPartition, cache: &ArtifactCache) -> Vec<ScoreMap> {
    let ctx = ScoringContext::new(graph, partition, cache, &NoProgress);
    metrics::run_metrics(&ctx, &Metric::ALL).unwrap()
}

fn assert_bitwise_equal(a: &ScoreMap, b: &ScoreMap) {
    assert_eq!(a.metric, b.metric);
    assert_eq!(a.len(), b.len());
    for ((id_a, score_a), (id_b, score_b)) in a.iter().zip(b.iter()) {
        assert_eq!(id_a, id_b);
        assert_eq!(score_a.to_bits(), score_b.to_bits(), "{} differs for {}", a.metric, id_a);
    }
}

#[test]
fn path_with_end_seed() {
    let tmp = TempDir::new().unwrap();
    let graph = path_network(tmp.path());
    let partition = SeedPartition::new(&graph, &["A"]).unwrap();
    let cache = ArtifactCache::open(tmp.path().join("cache"), &graph);

    let all = netprox::metrics::betweenness::all_source_betweenness(&graph, &NoProgress);
    let idx = |id: &str| graph.index_of(id).unwrap() as usize;
    assert!(all[idx("C")] > all[idx("A")]);
    assert!(all[idx("C")] > all[idx("E")]);

    let results = run_all(&graph, &partition, &cache);
    let isp = results.iter().find(|s| s.metric == Metric::InversePath).unwrap();
    assert!(isp.get("B").unwrap() > 0.0);
    assert!(isp.get("E").unwrap() < 0.0);

    // Reached sooner from the seed than from the rest, so positive
    let mfpt = results.iter().find(|s| s.metric == Metric::Mfpt).unwrap();
    assert!(mfpt.get("B").unwrap() > 0.0);
    assert!(mfpt.get("E").unwrap() < 0.0);
}

#[test]
fn second_run_reuses_artifacts() {
    let tmp = TempDir::new().unwrap();
    let graph = ring_with_chords(60, 25);
    let partition = SeedPartition::new(&graph, &["ENSP00003", "ENSP00017", "ENSP00042"]).unwrap();

    let first_cache = ArtifactCache::open(tmp.path(), &graph);
    let first = run_all(&graph, &partition, &first_cache);
    assert_eq!(first_cache.stats(), CacheStats { hits: 0, misses: 6, stores: 6 });

    // A fresh handle behaves like a new process reading the same directory
    let second_cache = ArtifactCache::open(tmp.path(), &graph);
    let second = run_all(&graph, &partition, &second_cache);
    assert_eq!(second_cache.stats(), CacheStats { hits: 5, misses: 0, stores: 0 });

    for (a, b) in first.iter().zip(&second) {
        assert_bitwise_equal(a, b);
    }
}

#[test]
fn artifacts_are_shared_across_seed_sets() {
    let tmp = TempDir::new().unwrap();
    let graph = ring_with_chords(30, 10);
    let cache = ArtifactCache::open(tmp.path(), &graph);

    let mi = SeedPartition::new(&graph, &["ENSP00001", "ENSP00002"]).unwrap();
    let lqts = SeedPartition::new(&graph, &["ENSP00020"]).unwrap();
    let mi_scores = run_all(&graph, &mi, &cache);
    let lqts_scores = run_all(&graph, &lqts, &cache);

    assert_eq!(cache.stats().misses, 6);
    assert_ne!(mi_scores[0], lqts_scores[0]);
}

#[test]
fn corrupted_artifact_is_recomputed() {
    let tmp = TempDir::new().unwrap();
    let graph = ring_with_chords(20, 6);
    let partition = SeedPartition::new(&graph, &["ENSP00004"]).unwrap();

    let cache = ArtifactCache::open(tmp.path(), &graph);
    let ctx = ScoringContext::new(&graph, &partition, &cache, &NoProgress);
    let expected = metrics::run_metric(&ctx, Metric::InversePath).unwrap();

    let blob = cache.dir().unwrap().join("isp_all.bin");
    let mut bytes = fs::read(&blob).unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&blob, bytes).unwrap();

    let fresh = ArtifactCache::open(tmp.path(), &graph);
    let ctx = ScoringContext::new(&graph, &partition, &fresh, &NoProgress);
    let recomputed = metrics::run_metric(&ctx, Metric::InversePath).unwrap();

    assert_eq!(fresh.stats().misses, 1);
    assert_bitwise_equal(&expected, &recomputed);
}

#[test]
fn scores_do_not_depend_on_thread_count() {
    let graph = ring_with_chords(80, 40);
    let partition = SeedPartition::new(&graph, &["ENSP00010", "ENSP00055"]).unwrap();

    let run_in_pool = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
        pool.install(|| {
            let cache = ArtifactCache::disabled(&graph);
            run_all(&graph, &partition, &cache)
        })
    };

    let single = run_in_pool(1);
    let many = run_in_pool(4);
    for (a, b) in single.iter().zip(&many) {
        assert_bitwise_equal(a, b);
    }
}

#[test]
fn partition_covers_every_node_once() {
    let graph = ring_with_chords(25, 8);
    let raw = ["ENSP00007", "ENSP00007", "unknown", "ENSP00001", "ENSP00024"];
    let partition = SeedPartition::new(&graph, &raw).unwrap();

    assert_eq!(partition.seed_ids(&graph), vec!["ENSP00007", "ENSP00001", "ENSP00024"]);
    let mut seen = vec![0u32; graph.node_count];
    for &node in partition.seeds().iter().chain(partition.complement()) {
        seen[node as usize] += 1;
    }
    assert!(seen.iter().all(|&count| count == 1));
}

#[test]
fn isolated_node_scores_zero_without_error() {
    let mut builder = GraphBuilder::with_capacity(6);
    for (a, b) in [("P1", "P2"), ("P2", "P3"), ("P3", "P4"), ("P4", "P1"), ("P2", "P4")] {
        builder.add_edge(a, b);
    }
    builder.add_node("P9");
    let graph = builder.build().unwrap();
    let partition = SeedPartition::new(&graph, &["P1"]).unwrap();
    let cache = ArtifactCache::disabled(&graph);
    let ctx = ScoringContext::new(&graph, &partition, &cache, &NoProgress);

    for metric in [Metric::Betweenness, Metric::SharedNeighbors] {
        let scores = metrics::run_metric(&ctx, metric).unwrap();
        assert_eq!(scores.get("P9"), Some(0.0));
        assert!(scores.iter().all(|(_, s)| !s.is_nan()));
    }

    // Distance-based metrics need a connected network
    assert!(matches!(
        metrics::run_metric(&ctx, Metric::InversePath),
        Err(ProximityError::DisconnectedGraph { .. })
    ));
    assert!(matches!(
        metrics::run_metric(&ctx, Metric::Mfpt),
        Err(ProximityError::DisconnectedGraph { .. })
    ));
}

#[test]
fn computed_scores_round_trip_through_files() {
    let tmp = TempDir::new().unwrap();
    let graph = ring_with_chords(40, 15);
    let partition = SeedPartition::new(&graph, &["ENSP00000", "ENSP00013"]).unwrap();
    let cache = ArtifactCache::disabled(&graph);

    for scores in run_all(&graph, &partition, &cache) {
        let path = storage::score_file_path(tmp.path(), scores.metric, "MI");
        storage::write_scores(&path, &scores).unwrap();
        let restored = storage::read_scores(&path, scores.metric).unwrap();
        assert_bitwise_equal(&scores, &restored);
    }
}

#[test]
fn summary_lists_every_metric() {
    let tmp = TempDir::new().unwrap();
    let graph = path_network(tmp.path());
    let partition = SeedPartition::new(&graph, &["A"]).unwrap();
    let cache = ArtifactCache::disabled(&graph);
    let results = run_all(&graph, &partition, &cache);

    let path = tmp.path().join("summary_MI.json");
    storage::write_summary(&path, "MI", &graph, &partition, &results).unwrap();

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(summary["graph"]["node_count"], 5);
    assert_eq!(summary["seeds"][0], "A");
    for metric in Metric::ALL {
        assert!(summary["metrics"][metric.name()]["neighborhood_size"].is_u64());
    }
}

#[test]
fn largest_component_is_scored() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("islands.tsv");
    fs::write(&path, "A\tB\nB\tC\nC\tD\nX\tY\n").unwrap();
    let raw = data::load_edge_list(&path).unwrap();
    let graph = netprox::graph::algorithms::largest_connected_component(&raw).unwrap();

    assert_eq!(graph.node_count, 4);
    let partition = SeedPartition::new(&graph, &["A", "X"]).unwrap();
    assert_eq!(partition.seed_count(), 1);

    let cache = ArtifactCache::disabled(&graph);
    let results = run_all(&graph, &partition, &cache);
    assert!(results.iter().all(|scores| scores.len() == 4));
}

#[test]
fn drugs_are_scored_by_their_best_target() {
    let tmp = TempDir::new().unwrap();
    let graph = path_network(tmp.path());
    let partition = SeedPartition::new(&graph, &["A"]).unwrap();
    let cache = ArtifactCache::disabled(&graph);
    let results = run_all(&graph, &partition, &cache);

    let targets_path = tmp.path().join("targets.tsv");
    fs::write(&targets_path, "DB_near\tE\nDB_near\tB\nDB_far\tE\nDB_none\tZZZ\n").unwrap();
    let drug_targets = data::load_drug_targets(&targets_path).unwrap();
    let drugs = netprox::ranking::score_drugs(&results, &drug_targets);

    let ids: Vec<&str> = drugs.iter().map(|d| d.drug.as_str()).collect();
    assert_eq!(ids, vec!["DB_far", "DB_near"]);

    let isp = results.iter().position(|s| s.metric == Metric::InversePath).unwrap();
    let near = &drugs[1].best[isp];
    assert_eq!(near.as_ref().map(|(target, _)| target.as_str()), Some("B"));

    let path = storage::drug_scores_path(tmp.path(), "MI");
    let metrics: Vec<Metric> = results.iter().map(|s| s.metric).collect();
    storage::write_drug_scores(&path, &metrics, &drugs).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(written.starts_with("drug,mfpt,mfpt_target,bc,bc_target,sn,sn_target,isp,isp_target\n"));
}
