//! Seed/complement partitioning of the node set

use crate::error::{ProximityError, Result};
use crate::graph::CompressedGraph;

/// The seed set and its complement, as dense node indices.
///
/// Seeds keep the order in which they were supplied; the complement is in
/// ascending index order. Together they cover every node exactly once.
#[derive(Debug, Clone)]
pub struct SeedPartition {
    seeds: Vec<u32>,
    complement: Vec<u32>,
    is_seed: Vec<bool>,
}

impl SeedPartition {
    /// Partition `graph` around the raw seed identifiers.
    ///
    /// Identifiers absent from the graph and repeated identifiers are dropped.
    /// Fails when no seed remains, or when the seeds cover every node.
    pub fn new<S: AsRef<str>>(graph: &CompressedGraph, raw_seeds: &[S]) -> Result<Self> {
        if graph.is_empty() {
            return Err(ProximityError::EmptyGraph);
        }

        let mut is_seed = vec![false; graph.node_count];
        let mut seeds = Vec::new();
        let mut dropped = 0usize;

        for id in raw_seeds {
            match graph.index_of(id.as_ref()) {
                Some(idx) if !is_seed[idx as usize] => {
                    is_seed[idx as usize] = true;
                    seeds.push(idx);
                }
                Some(_) => {}
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            log::warn!("{} seed identifiers are not in the network and were dropped", dropped);
        }

        if seeds.is_empty() {
            return Err(ProximityError::InvalidSeedSet {
                reason: format!("none of the {} seeds are in the network", raw_seeds.len()),
            });
        }
        if seeds.len() == graph.node_count {
            return Err(ProximityError::InvalidSeedSet {
                reason: "seeds cover every node, complement is empty".to_string(),
            });
        }

        let complement = (0..graph.node_count as u32)
            .filter(|&idx| !is_seed[idx as usize])
            .collect();

        log::info!("Seed set has {} of {} supplied identifiers", seeds.len(), raw_seeds.len());

        Ok(Self { seeds, complement, is_seed })
    }

    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    pub fn complement(&self) -> &[u32] {
        &self.complement
    }

    pub fn is_seed(&self, node: usize) -> bool {
        self.is_seed[node]
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    pub fn complement_count(&self) -> usize {
        self.complement.len()
    }

    pub fn node_count(&self) -> usize {
        self.is_seed.len()
    }

    /// Seed identifiers, in seed order
    pub fn seed_ids<'g>(&self, graph: &'g CompressedGraph) -> Vec<&'g str> {
        self.seeds.iter().map(|&idx| graph.node_id(idx as usize)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn square() -> CompressedGraph {
        let mut builder = GraphBuilder::with_capacity(4);
        builder.add_edge("P1", "P2");
        builder.add_edge("P2", "P3");
        builder.add_edge("P3", "P4");
        builder.add_edge("P4", "P1");
        builder.build().unwrap()
    }

    #[test]
    fn partition_is_total_and_disjoint() {
        let graph = square();
        let partition = SeedPartition::new(&graph, &["P3", "P1"]).unwrap();

        let mut all: Vec<u32> = partition.seeds().iter().chain(partition.complement()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3]);
        for &s in partition.seeds() {
            assert!(!partition.complement().contains(&s));
        }
    }

    #[test]
    fn seed_order_is_preserved_and_deduplicated() {
        let graph = square();
        let partition = SeedPartition::new(&graph, &["P4", "missing", "P2", "P4"]).unwrap();

        assert_eq!(partition.seed_ids(&graph), vec!["P4", "P2"]);
        assert_eq!(partition.complement(), &[0, 2]);
        assert!(partition.is_seed(3));
        assert!(!partition.is_seed(0));
    }

    #[test]
    fn no_seed_in_graph_is_invalid() {
        let graph = square();
        let err = SeedPartition::new(&graph, &["Q1", "Q2"]).unwrap_err();
        assert!(matches!(err, ProximityError::InvalidSeedSet { .. }));

        let empty: [&str; 0] = [];
        assert!(SeedPartition::new(&graph, &empty).is_err());
    }

    #[test]
    fn seeds_covering_graph_are_invalid() {
        let graph = square();
        let err = SeedPartition::new(&graph, &["P1", "P2", "P3", "P4"]).unwrap_err();
        assert!(matches!(err, ProximityError::InvalidSeedSet { .. }));
    }
}
