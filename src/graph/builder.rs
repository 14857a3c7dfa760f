//! Graph construction module

use crate::error::{ProximityError, Result};
use crate::graph::CompressedGraph;
use std::collections::HashMap;

/// Builder for incrementally constructing an undirected CompressedGraph
pub struct GraphBuilder {
    /// Mapping from string IDs to provisional node indices
    id_to_index: HashMap<String, u32>,

    /// Node string IDs in insertion order
    node_ids: Vec<String>,

    /// Adjacency lists for each node (provisional indices)
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Get or create a node index for the given string ID
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add a node without any edges
    pub fn add_node(&mut self, id: &str) {
        self.get_or_create_node(id);
    }

    /// Add an undirected edge. Self-loops are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let a_idx = self.get_or_create_node(a);
        let b_idx = self.get_or_create_node(b);

        if a_idx == b_idx {
            return;
        }

        self.adjacency_lists[a_idx as usize].push(b_idx);
        self.adjacency_lists[b_idx as usize].push(a_idx);
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Build the compressed graph, assigning final indices in sorted ID order
    pub fn build(self) -> Result<CompressedGraph> {
        let node_count = self.node_ids.len();
        if node_count == 0 {
            return Err(ProximityError::EmptyGraph);
        }

        // Sorted identifier order gives a stable matrix layout
        let mut order: Vec<u32> = (0..node_count as u32).collect();
        order.sort_by(|&a, &b| self.node_ids[a as usize].cmp(&self.node_ids[b as usize]));

        let mut old_to_new = vec![0u32; node_count];
        for (new_idx, &old_idx) in order.iter().enumerate() {
            old_to_new[old_idx as usize] = new_idx as u32;
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        let mut edges = Vec::new();

        for &old_idx in &order {
            let mut list: Vec<u32> = self.adjacency_lists[old_idx as usize]
                .iter()
                .map(|&n| old_to_new[n as usize])
                .collect();

            // Sort for binary search, drop parallel edges
            list.sort_unstable();
            list.dedup();

            edges.extend_from_slice(&list);
            offsets.push(edges.len() as u32);
        }

        let mut node_ids = self.node_ids;
        let sorted_ids = order
            .iter()
            .map(|&old_idx| std::mem::take(&mut node_ids[old_idx as usize]))
            .collect();

        Ok(CompressedGraph::from_parts(offsets, edges, sorted_ids))
    }
}
