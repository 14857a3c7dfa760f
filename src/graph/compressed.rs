//! Memory-efficient undirected graph representation

use std::collections::HashMap;
use std::mem;
use sha2::{Digest, Sha256};

/// Compressed sparse representation of an undirected, unweighted graph.
///
/// Every edge is stored in both endpoints' adjacency lists. Node indices are
/// dense (`0..node_count`) and follow the sorted order of the identifiers, so
/// the same network always produces the same indexing.
#[derive(Debug, Clone)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: index where each node's neighbors begin
    /// offsets[i] to offsets[i+1] defines the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Neighbor array: concatenated, sorted neighbor lists
    pub edges: Vec<u32>,

    /// Mapping from internal node indices to identifiers
    pub node_ids: Vec<String>,

    /// Reverse mapping from identifiers to node indices
    id_to_index: HashMap<String, u32>,
}

impl CompressedGraph {
    /// Assemble a graph from CSR arrays. Neighbor lists must already be sorted
    /// and symmetric.
    pub(crate) fn from_parts(offsets: Vec<u32>, edges: Vec<u32>, node_ids: Vec<String>) -> Self {
        let id_to_index = node_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx as u32))
            .collect();

        Self {
            node_count: node_ids.len(),
            offsets,
            edges,
            node_ids,
            id_to_index,
        }
    }

    /// Get the neighbors of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Get degree of a node
    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Identifier of the node at `index`
    pub fn node_id(&self, index: usize) -> &str {
        &self.node_ids[index]
    }

    /// Dense index of the node with identifier `id`, if present
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.id_to_index.get(id).copied()
    }

    /// Content fingerprint of the graph (hex SHA-256).
    ///
    /// Two graphs share a fingerprint iff they have the same node identifiers
    /// and the same edges, independent of the order they were loaded in.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.node_count as u64).to_le_bytes());
        for id in &self.node_ids {
            hasher.update((id.len() as u64).to_le_bytes());
            hasher.update(id.as_bytes());
        }
        for offset in &self.offsets {
            hasher.update(offset.to_le_bytes());
        }
        for edge in &self.edges {
            hasher.update(edge.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let edges = self.edges.capacity() * mem::size_of::<u32>();
        let ids = self.node_ids.iter().map(|s| s.capacity()).sum::<usize>();

        base + offsets + edges + 2 * ids
    }
}
