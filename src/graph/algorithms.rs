//! Graph algorithms for analysis

use std::collections::{HashMap, VecDeque};
use crate::error::Result;
use crate::graph::CompressedGraph;
use crate::graph::builder::GraphBuilder;

/// Marker for nodes not reached by a traversal
pub const UNREACHABLE: u32 = u32::MAX;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        let rank_x = self.rank[root_x as usize];
        let rank_y = self.rank[root_y as usize];

        if rank_x > rank_y {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += rank_y;
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += rank_x;
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.rank[root as usize]
    }
}

/// Unweighted single-source distances by breadth-first search.
/// Unreached nodes hold `UNREACHABLE`.
pub fn bfs_distances(graph: &CompressedGraph, source: usize) -> Vec<u32> {
    let mut dist = vec![UNREACHABLE; graph.node_count];
    let mut queue = VecDeque::with_capacity(graph.node_count);

    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let next = dist[v] + 1;
        for &w in graph.neighbors(v) {
            let w = w as usize;
            if dist[w] == UNREACHABLE {
                dist[w] = next;
                queue.push_back(w);
            }
        }
    }

    dist
}

/// Group nodes by connected component, largest component first.
/// Members of each component are in ascending index order.
pub fn connected_components(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let mut sets = DisjointSets::new(graph.node_count);

    for node in 0..graph.node_count {
        for &other in graph.neighbors(node) {
            // Each undirected edge appears twice, union once
            if (node as u32) < other {
                sets.union(node as u32, other);
            }
        }
    }

    let mut by_root: HashMap<u32, Vec<u32>> = HashMap::new();
    for node in 0..graph.node_count as u32 {
        let root = sets.find(node);
        by_root.entry(root).or_default().push(node);
    }

    let mut components: Vec<Vec<u32>> = by_root.into_values().collect();
    // Ties go to the component holding the smallest identifier
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));
    components
}

pub fn is_connected(graph: &CompressedGraph) -> bool {
    if graph.node_count == 0 {
        return false;
    }
    let mut sets = DisjointSets::new(graph.node_count);
    for node in 0..graph.node_count {
        for &other in graph.neighbors(node) {
            sets.union(node as u32, other);
        }
    }
    sets.size(0) as usize == graph.node_count
}

/// Restrict the graph to its largest connected component
pub fn largest_connected_component(graph: &CompressedGraph) -> Result<CompressedGraph> {
    let components = connected_components(graph);
    let largest = match components.first() {
        Some(component) => component,
        None => return Err(crate::error::ProximityError::EmptyGraph),
    };

    log::info!(
        "Largest connected component has {} of {} nodes ({} components)",
        largest.len(),
        graph.node_count,
        components.len()
    );

    let mut builder = GraphBuilder::with_capacity(largest.len());
    for &node in largest {
        let node = node as usize;
        builder.add_node(graph.node_id(node));
        for &other in graph.neighbors(node) {
            if node < other as usize {
                builder.add_edge(graph.node_id(node), graph.node_id(other as usize));
            }
        }
    }

    builder.build()
}
