//! Undirected join graph over cube names.
//!
//! Edges come from every join condition of every explore, so the topology is
//! a property of the whole namespace rather than of one explore. Paths are
//! found with breadth-first search. When several shortest paths exist, the
//! one discovered first wins, and neighbours are visited in the order their
//! edges were added, so the result only depends on declaration order.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::{MappingError, MappingResult};

/// A resolved path: cube names from the base cube to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPath(Vec<String>);

impl JoinPath {
    pub fn cubes(&self) -> &[String] {
        &self.0
    }

    /// The last cube of the path.
    pub fn target(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of joins along the path.
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl std::fmt::Display for JoinPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinGraph {
    graph: UnGraph<String, ()>,

    /// Index: cube name → NodeIndex
    node_index: HashMap<String, NodeIndex>,
}

impl JoinGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cube, returning its index. Adding a known cube is a no-op.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_index.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    /// Record an undirected edge. Returns false if it already existed or
    /// both ends are the same cube.
    pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        let a = self.add_node(a);
        let b = self.add_node(b);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Neighbours in edge insertion order.
    ///
    /// petgraph walks a node's edges newest first, so they are re-sorted by
    /// edge index.
    fn ordered_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges(node)
            .map(|edge| {
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                (edge.id(), other)
            })
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, other)| other).collect()
    }

    /// Names of the cubes joined directly to `name`, in insertion order.
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        match self.node_index.get(name) {
            Some(idx) => self
                .ordered_neighbors(*idx)
                .into_iter()
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Shortest path from `from` to `to`.
    ///
    /// The path from a cube to itself is just that cube.
    ///
    /// # Errors
    ///
    /// [`MappingError::UnreachableJoinTarget`] when either cube is not in
    /// the graph or no path connects them.
    pub fn find_path(&self, from: &str, to: &str) -> MappingResult<JoinPath> {
        if from == to {
            return Ok(JoinPath(vec![from.to_string()]));
        }

        let unreachable = || MappingError::UnreachableJoinTarget {
            from: from.to_string(),
            to: to.to_string(),
        };
        let from_idx = *self.node_index.get(from).ok_or_else(unreachable)?;
        let to_idx = *self.node_index.get(to).ok_or_else(unreachable)?;

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        queue.push_back(from_idx);
        visited.insert(from_idx);

        while let Some(current) = queue.pop_front() {
            if current == to_idx {
                return Ok(self.reconstruct_path(from_idx, to_idx, &parent));
            }
            for neighbor in self.ordered_neighbors(current) {
                if visited.insert(neighbor) {
                    parent.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        Err(unreachable())
    }

    /// Walk the BFS parent map back from the target.
    fn reconstruct_path(
        &self,
        from_idx: NodeIndex,
        to_idx: NodeIndex,
        parent: &HashMap<NodeIndex, NodeIndex>,
    ) -> JoinPath {
        let mut cubes = vec![self.graph[to_idx].clone()];
        let mut current = to_idx;
        while current != from_idx {
            match parent.get(&current) {
                Some(prev) => {
                    cubes.push(self.graph[*prev].clone());
                    current = *prev;
                }
                None => break,
            }
        }
        cubes.reverse();
        JoinPath(cubes)
    }
}
