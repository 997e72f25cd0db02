use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Anything usable as a node identifier.
///
/// `Ord` supplies the tie-break order used when two frontier nodes share the
/// same tentative distance (lexicographic for strings, numeric for integers).
pub trait NodeId: Clone + Eq + Hash + Ord + Debug {}

impl<T: Clone + Eq + Hash + Ord + Debug> NodeId for T {}

/// Edge weight. Valid weights are finite and non-negative.
pub type Weight = f64;

/// Neighbor → weight map for a single node.
pub type Neighbors<N> = HashMap<N, Weight>;

/// How `add_edge` treats endpoints that were never added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgePolicy {
    /// Unknown endpoints fail with `UnknownNode`.
    #[default]
    Strict,
    /// Unknown endpoints are added implicitly.
    Lenient,
}

/// In-memory weighted undirected graph.
///
/// Adjacency is stored symmetrically: an edge u -- v of weight w appears as
/// `adjacency[u][v] == w` and `adjacency[v][u] == w`. Re-adding an edge
/// overwrites its weight, so there are never parallel edges.
#[derive(Debug, Clone)]
pub struct Graph<N: NodeId> {
    adjacency: HashMap<N, Neighbors<N>>,
    edge_count: usize,
    policy: EdgePolicy,
}

impl<N: NodeId> Graph<N> {
    pub fn new() -> Self {
        Self::with_policy(EdgePolicy::Strict)
    }

    pub fn with_policy(policy: EdgePolicy) -> Self {
        Self {
            adjacency: HashMap::new(),
            edge_count: 0,
            policy,
        }
    }

    /// Pre-allocate for a known node count, with the strict edge policy.
    pub fn with_capacity(node_count: usize) -> Self {
        Self::with_capacity_and_policy(node_count, EdgePolicy::Strict)
    }

    /// Pre-allocate for a known node count with an explicit edge policy.
    pub fn with_capacity_and_policy(node_count: usize, policy: EdgePolicy) -> Self {
        Self {
            adjacency: HashMap::with_capacity(node_count),
            edge_count: 0,
            policy,
        }
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    /// Insert a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, id: N) {
        self.adjacency.entry(id).or_default();
    }

    /// Add (or overwrite) the undirected edge `u -- v`.
    ///
    /// The weight is validated first; a failing call leaves the graph untouched.
    pub fn add_edge(&mut self, u: N, v: N, weight: Weight) -> Result<(), N> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight { from: u, to: v, weight });
        }
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }

        match self.policy {
            EdgePolicy::Strict => {
                if !self.contains(&u) {
                    return Err(GraphError::UnknownNode(u));
                }
                if !self.contains(&v) {
                    return Err(GraphError::UnknownNode(v));
                }
            }
            EdgePolicy::Lenient => {
                self.add_node(u.clone());
                self.add_node(v.clone());
            }
        }

        let previous = self
            .adjacency
            .get_mut(&u)
            .and_then(|m| m.insert(v.clone(), weight));
        if let Some(m) = self.adjacency.get_mut(&v) {
            m.insert(u, weight);
        }
        if previous.is_none() {
            self.edge_count += 1;
        }
        Ok(())
    }

    /// Bulk load from an iterator of `(u, v, weight)` triples.
    ///
    /// Stops at the first rejected edge; edges before it stay loaded.
    pub fn load_edges<I>(&mut self, edges: I) -> Result<(), N>
    where
        I: IntoIterator<Item = (N, N, Weight)>,
    {
        for (u, v, w) in edges {
            self.add_edge(u, v, w)?;
        }
        Ok(())
    }

    /// Neighbor → weight map for `id`.
    pub fn neighbors(&self, id: &N) -> Result<&Neighbors<N>, N> {
        self.adjacency
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))
    }

    pub fn contains(&self, id: &N) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Weight of the edge `u -- v`, if present.
    pub fn edge_weight(&self, u: &N, v: &N) -> Option<Weight> {
        self.adjacency.get(u).and_then(|m| m.get(v)).copied()
    }

    /// All node identifiers in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        let mut ids: Vec<&N> = self.adjacency.keys().collect();
        ids.sort_unstable();
        ids.into_iter()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges (each pair counted once).
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let nodes_mem = self.adjacency.len() * (size_of::<N>() + size_of::<Neighbors<N>>() + 16);
        let edge_mem: usize = self
            .adjacency
            .values()
            .map(|m| m.capacity() * (size_of::<N>() + size_of::<Weight>() + 8))
            .sum();

        nodes_mem + edge_mem
    }
}

impl<N: NodeId> Default for Graph<N> {
    fn default() -> Self {
        Self::new()
    }
}
