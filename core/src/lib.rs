//! pathweight-core: In-memory weighted graph and shortest path engine.
//!
//! A pure Rust library that maintains a symmetric weighted adjacency map and
//! answers single-pair minimal-cost path queries with Dijkstra's algorithm.
//! Frontier selection is deterministic: equal tentative distances are broken
//! by the node identifier's `Ord`, so repeated queries return the same path.
//!
//! The library emits `tracing` events but never installs a subscriber.

mod error;
mod frontier;
mod graph;
mod traversal;

pub use error::{GraphError, Result};
pub use frontier::{Frontier, IndexedHeap, ScanFrontier, Selector};
pub use graph::{EdgePolicy, Graph, NodeId, Neighbors, Weight};
pub use traversal::{reconstruct, ShortestPath, Solver, SolverConfig};
