use thiserror::Error;

/// Errors raised by the graph store and the shortest path solver.
///
/// Generic over the node identifier so callers can match on the offending
/// node without parsing a message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError<N> {
    /// An operation referenced a node that was never added.
    #[error("unknown node {0:?}")]
    UnknownNode(N),

    /// Edge weights must be finite and non-negative.
    #[error("invalid weight {weight} for edge {from:?} -- {to:?}: weights must be finite and >= 0")]
    InvalidWeight { from: N, to: N, weight: f64 },

    /// Edges join two distinct nodes.
    #[error("self-loop on node {0:?} is not allowed")]
    SelfLoop(N),

    /// `end` is not reachable from `start`. A normal outcome, not a defect.
    #[error("no path from {start:?} to {end:?}")]
    NoPathFound { start: N, end: N },

    /// A path cost exceeded the largest finite `f64`. The node is reachable,
    /// but its distance cannot be represented.
    #[error("path cost to node {at:?} overflows f64")]
    CostOverflow { at: N },

    /// The predecessor walk hit a node with no predecessor before reaching
    /// the start node. Indicates a solver bug.
    #[error("predecessor chain broken at node {at:?}")]
    BrokenPredecessorChain { at: N },
}

impl<N> GraphError<N> {
    /// True for the "no path" outcome, which callers usually handle as a
    /// regular result rather than a failure.
    pub fn is_no_path(&self) -> bool {
        matches!(self, GraphError::NoPathFound { .. })
    }
}

pub type Result<T, N> = std::result::Result<T, GraphError<N>>;
