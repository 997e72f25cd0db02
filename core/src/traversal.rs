use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{GraphError, Result};
use crate::frontier::{Frontier, IndexedHeap, ScanFrontier, Selector};
use crate::graph::{Graph, NodeId, Weight};

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SolverConfig {
    pub selector: Selector,
    /// Stop as soon as the end node is finalized.
    pub early_exit: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            selector: Selector::IndexedHeap,
            early_exit: true,
        }
    }
}

/// A minimal-cost path, start and end inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath<N> {
    pub path: Vec<N>,
    pub cost: Weight,
    /// Nodes finalized before the solve stopped.
    pub nodes_finalized: usize,
}

impl<N> ShortestPath<N> {
    /// Number of edges on the path.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Per-solve tables. Dropped once the path is reconstructed.
struct SearchState<N> {
    distance: HashMap<N, Weight>,
    predecessor: HashMap<N, N>,
    nodes_finalized: usize,
}

impl<N: NodeId> SearchState<N> {
    fn distance(&self, node: &N) -> Weight {
        self.distance.get(node).copied().unwrap_or(f64::INFINITY)
    }
}

/// Single-source weighted shortest path solver (Dijkstra).
#[derive(Debug, Clone, Copy, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> SolverConfig {
        self.config
    }

    /// Minimal-cost path from `start` to `end`.
    ///
    /// Fails with `UnknownNode` if either endpoint is missing and with
    /// `NoPathFound` if `end` is unreachable. Never returns a partial path.
    pub fn shortest_path<N: NodeId>(
        &self,
        graph: &Graph<N>,
        start: &N,
        end: &N,
    ) -> Result<ShortestPath<N>, N> {
        if !graph.contains(start) {
            return Err(GraphError::UnknownNode(start.clone()));
        }
        if !graph.contains(end) {
            return Err(GraphError::UnknownNode(end.clone()));
        }

        if start == end {
            return Ok(ShortestPath {
                path: vec![start.clone()],
                cost: 0.0,
                nodes_finalized: 0,
            });
        }

        debug!(
            ?start,
            ?end,
            selector = %self.config.selector,
            nodes = graph.node_count(),
            "solving"
        );
        let stop_at = if self.config.early_exit { Some(end) } else { None };
        let state = self.run(graph, start, stop_at)?;

        let cost = state.distance(end);
        if cost == f64::INFINITY {
            debug!(?start, ?end, nodes_finalized = state.nodes_finalized, "no path");
            return Err(GraphError::NoPathFound {
                start: start.clone(),
                end: end.clone(),
            });
        }

        let path = reconstruct(&state.predecessor, start, end)?;
        debug!(
            ?start,
            ?end,
            cost,
            hops = path.len() - 1,
            nodes_finalized = state.nodes_finalized,
            "shortest path found"
        );

        Ok(ShortestPath {
            path,
            cost,
            nodes_finalized: state.nodes_finalized,
        })
    }

    /// Distances from `start` to every node reachable from it.
    pub fn distances<N: NodeId>(
        &self,
        graph: &Graph<N>,
        start: &N,
    ) -> Result<BTreeMap<N, Weight>, N> {
        if !graph.contains(start) {
            return Err(GraphError::UnknownNode(start.clone()));
        }
        let state = self.run(graph, start, None)?;
        Ok(state
            .distance
            .into_iter()
            .filter(|(_, d)| d.is_finite())
            .collect())
    }

    fn run<N: NodeId>(
        &self,
        graph: &Graph<N>,
        start: &N,
        stop_at: Option<&N>,
    ) -> Result<SearchState<N>, N> {
        match self.config.selector {
            Selector::IndexedHeap => {
                solve(graph, start, stop_at, IndexedHeap::with_capacity(graph.node_count()))
            }
            Selector::LinearScan => {
                solve(graph, start, stop_at, ScanFrontier::with_capacity(graph.node_count()))
            }
        }
    }
}

impl<N: NodeId> Graph<N> {
    /// Shortest path with the default solver settings.
    pub fn shortest_path(&self, start: &N, end: &N) -> Result<ShortestPath<N>, N> {
        Solver::default().shortest_path(self, start, end)
    }
}

/// Core loop: repeatedly finalize the closest frontier node and relax its edges.
///
/// Terminates when the frontier is empty, when `stop_at` is finalized, or when
/// the closest remaining node is at infinite distance (nothing else reachable).
/// A relaxation whose sum overflows `f64` aborts with `CostOverflow`, since an
/// infinite tentative distance would otherwise read as "unreachable".
fn solve<N, F>(
    graph: &Graph<N>,
    start: &N,
    stop_at: Option<&N>,
    mut frontier: F,
) -> Result<SearchState<N>, N>
where
    N: NodeId,
    F: Frontier<N>,
{
    let mut distance: HashMap<N, Weight> = HashMap::with_capacity(graph.node_count());
    let mut predecessor: HashMap<N, N> = HashMap::new();

    for node in graph.nodes() {
        let d = if node == start { 0.0 } else { f64::INFINITY };
        distance.insert(node.clone(), d);
        frontier.push(node.clone(), d);
    }

    let mut nodes_finalized = 0usize;

    while let Some((current, current_dist)) = frontier.pop_min() {
        if current_dist == f64::INFINITY {
            trace!(remaining = frontier.len() + 1, "frontier unreachable, stopping");
            break;
        }
        nodes_finalized += 1;
        trace!(node = ?current, distance = current_dist, "finalized");

        if stop_at == Some(&current) {
            break;
        }

        for (neighbor, &weight) in graph.neighbors(&current)? {
            let candidate = current_dist + weight;
            if !candidate.is_finite() {
                warn!(node = ?neighbor, from = ?current, "path cost overflow");
                return Err(GraphError::CostOverflow { at: neighbor.clone() });
            }
            let known = distance.get(neighbor).copied().unwrap_or(f64::INFINITY);
            if candidate < known {
                trace!(node = ?neighbor, from = ?current, candidate, "relaxed");
                distance.insert(neighbor.clone(), candidate);
                predecessor.insert(neighbor.clone(), current.clone());
                frontier.decrease(neighbor, candidate);
            }
        }
    }

    Ok(SearchState {
        distance,
        predecessor,
        nodes_finalized,
    })
}

/// Walk predecessor links from `end` back to `start`.
///
/// Returns the path in start → end order. A node without a predecessor
/// before `start` is reached (or a cycle in the links) means the tables are
/// inconsistent and is reported as `BrokenPredecessorChain`.
pub fn reconstruct<N: NodeId>(
    predecessor: &HashMap<N, N>,
    start: &N,
    end: &N,
) -> Result<Vec<N>, N> {
    let mut path = vec![end.clone()];
    let mut node = end;

    while node != start {
        // A valid chain never has more links than there are entries
        if path.len() > predecessor.len() + 1 {
            warn!(at = ?node, "predecessor chain does not terminate");
            return Err(GraphError::BrokenPredecessorChain { at: node.clone() });
        }
        match predecessor.get(node) {
            Some(prev) => {
                path.push(prev.clone());
                node = prev;
            }
            None => {
                warn!(at = ?node, "predecessor chain broken");
                return Err(GraphError::BrokenPredecessorChain { at: node.clone() });
            }
        }
    }

    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgePolicy;

    fn reference_graph() -> Graph<&'static str> {
        let mut g = Graph::new();
        for n in ["A", "B", "C", "D", "E", "F"] {
            g.add_node(n);
        }
        g.load_edges(vec![
            ("A", "B", 4.0),
            ("A", "C", 2.0),
            ("B", "C", 1.0),
            ("B", "D", 5.0),
            ("C", "E", 10.0),
            ("D", "E", 2.0),
            ("D", "F", 8.0),
            ("E", "F", 6.0),
        ])
        .unwrap();
        g
    }

    fn make_chain(n: u64, weight: f64) -> Graph<u64> {
        let mut g = Graph::with_policy(EdgePolicy::Lenient);
        g.load_edges((0..n - 1).map(|i| (i, i + 1, weight))).unwrap();
        g
    }

    fn all_configs() -> Vec<SolverConfig> {
        let mut out = Vec::new();
        for selector in [Selector::IndexedHeap, Selector::LinearScan] {
            for early_exit in [true, false] {
                out.push(SolverConfig { selector, early_exit });
            }
        }
        out
    }

    // --- Shortest path ---

    #[test]
    fn test_reference_scenario() {
        let g = reference_graph();
        for config in all_configs() {
            let sp = Solver::new(config).shortest_path(&g, &"A", &"F").unwrap();
            assert_eq!(sp.cost, 16.0);
            assert_eq!(sp.path, vec!["A", "C", "B", "D", "F"], "config {:?}", config);
        }
    }

    #[test]
    fn test_reference_scenario_stable_across_runs() {
        let g = reference_graph();
        let first = g.shortest_path(&"A", &"F").unwrap();
        for _ in 0..20 {
            assert_eq!(g.shortest_path(&"A", &"F").unwrap().path, first.path);
        }
    }

    #[test]
    fn test_shortest_path_self() {
        let g = reference_graph();
        let sp = g.shortest_path(&"D", &"D").unwrap();
        assert_eq!(sp.path, vec!["D"]);
        assert_eq!(sp.cost, 0.0);
        assert_eq!(sp.hops(), 0);
        assert_eq!(sp.nodes_finalized, 0);
    }

    #[test]
    fn test_shortest_path_unknown_end() {
        let g = reference_graph();
        assert_eq!(g.shortest_path(&"A", &"Z"), Err(GraphError::UnknownNode("Z")));
    }

    #[test]
    fn test_shortest_path_unknown_start() {
        let g = reference_graph();
        assert_eq!(g.shortest_path(&"Z", &"A"), Err(GraphError::UnknownNode("Z")));
        // Self-query on an unknown node is still unknown
        assert_eq!(g.shortest_path(&"Z", &"Z"), Err(GraphError::UnknownNode("Z")));
    }

    #[test]
    fn test_shortest_path_no_path() {
        let mut g = reference_graph();
        g.add_node("X");
        g.add_node("Y");
        g.add_edge("X", "Y", 1.0).unwrap();
        for config in all_configs() {
            let err = Solver::new(config).shortest_path(&g, &"A", &"Y").unwrap_err();
            assert!(err.is_no_path());
            assert_eq!(err, GraphError::NoPathFound { start: "A", end: "Y" });
        }
    }

    #[test]
    fn test_isolated_node() {
        let mut g = make_chain(3, 1.0);
        g.add_node(100);
        assert!(g.shortest_path(&100, &0).unwrap_err().is_no_path());
        assert!(g.shortest_path(&0, &100).unwrap_err().is_no_path());
    }

    #[test]
    fn test_chain() {
        let g = make_chain(6, 1.5);
        let sp = g.shortest_path(&0, &5).unwrap();
        assert_eq!(sp.path, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(sp.cost, 7.5);
        assert_eq!(sp.hops(), 5);
    }

    #[test]
    fn test_weighted_detour_beats_direct_edge() {
        let mut g = Graph::with_policy(EdgePolicy::Lenient);
        g.load_edges(vec![(1u64, 2, 10.0), (1, 3, 1.0), (3, 4, 1.0), (4, 2, 1.0)])
            .unwrap();
        let sp = g.shortest_path(&1, &2).unwrap();
        assert_eq!(sp.path, vec![1, 3, 4, 2]);
        assert_eq!(sp.cost, 3.0);
    }

    #[test]
    fn test_undirected_reverse_query() {
        let g = reference_graph();
        let sp = g.shortest_path(&"F", &"A").unwrap();
        assert_eq!(sp.cost, 16.0);
        assert_eq!(sp.path.first(), Some(&"F"));
        assert_eq!(sp.path.last(), Some(&"A"));
    }

    #[test]
    fn test_tie_break_prefers_smaller_id() {
        // Two equal-cost routes 0-1-3 and 0-2-3. Node 1 is finalized before 2,
        // so 3 is first relaxed through 1 and the equal candidate via 2 is ignored.
        let mut g = Graph::with_policy(EdgePolicy::Lenient);
        g.load_edges(vec![(0u64, 2, 1.0), (0, 1, 1.0), (2, 3, 1.0), (1, 3, 1.0)])
            .unwrap();
        for config in all_configs() {
            let sp = Solver::new(config).shortest_path(&g, &0, &3).unwrap();
            assert_eq!(sp.path, vec![0, 1, 3]);
        }
    }

    #[test]
    fn test_zero_weight_edges() {
        let mut g = Graph::with_policy(EdgePolicy::Lenient);
        g.load_edges(vec![("a", "b", 0.0), ("b", "c", 0.0), ("a", "c", 1.0)])
            .unwrap();
        let sp = g.shortest_path(&"a", &"c").unwrap();
        assert_eq!(sp.cost, 0.0);
        assert_eq!(sp.path, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_overwrite_changes_route() {
        let mut g = reference_graph();
        g.add_edge("D", "F", 1.0).unwrap();
        let sp = g.shortest_path(&"A", &"F").unwrap();
        assert_eq!(sp.cost, 9.0);
        assert_eq!(sp.path, vec!["A", "C", "B", "D", "F"]);

        g.add_edge("D", "F", 100.0).unwrap();
        let sp = g.shortest_path(&"A", &"F").unwrap();
        assert_eq!(sp.cost, 16.0);
        assert_eq!(sp.path, vec!["A", "C", "B", "D", "E", "F"]);
    }

    #[test]
    fn test_early_exit_finalizes_fewer_nodes() {
        let g = make_chain(50, 1.0);
        let early = Solver::new(SolverConfig { early_exit: true, ..Default::default() })
            .shortest_path(&g, &0, &5)
            .unwrap();
        let full = Solver::new(SolverConfig { early_exit: false, ..Default::default() })
            .shortest_path(&g, &0, &5)
            .unwrap();
        assert_eq!(early.path, full.path);
        assert_eq!(early.nodes_finalized, 6);
        assert_eq!(full.nodes_finalized, 50);
    }

    #[test]
    fn test_unreachable_stops_early() {
        // Without the infinite-distance check the solver would finalize every node
        let mut g = make_chain(4, 1.0);
        for id in 10..20 {
            g.add_node(id);
        }
        let full = Solver::new(SolverConfig { early_exit: false, ..Default::default() });
        let err = full.shortest_path(&g, &0, &15).unwrap_err();
        assert!(err.is_no_path());
        let dist = full.distances(&g, &0).unwrap();
        assert_eq!(dist.len(), 4);
    }

    #[test]
    fn test_cost_overflow_is_not_no_path() {
        let mut g = Graph::with_policy(EdgePolicy::Lenient);
        g.load_edges(vec![("A", "B", 1e308), ("B", "C", 1e308)]).unwrap();
        for config in all_configs() {
            let err = Solver::new(config).shortest_path(&g, &"A", &"C").unwrap_err();
            assert_eq!(err, GraphError::CostOverflow { at: "C" });
            assert!(!err.is_no_path());
        }
        // Reachable below the overflow point still works
        let sp = g.shortest_path(&"A", &"B").unwrap();
        assert_eq!(sp.cost, 1e308);
    }

    #[test]
    fn test_distances_cost_overflow() {
        let mut g = Graph::with_policy(EdgePolicy::Lenient);
        g.load_edges(vec![("A", "B", 1e308), ("B", "C", 1e308)]).unwrap();
        assert_eq!(
            Solver::default().distances(&g, &"A"),
            Err(GraphError::CostOverflow { at: "C" })
        );
    }

    // --- Distances ---

    #[test]
    fn test_distances_reference() {
        let g = reference_graph();
        let d = Solver::default().distances(&g, &"A").unwrap();
        assert_eq!(d[&"A"], 0.0);
        assert_eq!(d[&"C"], 2.0);
        assert_eq!(d[&"B"], 3.0);
        assert_eq!(d[&"D"], 8.0);
        assert_eq!(d[&"E"], 10.0);
        assert_eq!(d[&"F"], 16.0);
    }

    #[test]
    fn test_distances_unknown_start() {
        let g = reference_graph();
        assert_eq!(Solver::default().distances(&g, &"Q"), Err(GraphError::UnknownNode("Q")));
    }

    #[test]
    fn test_distances_selectors_agree() {
        let g = reference_graph();
        let heap = Solver::new(SolverConfig { selector: Selector::IndexedHeap, early_exit: false });
        let scan = Solver::new(SolverConfig { selector: Selector::LinearScan, early_exit: false });
        for start in ["A", "B", "C", "D", "E", "F"] {
            assert_eq!(heap.distances(&g, &start).unwrap(), scan.distances(&g, &start).unwrap());
        }
    }

    // --- Reconstruction ---

    #[test]
    fn test_reconstruct_simple() {
        let mut pred = HashMap::new();
        pred.insert(2u64, 1u64);
        pred.insert(3, 2);
        assert_eq!(reconstruct(&pred, &1, &3).unwrap(), vec![1, 2, 3]);
        assert_eq!(reconstruct(&pred, &3, &3).unwrap(), vec![3]);
    }

    #[test]
    fn test_reconstruct_missing_link() {
        let mut pred = HashMap::new();
        pred.insert(3u64, 2u64);
        assert_eq!(
            reconstruct(&pred, &1, &3),
            Err(GraphError::BrokenPredecessorChain { at: 2 })
        );
    }

    #[test]
    fn test_reconstruct_cycle_terminates() {
        let mut pred = HashMap::new();
        pred.insert(2u64, 3u64);
        pred.insert(3, 2);
        assert!(matches!(
            reconstruct(&pred, &1, &3),
            Err(GraphError::BrokenPredecessorChain { .. })
        ));
    }

    #[test]
    fn test_config_serde_defaults() {
        let c: SolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, SolverConfig::default());
        let c: SolverConfig =
            serde_json::from_str(r#"{"selector": "linear-scan", "early-exit": false}"#).unwrap();
        assert_eq!(c.selector, Selector::LinearScan);
        assert!(!c.early_exit);
    }
}
