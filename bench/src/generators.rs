//! Weighted graph generators. All O(n) or O(n + edges), single-threaded,
//! deterministic for a given seed.

use pathweight_core::{EdgePolicy, Graph, GraphError, Weight};

pub type GenResult = Result<Graph<u64>, GraphError<u64>>;
pub type Generator = fn(u64, u64) -> GenResult;

/// Simple LCG for deterministic, fast pseudo-random numbers.
pub struct FastRng(u64);

impl FastRng {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Integer weight in 1..=max, kept integral so path sums stay exact.
    fn weight(&mut self, max: u64) -> Weight {
        (self.next(max) + 1) as Weight
    }
}

/// Upper bound on the up-front reservation for scale-free edge endpoints.
/// The vector still grows past it when the graph needs more.
const ENDPOINT_RESERVE_MAX: u64 = 1 << 22;

fn with_nodes(node_count: u64) -> Graph<u64> {
    let mut graph = Graph::with_capacity_and_policy(node_count as usize, EdgePolicy::Strict);
    for i in 0..node_count {
        graph.add_node(i);
    }
    graph
}

/// 2D grid lattice with random weights: long weighted paths, many equal-cost
/// alternatives. Exercises the tie-break order heavily.
pub fn gen_grid(node_count: u64, seed: u64) -> GenResult {
    let side = ((node_count as f64).sqrt() as u64).max(2);
    let n = side * side;
    let mut graph = with_nodes(n);
    let mut rng = FastRng::new(seed.wrapping_add(42));

    for row in 0..side {
        for col in 0..side {
            let id = row * side + col;
            if col + 1 < side {
                graph.add_edge(id, id + 1, rng.weight(10))?;
            }
            if row + 1 < side {
                graph.add_edge(id, id + side, rng.weight(10))?;
            }
        }
    }

    Ok(graph)
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge endpoint. Hubs
/// collect many edges; weights are uniform in 1..=100.
pub fn gen_scale_free(node_count: u64, seed: u64) -> GenResult {
    let edges_per_node = 5u64;
    let mut graph = with_nodes(node_count);
    let mut rng = FastRng::new(seed.wrapping_add(12345));

    let mut endpoints: Vec<u64> = Vec::with_capacity(endpoint_reserve(node_count, edges_per_node));

    // Seed: small clique
    let clique = 5u64.min(node_count);
    for i in 0..clique {
        for j in (i + 1)..clique {
            graph.add_edge(i, j, rng.weight(100))?;
            endpoints.push(i);
            endpoints.push(j);
        }
    }

    for new_node in clique..node_count {
        let attach = edges_per_node.min(new_node);
        for _ in 0..attach {
            let target = endpoints[rng.next(endpoints.len() as u64) as usize];
            if target != new_node {
                graph.add_edge(new_node, target, rng.weight(100))?;
                endpoints.push(new_node);
                endpoints.push(target);
            }
        }
    }

    Ok(graph)
}

fn endpoint_reserve(node_count: u64, edges_per_node: u64) -> usize {
    node_count
        .saturating_mul(edges_per_node)
        .saturating_mul(2)
        .min(ENDPOINT_RESERVE_MAX) as usize
}

/// Erdos-Renyi: ~5 uniform random edges per node, no structure. Sparse enough
/// to leave some nodes isolated, so some queries end in "no path".
pub fn gen_random(node_count: u64, seed: u64) -> GenResult {
    let target_edges = node_count * 5 / 2;
    let mut graph = with_nodes(node_count);
    let mut rng = FastRng::new(seed.wrapping_add(54321));

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            graph.add_edge(from, to, rng.next_f64() * 50.0)?;
        }
    }

    Ok(graph)
}

/// Barbell: two random clusters joined by a chain of cheap bridge edges.
///
/// Every cross-cluster query must funnel through the bridge.
pub fn gen_barbell(node_count: u64, seed: u64) -> GenResult {
    let bridge_len = 10u64.min(node_count.saturating_sub(2));
    let cluster = ((node_count - bridge_len) / 2).max(1);
    let total = cluster * 2 + bridge_len;
    let mut graph = with_nodes(total);
    let mut rng = FastRng::new(seed.wrapping_add(99999));

    let b_start = cluster + bridge_len;
    for base in [0, b_start] {
        for i in 0..cluster {
            // Spanning chain keeps each cluster connected
            if i > 0 {
                graph.add_edge(base + i - 1, base + i, rng.weight(20))?;
            }
            for _ in 0..4u64.min(cluster - 1) {
                let target = rng.next(cluster);
                if target != i {
                    graph.add_edge(base + i, base + target, rng.weight(20))?;
                }
            }
        }
    }

    // Bridge: last node of cluster A → bridge chain → first node of cluster B
    let mut prev = cluster - 1;
    for id in cluster..b_start {
        graph.add_edge(prev, id, 1.0)?;
        prev = id;
    }
    if prev != b_start {
        graph.add_edge(prev, b_start, 1.0)?;
    }

    Ok(graph)
}

/// Weighted chain 0 -- 1 -- ... -- n-1: worst case for path length.
pub fn gen_chain(node_count: u64, seed: u64) -> GenResult {
    let mut graph = with_nodes(node_count);
    let mut rng = FastRng::new(seed.wrapping_add(77777));
    for i in 1..node_count {
        graph.add_edge(i - 1, i, rng.weight(5))?;
    }
    Ok(graph)
}
