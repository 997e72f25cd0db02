//! Priority selection over the set of not-yet-finalized nodes.
//!
//! Both frontiers order entries by `(distance, node)`: the smallest tentative
//! distance wins and equal distances fall back to the node's `Ord`. The two
//! implementations therefore always select the same node.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, Weight};

/// Selection order shared by every frontier.
fn entry_cmp<N: Ord>(a_dist: Weight, a_node: &N, b_dist: Weight, b_node: &N) -> Ordering {
    a_dist.total_cmp(&b_dist).then_with(|| a_node.cmp(b_node))
}

/// The set of nodes whose distance is not yet final.
pub trait Frontier<N: NodeId> {
    /// Insert `node` with tentative distance `dist`. If the node is already
    /// present this behaves like [`Frontier::decrease`].
    fn push(&mut self, node: N, dist: Weight);

    /// Lower the tentative distance of `node`. Returns false (and changes
    /// nothing) if the node is absent or `dist` is not an improvement.
    fn decrease(&mut self, node: &N, dist: Weight) -> bool;

    /// Remove and return the node with the smallest `(distance, node)`.
    fn pop_min(&mut self) -> Option<(N, Weight)>;

    fn contains(&self, node: &N) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which frontier implementation the solver drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selector {
    /// Binary heap with decrease-key: O((V + E) log V) per solve.
    #[default]
    IndexedHeap,
    /// Linear scan per selection: O(V²) per solve. Small graphs only.
    LinearScan,
}

impl Selector {
    pub fn as_str(self) -> &'static str {
        match self {
            Selector::IndexedHeap => "indexed-heap",
            Selector::LinearScan => "linear-scan",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indexed-heap" | "heap" => Ok(Selector::IndexedHeap),
            "linear-scan" | "scan" => Ok(Selector::LinearScan),
            other => Err(format!(
                "invalid selector '{}': use 'indexed-heap' or 'linear-scan'",
                other
            )),
        }
    }
}

/// Indexed binary min-heap.
///
/// `index[node]` is the node's slot in `heap`; every swap keeps it in sync so
/// decrease-key can find the entry in O(1) and sift it up in O(log V).
#[derive(Debug)]
pub struct IndexedHeap<N> {
    heap: Vec<(Weight, N)>,
    index: HashMap<N, usize>,
}

impl<N: NodeId> IndexedHeap<N> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn precedes(&self, a: usize, b: usize) -> bool {
        let (ad, an) = &self.heap[a];
        let (bd, bn) = &self.heap[b];
        entry_cmp(*ad, an, *bd, bn) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        if let Some(slot) = self.index.get_mut(&self.heap[a].1) {
            *slot = a;
        }
        if let Some(slot) = self.index.get_mut(&self.heap[b].1) {
            *slot = b;
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.precedes(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && self.precedes(left, smallest) {
                smallest = left;
            }
            if right < len && self.precedes(right, smallest) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }
}

impl<N: NodeId> Default for IndexedHeap<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> Frontier<N> for IndexedHeap<N> {
    fn push(&mut self, node: N, dist: Weight) {
        if self.index.contains_key(&node) {
            self.decrease(&node, dist);
            return;
        }
        let pos = self.heap.len();
        self.heap.push((dist, node.clone()));
        self.index.insert(node, pos);
        self.sift_up(pos);
    }

    fn decrease(&mut self, node: &N, dist: Weight) -> bool {
        let Some(&pos) = self.index.get(node) else {
            return false;
        };
        if dist.total_cmp(&self.heap[pos].0) != Ordering::Less {
            return false;
        }
        self.heap[pos].0 = dist;
        self.sift_up(pos);
        true
    }

    fn pop_min(&mut self) -> Option<(N, Weight)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let (dist, node) = self.heap.pop()?;
        self.index.remove(&node);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((node, dist))
    }

    fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Unordered frontier scanned in full on every selection.
///
/// O(V) per `pop_min`, so a solve is O(V²). Kept for small graphs and as a
/// cross-check for [`IndexedHeap`].
#[derive(Debug)]
pub struct ScanFrontier<N> {
    entries: Vec<(N, Weight)>,
    index: HashMap<N, usize>,
}

impl<N: NodeId> ScanFrontier<N> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }
}

impl<N: NodeId> Default for ScanFrontier<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> Frontier<N> for ScanFrontier<N> {
    fn push(&mut self, node: N, dist: Weight) {
        if self.index.contains_key(&node) {
            self.decrease(&node, dist);
            return;
        }
        self.index.insert(node.clone(), self.entries.len());
        self.entries.push((node, dist));
    }

    fn decrease(&mut self, node: &N, dist: Weight) -> bool {
        let Some(&pos) = self.index.get(node) else {
            return false;
        };
        let entry = &mut self.entries[pos];
        if dist.total_cmp(&entry.1) != Ordering::Less {
            return false;
        }
        entry.1 = dist;
        true
    }

    fn pop_min(&mut self) -> Option<(N, Weight)> {
        let best = self
            .entries
            .iter()
            .enumerate()
            .min_by(|(_, (an, ad)), (_, (bn, bd))| entry_cmp(*ad, an, *bd, bn))
            .map(|(i, _)| i)?;

        let (node, dist) = self.entries.swap_remove(best);
        self.index.remove(&node);
        // swap_remove moved the former last entry into `best`
        if let Some((moved, _)) = self.entries.get(best) {
            if let Some(slot) = self.index.get_mut(moved) {
                *slot = best;
            }
        }
        Some((node, dist))
    }

    fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
