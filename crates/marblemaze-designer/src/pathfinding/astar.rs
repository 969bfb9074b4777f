//! A* search over the lattice.
//!
//! Search state lives in a [`SearchScratch`] built per query, so the lattice
//! nodes carry no `g`/`f`/`parent` fields and never need resetting.

use super::neighbors::Adjacency;
use crate::lattice::Lattice;
use marblemaze_core::geometry::manhattan_distance;
use marblemaze_core::NodeId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

/// Entry of the open set
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    id: NodeId,
    f_cost: f64,
    // insertion counter, breaks f ties first-in first-out
    seq: u64,
}

impl Eq for OpenNode {}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-query search state, indexed by node id.
#[derive(Debug, Clone)]
pub struct SearchScratch {
    g: Vec<f64>,
    f: Vec<f64>,
    parent: Vec<Option<NodeId>>,
    closed: Vec<bool>,
}

impl SearchScratch {
    pub fn new(len: usize) -> Self {
        Self {
            g: vec![f64::INFINITY; len],
            f: vec![f64::INFINITY; len],
            parent: vec![None; len],
            closed: vec![false; len],
        }
    }

    /// Best known cost from the start, `INFINITY` when unreached.
    pub fn g(&self, id: NodeId) -> f64 {
        self.g[id.0]
    }

    fn reconstruct(&self, goal: NodeId) -> Vec<NodeId> {
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(prev) = self.parent[current.0] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        path
    }
}

/// A* path finder.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder {
    adjacency: Adjacency,
}

impl PathFinder {
    pub fn new(adjacency: Adjacency) -> Self {
        Self { adjacency }
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Shortest path from `start` to `goal`, both ends included.
    ///
    /// Waypoints and occupied nodes may only be entered when they are the
    /// goal. Returns `None` when the goal is unreachable or either id is
    /// unknown.
    pub fn find_path(&self, lattice: &Lattice, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
        lattice.get(start)?;
        let goal_pos = lattice.get(goal)?.coords();
        if start == goal {
            return Some(vec![start]);
        }

        let mut scratch = SearchScratch::new(lattice.len());
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;

        let h = manhattan_distance(lattice.node(start).coords(), goal_pos);
        scratch.g[start.0] = 0.0;
        scratch.f[start.0] = h;
        open.push(OpenNode {
            id: start,
            f_cost: h,
            seq,
        });

        let mut expanded = 0usize;
        while let Some(OpenNode { id: current, f_cost, .. }) = open.pop() {
            if current == goal {
                trace!(expanded, "path found");
                return Some(scratch.reconstruct(goal));
            }
            if scratch.closed[current.0] || f_cost > scratch.f[current.0] {
                continue;
            }
            scratch.closed[current.0] = true;
            expanded += 1;

            for (neighbor, cost) in lattice.neighbors_at(current, &self.adjacency) {
                if scratch.closed[neighbor.0] {
                    continue;
                }
                let n = lattice.node(neighbor);
                if neighbor != goal && (n.waypoint || n.occupied) {
                    continue;
                }

                let tentative = scratch.g[current.0] + cost;
                if tentative < scratch.g[neighbor.0] {
                    let f = tentative + manhattan_distance(n.coords(), goal_pos);
                    scratch.g[neighbor.0] = tentative;
                    scratch.f[neighbor.0] = f;
                    scratch.parent[neighbor.0] = Some(current);
                    seq += 1;
                    open.push(OpenNode {
                        id: neighbor,
                        f_cost: f,
                        seq,
                    });
                }
            }
        }

        trace!(expanded, "no path");
        None
    }
}
