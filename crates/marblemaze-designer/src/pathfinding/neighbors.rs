//! Hybrid adjacency over the rectangular and circular grids
//!
//! | Edge kind      | Condition                                                  | Cost      |
//! |----------------|------------------------------------------------------------|-----------|
//! | Cardinal       | exact ±pitch on one axis                                   | pitch     |
//! | Near-cardinal  | circular XOR rectangular, one axis differs, d ≤ 2p − tol   | Euclidean |
//! | Ring           | two nearest same-plane circular nodes                      | Euclidean |
//! | Cross-plane    | nearest circular node on z ± pitch                         | Euclidean |

use crate::casing::AdjacencyRules;
use crate::lattice::Lattice;
use marblemaze_core::geometry::euclidean_distance;
use marblemaze_core::{GridKey, Node, NodeId};
use smallvec::SmallVec;

/// Neighbour list of one node: `(neighbour, edge cost)`.
pub type NeighborList = SmallVec<[(NodeId, f64); 12]>;

/// Adjacency parameters shared by every query of one path-finding run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjacency {
    pub rules: AdjacencyRules,
    /// Absolute tolerance for axis and plane matching (pitch × factor)
    pub tolerance: f64,
}

impl Adjacency {
    pub fn new(rules: AdjacencyRules, pitch: f64, tolerance_factor: f64) -> Self {
        Self {
            rules,
            tolerance: pitch * tolerance_factor,
        }
    }
}

impl Lattice {
    /// Every node reachable from `id` in one hop, with its edge cost.
    ///
    /// Occupancy is not considered here; the search decides which neighbours
    /// may be entered. A neighbour reachable through several edge kinds is
    /// listed once, with the cheapest cost.
    pub fn neighbors_at(&self, id: NodeId, adjacency: &Adjacency) -> NeighborList {
        let mut out = NeighborList::new();
        let Some(node) = self.get(id) else {
            return out;
        };
        let pitch = self.pitch();
        let tol = adjacency.tolerance;

        for (dx, dy, dz) in [
            (pitch, 0.0, 0.0),
            (-pitch, 0.0, 0.0),
            (0.0, pitch, 0.0),
            (0.0, -pitch, 0.0),
            (0.0, 0.0, pitch),
            (0.0, 0.0, -pitch),
        ] {
            if let Some(n) = self.find_key(&GridKey::new(node.x + dx, node.y + dy, node.z + dz)) {
                push_min(&mut out, n, pitch);
            }
        }

        self.near_cardinal_bridges(id, node, adjacency, &mut out);

        if node.in_circular_grid {
            self.ring_neighbors(id, node, tol, &mut out);
            for target_z in [node.z + pitch, node.z - pitch] {
                self.cross_plane_neighbor(id, node, target_z, tol, &mut out);
            }
        }
        out
    }

    fn near_cardinal_bridges(
        &self,
        id: NodeId,
        node: &Node,
        adjacency: &Adjacency,
        out: &mut NeighborList,
    ) {
        let pitch = self.pitch();
        let tol = adjacency.tolerance;
        let max_distance = 2.0 * pitch - tol;

        let mut consider = |cid: NodeId, candidate: &Node| {
            if cid == id || candidate.in_circular_grid == node.in_circular_grid {
                return;
            }
            let deltas = [
                (candidate.x - node.x).abs(),
                (candidate.y - node.y).abs(),
                (candidate.z - node.z).abs(),
            ];
            if deltas.iter().filter(|&&d| d > tol).count() != 1 {
                return;
            }
            if adjacency.rules.axis_locked_ring_bridges
                && node.in_circular_grid
                && node.x.abs() > tol
                && node.y.abs() > tol
            {
                return;
            }
            let distance = euclidean_distance(node.coords(), candidate.coords());
            if distance <= max_distance {
                push_min(out, cid, distance);
            }
        };

        if node.in_circular_grid {
            for (cid, candidate) in self.iter() {
                consider(cid, candidate);
            }
        } else {
            for &cid in self.circular_nodes() {
                consider(cid, self.node(cid));
            }
        }
    }

    fn ring_neighbors(&self, id: NodeId, node: &Node, tol: f64, out: &mut NeighborList) {
        let mut same_plane: SmallVec<[(f64, NodeId); 32]> = self
            .circular_nodes()
            .iter()
            .filter(|&&cid| cid != id)
            .filter_map(|&cid| {
                let c = self.node(cid);
                if (c.z - node.z).abs() > tol {
                    return None;
                }
                let d = euclidean_distance(node.coords(), c.coords());
                (d > tol).then_some((d, cid))
            })
            .collect();
        same_plane.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for &(d, cid) in same_plane.iter().take(2) {
            push_min(out, cid, d);
        }
    }

    fn cross_plane_neighbor(
        &self,
        id: NodeId,
        node: &Node,
        target_z: f64,
        tol: f64,
        out: &mut NeighborList,
    ) {
        let best = self
            .circular_nodes()
            .iter()
            .filter(|&&cid| cid != id)
            .filter(|&&cid| (self.node(cid).z - target_z).abs() <= tol)
            .map(|&cid| (euclidean_distance(node.coords(), self.node(cid).coords()), cid))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        if let Some((d, cid)) = best {
            push_min(out, cid, d);
        }
    }
}

fn push_min(out: &mut NeighborList, id: NodeId, cost: f64) {
    match out.iter_mut().find(|(n, _)| *n == id) {
        Some(entry) => entry.1 = entry.1.min(cost),
        None => out.push((id, cost)),
    }
}
