//! Waypoint ordering, obstacle teleport and end-trim
//!
//! Mounting waypoints are mandatory. Non-mounting waypoints are spread over
//! the gaps before, between and after the mounting visits, aiming at
//! `non_mounting / (mounting + 1)` waypoints per gap. Within the chosen type
//! the candidates are tried nearest-first until A* reaches one.

use super::astar::PathFinder;
use crate::lattice::Lattice;
use crate::obstacles::PlacedObstacle;
use marblemaze_core::geometry::euclidean_distance;
use marblemaze_core::{NodeId, PathError, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Waypoint category the policy asks for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointKind {
    Mounting,
    NonMounting,
}

impl WaypointKind {
    fn other(self) -> Self {
        match self {
            Self::Mounting => Self::NonMounting,
            Self::NonMounting => Self::Mounting,
        }
    }
}

/// Decides which waypoint category to visit next.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPolicy {
    target_per_gap: f64,
    gap_count: usize,
    last_was_mounting: bool,
}

impl DistributionPolicy {
    pub fn new(mounting: usize, non_mounting: usize) -> Self {
        Self {
            target_per_gap: non_mounting as f64 / (mounting + 1) as f64,
            gap_count: 0,
            last_was_mounting: false,
        }
    }

    /// Preferred category given the waypoints still unvisited.
    pub fn next_kind(&self, mounting_left: usize, non_mounting_left: usize) -> WaypointKind {
        if mounting_left == 0 {
            return WaypointKind::NonMounting;
        }
        if non_mounting_left == 0 {
            return WaypointKind::Mounting;
        }
        if self.last_was_mounting {
            return WaypointKind::NonMounting;
        }
        if mounting_left == 1 && non_mounting_left > 1 {
            return WaypointKind::Mounting;
        }
        if self.gap_count as f64 >= self.target_per_gap {
            WaypointKind::Mounting
        } else {
            WaypointKind::NonMounting
        }
    }

    /// Record a completed visit.
    pub fn record(&mut self, kind: WaypointKind) {
        match kind {
            WaypointKind::Mounting => {
                self.gap_count = 0;
                self.last_was_mounting = true;
            }
            WaypointKind::NonMounting => {
                self.gap_count += 1;
                self.last_was_mounting = false;
            }
        }
    }
}

/// Result of [`PathFinder::connect_waypoints`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathPlan {
    /// Ordered ball path, starting at the puzzle start node
    pub total_path: Vec<NodeId>,
    /// Waypoints in visiting order (obstacle exits excluded)
    pub visited: Vec<NodeId>,
    /// Mounting waypoints that could not be reached
    pub missed_mounting: Vec<NodeId>,
    /// Nodes removed by the end-trim
    pub trimmed: usize,
}

impl PathPlan {
    pub fn is_empty(&self) -> bool {
        self.total_path.is_empty()
    }
}

impl PathFinder {
    /// Route one continuous path from the start node through the waypoints.
    ///
    /// Every node of a successful leg is marked occupied. Unreachable
    /// waypoints are logged, not raised; zero waypoints yields an empty plan.
    pub fn connect_waypoints(
        &self,
        lattice: &mut Lattice,
        obstacles: &[PlacedObstacle],
    ) -> Result<PathPlan> {
        let waypoints = lattice.waypoints();
        if waypoints.is_empty() {
            info!("no waypoints to connect");
            return Ok(PathPlan::default());
        }
        let start = lattice.start_node().ok_or(PathError::NoStartNode)?;

        let (mut mounting, mut non_mounting): (Vec<NodeId>, Vec<NodeId>) = waypoints
            .into_iter()
            .filter(|&id| id != start)
            .partition(|&id| lattice.node(id).mounting);

        let mut policy = DistributionPolicy::new(mounting.len(), non_mounting.len());
        let mut plan = PathPlan {
            total_path: vec![start],
            ..PathPlan::default()
        };
        lattice.node_mut(start).occupied = true;
        let mut current = start;

        while !mounting.is_empty() || !non_mounting.is_empty() {
            let preferred = policy.next_kind(mounting.len(), non_mounting.len());

            let mut leg = None;
            for kind in [preferred, preferred.other()] {
                let pool = match kind {
                    WaypointKind::Mounting => &mounting,
                    WaypointKind::NonMounting => &non_mounting,
                };
                if let Some((target, path)) = self.reach_nearest(lattice, current, pool) {
                    if kind != preferred {
                        debug!(?preferred, fallback = ?kind, "falling back to other waypoint type");
                    }
                    leg = Some((kind, target, path));
                    break;
                }
            }

            let Some((kind, target, path)) = leg else {
                warn!(
                    mounting_left = mounting.len(),
                    non_mounting_left = non_mounting.len(),
                    "no more reachable waypoints"
                );
                break;
            };

            match kind {
                WaypointKind::Mounting => mounting.retain(|&id| id != target),
                WaypointKind::NonMounting => non_mounting.retain(|&id| id != target),
            }
            policy.record(kind);

            for &id in &path[1..] {
                lattice.node_mut(id).occupied = true;
                plan.total_path.push(id);
            }
            plan.visited.push(target);
            current = target;

            if let Some(obstacle) = obstacles.iter().find(|o| o.entry == target) {
                debug!(obstacle = %obstacle.name, entry = %obstacle.entry, exit = %obstacle.exit, "obstacle teleport");
                plan.total_path.push(obstacle.exit);
                current = obstacle.exit;
            }
        }

        plan.trimmed = trim_path_end(lattice, &mut plan, obstacles);

        if let Some(&end) = plan.total_path.last() {
            lattice.node_mut(end).puzzle_end = true;
        }

        for &id in &mounting {
            let node = lattice.node(id);
            warn!(node = %id, position = %node, "mounting waypoint missed");
        }
        plan.missed_mounting = mounting;

        info!(
            nodes = plan.total_path.len(),
            visited = plan.visited.len(),
            missed_mounting = plan.missed_mounting.len(),
            trimmed = plan.trimmed,
            "waypoints connected"
        );
        Ok(plan)
    }

    /// Try the pool nearest-first (Euclidean, ties by id) until A* reaches one.
    fn reach_nearest(
        &self,
        lattice: &Lattice,
        from: NodeId,
        pool: &[NodeId],
    ) -> Option<(NodeId, Vec<NodeId>)> {
        let origin = lattice.node(from).coords();
        let mut ordered: Vec<(f64, NodeId)> = pool
            .iter()
            .map(|&id| (euclidean_distance(origin, lattice.node(id).coords()), id))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        ordered
            .into_iter()
            .find_map(|(_, target)| self.find_path(lattice, from, target).map(|p| (target, p)))
    }
}

/// Cut the path after the first non-mounting waypoint that follows the last
/// mounting waypoint. Returns the number of nodes removed.
fn trim_path_end(lattice: &mut Lattice, plan: &mut PathPlan, obstacles: &[PlacedObstacle]) -> usize {
    let path = &plan.total_path;
    let Some(last_mounting) = path.iter().rposition(|&id| lattice.node(id).mounting) else {
        return 0;
    };

    let Some(offset) = path[last_mounting + 1..].iter().position(|&id| {
        let n = lattice.node(id);
        n.waypoint && !n.mounting
    }) else {
        return 0;
    };
    let mut keep = last_mounting + 1 + offset + 1;

    // an obstacle entry keeps its teleported exit
    let cut_node = path[keep - 1];
    if let Some(obstacle) = obstacles.iter().find(|o| o.entry == cut_node) {
        if path.get(keep) == Some(&obstacle.exit) {
            keep += 1;
        }
    }

    if keep >= path.len() {
        return 0;
    }

    let removed: Vec<NodeId> = plan.total_path.split_off(keep);
    for &id in &removed {
        let node = lattice.node_mut(id);
        if node.obstacle.is_none() {
            node.occupied = false;
        }
    }
    plan.visited.retain(|id| !removed.contains(id));
    debug!(removed = removed.len(), "path end trimmed");
    removed.len()
}
