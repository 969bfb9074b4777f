//! Node lattice
//!
//! The lattice is an arena of [`Node`]s addressed by [`NodeId`] together with
//! a quantized coordinate index. Casings fill it with rectangular grid nodes,
//! optionally overlay circular (or elliptical) rings, and append the start
//! ramp. Node removal only happens during construction and renumbers the
//! arena; after [`crate::casing::Casing::create_nodes`] returns, ids are
//! stable for the remainder of a generation run.

use marblemaze_core::geometry::{euclidean_distance, snap, squared_distance};
use marblemaze_core::{GridKey, LatticeError, Node, NodeId, Result};
use nalgebra::Vector3;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Tolerance used when matching nodes to a plane or an axis.
const AXIS_EPSILON: f64 = 1e-3;

/// Axis-aligned bounds of the lattice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl Bounds {
    /// True when the point lies inside the bounds, widened by `eps`.
    pub fn contains(&self, p: &Vector3<f64>, eps: f64) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] - eps && p[axis] <= self.max[axis] + eps)
    }
}

/// Ring overlay parameters for [`Lattice::add_ring_nodes_on_planes`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    /// Semi-axis along x
    pub radius_x: f64,
    /// Semi-axis along y
    pub radius_y: f64,
    /// Number of evenly spaced ring nodes per plane
    pub count: usize,
    /// Tag nodes as elliptical and record their semi-axes
    pub elliptical: bool,
}

impl RingSpec {
    /// A circular ring.
    pub fn circle(radius: f64, count: usize) -> Self {
        Self {
            radius_x: radius,
            radius_y: radius,
            count,
            elliptical: false,
        }
    }

    /// An elliptical ring.
    pub fn ellipse(radius_x: f64, radius_y: f64, count: usize) -> Self {
        Self {
            radius_x,
            radius_y,
            count,
            elliptical: true,
        }
    }

    fn point_at(&self, angle: f64) -> (f64, f64) {
        (
            snap(self.radius_x * angle.cos()),
            snap(self.radius_y * angle.sin()),
        )
    }
}

/// Node arena plus coordinate index for one casing instance.
#[derive(Debug, Clone)]
pub struct Lattice {
    pitch: f64,
    nodes: Vec<Node>,
    index: HashMap<GridKey, NodeId>,
    circular: Vec<NodeId>,
    start_node: Option<NodeId>,
}

impl Lattice {
    /// Create an empty lattice with the given pitch.
    pub fn new(pitch: f64) -> Self {
        Self {
            pitch,
            nodes: Vec::new(),
            index: HashMap::new(),
            circular: Vec::new(),
            start_node: None,
        }
    }

    /// Fill a lattice with every grid point accepted by `contains`.
    ///
    /// Fails fast with [`LatticeError::EmptyLattice`] when nothing is accepted.
    pub fn from_grid(
        pitch: f64,
        casing: &str,
        x_values: &[f64],
        y_values: &[f64],
        z_values: &[f64],
        contains: impl Fn(f64, f64, f64) -> bool,
    ) -> Result<Self> {
        let mut lattice = Self::new(pitch);
        for &x in x_values {
            for &y in y_values {
                for &z in z_values {
                    if contains(x, y, z) {
                        lattice.insert(Node::new(x, y, z));
                    }
                }
            }
        }

        if lattice.is_empty() {
            return Err(LatticeError::EmptyLattice {
                casing: casing.to_string(),
            }
            .into());
        }

        debug!(casing, nodes = lattice.len(), pitch, "rectangular grid created");
        Ok(lattice)
    }

    /// Lattice pitch.
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the lattice has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate over `(id, node)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Mutable node by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Node by id; ids handed out by this lattice are always valid.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Ids of every circular-grid node.
    pub fn circular_nodes(&self) -> &[NodeId] {
        &self.circular
    }

    /// The `puzzle_start` node, once placed.
    pub fn start_node(&self) -> Option<NodeId> {
        self.start_node
    }

    /// Look up the node at a coordinate.
    pub fn find(&self, x: f64, y: f64, z: f64) -> Option<NodeId> {
        self.index.get(&GridKey::new(x, y, z)).copied()
    }

    /// Look up the node for a quantized key.
    pub fn find_key(&self, key: &GridKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Insert a node, returning its id.
    ///
    /// A node whose key already exists is merged into the existing one (grid
    /// memberships are OR-ed) so the index never holds two nodes per key.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let key = node.key();
        if let Some(&existing) = self.index.get(&key) {
            let was_circular = self.nodes[existing.0].in_circular_grid;
            let target = &mut self.nodes[existing.0];
            target.in_rectangular_grid |= node.in_rectangular_grid;
            target.in_circular_grid |= node.in_circular_grid;
            target.in_elliptical_grid |= node.in_elliptical_grid;
            if target.ellipse_axes.is_none() {
                target.ellipse_axes = node.ellipse_axes;
            }
            if !was_circular && node.in_circular_grid {
                self.circular.push(existing);
            }
            return existing;
        }

        let id = NodeId(self.nodes.len());
        if node.in_circular_grid {
            self.circular.push(id);
        }
        self.nodes.push(node);
        self.index.insert(key, id);
        id
    }

    /// Keep only nodes accepted by `keep`, renumbering the arena.
    pub fn retain(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        let old_start = self.start_node;
        let old = std::mem::take(&mut self.nodes);
        self.index.clear();
        self.circular.clear();
        self.start_node = None;

        for (i, node) in old.into_iter().enumerate() {
            if !keep(&node) {
                continue;
            }
            let id = self.insert(node);
            if old_start == Some(NodeId(i)) {
                self.start_node = Some(id);
            }
        }
    }

    /// Nearest node (Euclidean) to a point among nodes accepted by `filter`.
    ///
    /// Ties resolve to the lowest id.
    pub fn nearest(
        &self,
        x: f64,
        y: f64,
        z: f64,
        filter: impl Fn(NodeId, &Node) -> bool,
    ) -> Option<NodeId> {
        let mut best: Option<(f64, NodeId)> = None;
        for (id, node) in self.iter() {
            if !filter(id, node) {
                continue;
            }
            let d = squared_distance(node.coords(), (x, y, z));
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Axis-aligned bounds, `None` for an empty lattice.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.nodes.first()?;
        let mut min = first.position();
        let mut max = min;
        for node in &self.nodes[1..] {
            let p = node.position();
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Some(Bounds { min, max })
    }

    /// Ids of every waypoint.
    pub fn waypoints(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.waypoint)
            .map(|(id, _)| id)
            .collect()
    }

    /// Ids of every mounting node.
    pub fn mounting_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.mounting)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of occupied nodes.
    pub fn occupied_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.occupied).count()
    }

    /// Distinct rectangular-grid values along one axis, ascending.
    pub fn axis_values(&self, axis: usize) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .nodes
            .iter()
            .filter(|n| n.in_rectangular_grid)
            .map(|n| n.position()[axis])
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup_by(|a, b| (*a - *b).abs() < AXIS_EPSILON);
        values
    }

    /// Overlay circular nodes on the given z planes.
    pub fn add_circular_nodes_on_planes(
        &mut self,
        radius: f64,
        z_planes: &[f64],
        count: usize,
    ) -> Vec<NodeId> {
        self.add_ring_nodes_on_planes(&RingSpec::circle(radius, count), z_planes)
    }

    /// Overlay ring nodes on the given z planes.
    ///
    /// Places `count` evenly spaced ring nodes per plane, then adds the points
    /// where the grid's vertical and horizontal lines cross the ring. Crossing
    /// candidates are deduplicated within one pitch and dropped when they fall
    /// within one pitch of a ring node already on that plane. The ring is not
    /// grid-aligned; callers remove overlapping rectangular nodes afterwards
    /// with [`Lattice::remove_rectangular_nodes_close_to`].
    pub fn add_ring_nodes_on_planes(&mut self, ring: &RingSpec, z_planes: &[f64]) -> Vec<NodeId> {
        let mut added = Vec::new();
        if ring.radius_x <= 0.0 || ring.radius_y <= 0.0 {
            return added;
        }

        let tolerance = self.pitch;
        for &z in z_planes {
            for i in 0..ring.count {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / ring.count as f64;
                let (x, y) = ring.point_at(angle);
                added.push(self.insert(self.ring_node(ring, x, y, z)));
            }

            let mut unique: Vec<(f64, f64)> = Vec::new();
            for (x, y) in self.grid_ring_crossings(ring) {
                if unique
                    .iter()
                    .any(|&(ux, uy)| ((x - ux).powi(2) + (y - uy).powi(2)).sqrt() < tolerance)
                {
                    continue;
                }
                unique.push((x, y));
            }

            for (x, y) in unique {
                let too_close = self.circular.iter().any(|&id| {
                    let n = &self.nodes[id.0];
                    (n.z - z).abs() < AXIS_EPSILON
                        && ((x - n.x).powi(2) + (y - n.y).powi(2)).sqrt() < tolerance
                });
                if !too_close {
                    added.push(self.insert(self.ring_node(ring, x, y, z)));
                }
            }
        }

        debug!(
            radius_x = ring.radius_x,
            radius_y = ring.radius_y,
            planes = z_planes.len(),
            added = added.len(),
            "ring nodes added"
        );
        added
    }

    fn ring_node(&self, ring: &RingSpec, x: f64, y: f64, z: f64) -> Node {
        let mut node = Node::circular(x, y, snap(z));
        if ring.elliptical {
            node.in_elliptical_grid = true;
            node.ellipse_axes = Some((ring.radius_x, ring.radius_y));
        }
        node
    }

    fn grid_ring_crossings(&self, ring: &RingSpec) -> Vec<(f64, f64)> {
        let step = self.pitch;
        let tolerance = self.pitch;
        let mut coords = Vec::new();
        let max_steps = (ring.radius_x.max(ring.radius_y) / step).floor() as i64;

        for k in 0..=max_steps {
            let signs: &[f64] = if k == 0 { &[1.0] } else { &[1.0, -1.0] };
            for &sign in signs {
                let offset = k as f64 * step * sign;

                // vertical grid line x = offset
                let t = 1.0 - (offset / ring.radius_x).powi(2);
                if t >= 0.0 {
                    let y = ring.radius_y * t.sqrt();
                    coords.push((snap(offset), snap(y)));
                    if y.abs() >= tolerance {
                        coords.push((snap(offset), snap(-y)));
                    }
                }

                // horizontal grid line y = offset
                let t = 1.0 - (offset / ring.radius_y).powi(2);
                if t >= 0.0 {
                    let x = ring.radius_x * t.sqrt();
                    coords.push((snap(x), snap(offset)));
                    if x.abs() >= tolerance {
                        coords.push((snap(-x), snap(offset)));
                    }
                }
            }
        }
        coords
    }

    /// Remove rectangular nodes on `z_planes` closer than `cutoff` to any reference node.
    pub fn remove_rectangular_nodes_close_to(
        &mut self,
        reference: &[NodeId],
        cutoff: f64,
        z_planes: &[f64],
    ) -> usize {
        let refs: Vec<(f64, f64, f64)> = reference
            .iter()
            .filter_map(|&id| self.get(id))
            .map(Node::coords)
            .collect();
        let before = self.len();

        self.retain(|node| {
            if node.in_circular_grid || node.start_ramp {
                return true;
            }
            if !z_planes.iter().any(|&z| (node.z - z).abs() < AXIS_EPSILON) {
                return true;
            }
            !refs
                .iter()
                .any(|&r| euclidean_distance(node.coords(), r) < cutoff)
        });

        let removed = before - self.len();
        debug!(removed, cutoff, "rectangular nodes removed near ring");
        removed
    }

    /// Append the two start-ramp nodes along -x and mark the outer one `puzzle_start`.
    ///
    /// The ramp continues from the smallest x among nodes on the line
    /// `y = prefer_y, z = prefer_z`, falling back to the global minimum x.
    pub fn place_start_node_along_negative_x(&mut self, prefer_y: f64, prefer_z: f64) -> NodeId {
        let on_axis = self
            .nodes
            .iter()
            .filter(|n| (n.y - prefer_y).abs() < AXIS_EPSILON && (n.z - prefer_z).abs() < AXIS_EPSILON)
            .map(|n| n.x)
            .reduce(f64::min);

        let (min_x, y, z) = match on_axis {
            Some(x) => (x, prefer_y, prefer_z),
            None => self
                .nodes
                .iter()
                .min_by(|a, b| a.x.total_cmp(&b.x))
                .map(|n| (n.x, n.y, n.z))
                .unwrap_or((0.0, prefer_y, prefer_z)),
        };

        let x1 = snap(min_x - self.pitch);
        let x2 = snap(x1 - self.pitch);

        let mut inner = Node::new(x1, y, z);
        inner.start_ramp = true;
        let mut outer = Node::new(x2, y, z);
        outer.start_ramp = true;
        outer.puzzle_start = true;

        self.insert(inner);
        let start = self.insert(outer);
        self.start_node = Some(start);
        debug!(x = x2, y, z, "start node placed");
        start
    }

    /// Claim the nearest free node for each target and flag it as a mounting waypoint.
    ///
    /// A node is free when it is unoccupied, not yet a waypoint, not part of the
    /// start ramp and accepted by `filter`.
    pub fn claim_mounting_targets(
        &mut self,
        targets: &[(f64, f64, f64)],
        filter: impl Fn(&Node) -> bool,
    ) -> Vec<NodeId> {
        let mut claimed = Vec::new();
        for &(x, y, z) in targets {
            let nearest = self.nearest(x, y, z, |_, n| {
                !n.occupied && !n.waypoint && !n.start_ramp && filter(n)
            });
            match nearest {
                Some(id) => {
                    let node = self.node_mut(id);
                    node.mounting = true;
                    node.waypoint = true;
                    claimed.push(id);
                }
                None => {
                    tracing::warn!(x, y, z, "no free node left for mounting target");
                }
            }
        }
        claimed
    }

    /// Pick `count` free nodes as waypoints with Mitchell's best-candidate sampling.
    ///
    /// Each pick samples up to `candidates` free nodes and keeps the one whose
    /// distance to the closest waypoint chosen so far is largest. Occupied,
    /// mounting and start-ramp nodes as well as existing waypoints are never
    /// chosen.
    pub fn select_waypoints<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        candidates: usize,
        rng: &mut R,
    ) -> Vec<NodeId> {
        let mut free: Vec<NodeId> = self
            .iter()
            .filter(|(_, n)| !n.occupied && !n.waypoint && !n.mounting && !n.start_ramp)
            .map(|(id, _)| id)
            .collect();

        let count = if free.len() < count {
            tracing::warn!(requested = count, available = free.len(), "reducing waypoint count");
            free.len()
        } else {
            count
        };

        let mut chosen: Vec<NodeId> = Vec::with_capacity(count);
        for _ in 0..count {
            let sample: Vec<NodeId> = free
                .choose_multiple(rng, candidates.max(1).min(free.len()))
                .copied()
                .collect();

            let mut best: Option<(f64, NodeId)> = None;
            for candidate in sample {
                let p = self.node(candidate).coords();
                let spread = chosen
                    .iter()
                    .map(|&w| euclidean_distance(p, self.node(w).coords()))
                    .fold(f64::INFINITY, f64::min);
                if best.map_or(true, |(d, _)| spread > d) {
                    best = Some((spread, candidate));
                }
            }

            let Some((_, pick)) = best else {
                break;
            };
            self.node_mut(pick).waypoint = true;
            free.retain(|&id| id != pick);
            chosen.push(pick);
        }

        debug!(waypoints = chosen.len(), "random waypoints selected");
        chosen
    }
}
