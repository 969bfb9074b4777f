//! Lattice node record

use crate::geometry::GridKey;
use crate::path_types::PathCurveType;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Index of a node inside its owning arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a placed obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub usize);

/// A discrete position of the maze lattice.
///
/// Search state (g/h/f/parent) is deliberately absent: the path finder keeps
/// it in a per-query scratch arena.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Blocked for routing (obstacle body or an already routed path)
    pub occupied: bool,
    /// The path finder has to (or may) visit this node
    pub waypoint: bool,
    /// Mandatory waypoint anchoring the path to the mounting structure
    pub mounting: bool,
    pub puzzle_start: bool,
    pub puzzle_end: bool,
    /// One of the two synthetic nodes extending the lattice towards -x
    pub start_ramp: bool,

    pub in_rectangular_grid: bool,
    pub in_circular_grid: bool,
    pub in_elliptical_grid: bool,
    /// Semi-axes (x, y) of the elliptical ring this node lies on
    pub ellipse_axes: Option<(f64, f64)>,

    pub segment_start: bool,
    pub segment_end: bool,

    pub path_curve_type: Option<PathCurveType>,
    pub curve_id: Option<u32>,
    pub used_in_curve: bool,

    /// Back-reference to the obstacle occupying this node
    pub obstacle: Option<ObstacleId>,
}

impl Node {
    /// Create a node on the rectangular grid.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            in_rectangular_grid: true,
            ..Default::default()
        }
    }

    /// Create a node on a circular ring.
    pub fn circular(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            in_circular_grid: true,
            ..Default::default()
        }
    }

    /// Create a free-standing node (stitches, bridges) with no grid membership.
    pub fn detached(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    /// Position as a tuple.
    pub fn coords(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Position as a vector.
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Move the node.
    pub fn set_position(&mut self, p: &Vector3<f64>) {
        self.x = p.x;
        self.y = p.y;
        self.z = p.z;
    }

    /// Quantized lookup key.
    pub fn key(&self) -> GridKey {
        GridKey::new(self.x, self.y, self.z)
    }

    /// Copy the position and grid membership, dropping every other flag.
    pub fn copy_location(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: self.z,
            in_rectangular_grid: self.in_rectangular_grid,
            in_circular_grid: self.in_circular_grid,
            in_elliptical_grid: self.in_elliptical_grid,
            ellipse_axes: self.ellipse_axes,
            ..Default::default()
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}
