//! Casing shapes
//!
//! A casing decides which grid points are playable, where the circular helper
//! rings sit, where the start ramp enters and which nodes anchor the path to
//! the mounting structure. Shapes are a closed set, so [`Casing`] is an enum
//! that dispatches to the per-shape [`CasingShape`] implementations.

mod box_casing;
mod cylinder;
mod ellipsoid;
mod sphere;

pub use box_casing::BoxCasing;
pub use cylinder::CylinderCasing;
pub use ellipsoid::EllipsoidCasing;
pub use sphere::SphereCasing;

use crate::lattice::Lattice;
use marblemaze_core::{LatticeError, Node, NodeId, Result};
use marblemaze_settings::CasingSettings;
use tracing::info;

/// Shape-dependent tweaks to the path finder's adjacency rules.
///
/// The path finder never inspects the casing type; it only reads these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjacencyRules {
    /// Only allow circular→rectangular bridges from ring nodes lying on the
    /// x or y axis
    pub axis_locked_ring_bridges: bool,
}

/// Contract shared by all casing shapes.
pub trait CasingShape {
    /// Shape name for logging.
    fn name(&self) -> &'static str;

    /// Lattice pitch the casing was configured with.
    fn pitch(&self) -> f64;

    /// True when a node cube centred on the point fits inside the casing.
    fn contains_point(&self, x: f64, y: f64, z: f64) -> bool;

    /// Build the lattice: grid nodes, helper rings and start ramp.
    fn create_nodes(&self) -> Result<Lattice>;

    /// Target positions for the mounting waypoints.
    fn mounting_targets(&self) -> Vec<(f64, f64, f64)>;

    /// Extra restriction on which nodes may serve as mounting waypoints.
    fn accepts_mounting_node(&self, _node: &Node) -> bool {
        true
    }

    /// Adjacency capabilities of this shape.
    fn adjacency_rules(&self) -> AdjacencyRules {
        AdjacencyRules::default()
    }

    /// Flag the nearest free node of each mounting target as `mounting` + `waypoint`.
    fn get_mounting_waypoints(&self, lattice: &mut Lattice) -> Vec<NodeId> {
        let targets = self.mounting_targets();
        let claimed = lattice.claim_mounting_targets(&targets, |n| self.accepts_mounting_node(n));
        info!(
            casing = self.name(),
            requested = targets.len(),
            claimed = claimed.len(),
            "mounting waypoints defined"
        );
        claimed
    }
}

/// A configured casing.
#[derive(Debug, Clone, PartialEq)]
pub enum Casing {
    Sphere(SphereCasing),
    Box(BoxCasing),
    Cylinder(CylinderCasing),
    Ellipsoid(EllipsoidCasing),
}

impl Casing {
    /// Build a casing from its settings and the lattice pitch.
    pub fn from_settings(settings: &CasingSettings, pitch: f64) -> Result<Self> {
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(LatticeError::InvalidDimension {
                name: "node_size".to_string(),
                value: pitch,
            }
            .into());
        }

        let casing = match *settings {
            CasingSettings::Sphere {
                diameter,
                shell_thickness,
                mounting_points,
            } => Casing::Sphere(SphereCasing::new(
                diameter,
                shell_thickness,
                mounting_points,
                pitch,
            )),
            CasingSettings::Box {
                width,
                height,
                length,
                panel_thickness,
            } => Casing::Box(BoxCasing::new(width, height, length, panel_thickness, pitch)),
            CasingSettings::Cylinder {
                diameter,
                height,
                shell_thickness,
                mounting_points,
            } => Casing::Cylinder(CylinderCasing::new(
                diameter,
                height,
                shell_thickness,
                mounting_points,
                pitch,
            )),
            CasingSettings::Ellipsoid {
                diameter_x,
                diameter_y,
                diameter_z,
                shell_thickness,
                mounting_points,
            } => Casing::Ellipsoid(EllipsoidCasing::new(
                (diameter_x, diameter_y, diameter_z),
                shell_thickness,
                mounting_points,
                pitch,
            )),
        };
        Ok(casing)
    }

    fn shape(&self) -> &dyn CasingShape {
        match self {
            Casing::Sphere(c) => c,
            Casing::Box(c) => c,
            Casing::Cylinder(c) => c,
            Casing::Ellipsoid(c) => c,
        }
    }

    /// Shape name for logging.
    pub fn name(&self) -> &'static str {
        self.shape().name()
    }

    /// See [`CasingShape::contains_point`].
    pub fn contains_point(&self, x: f64, y: f64, z: f64) -> bool {
        self.shape().contains_point(x, y, z)
    }

    /// See [`CasingShape::create_nodes`].
    pub fn create_nodes(&self) -> Result<Lattice> {
        let lattice = self.shape().create_nodes()?;
        info!(
            casing = self.name(),
            nodes = lattice.len(),
            circular = lattice.circular_nodes().len(),
            "lattice created"
        );
        Ok(lattice)
    }

    /// See [`CasingShape::get_mounting_waypoints`].
    pub fn get_mounting_waypoints(&self, lattice: &mut Lattice) -> Vec<NodeId> {
        self.shape().get_mounting_waypoints(lattice)
    }

    /// See [`CasingShape::adjacency_rules`].
    pub fn adjacency_rules(&self) -> AdjacencyRules {
        self.shape().adjacency_rules()
    }
}

pub(crate) fn half_diagonal(pitch: f64) -> f64 {
    pitch * 3f64.sqrt() / 2.0
}

pub(crate) fn ring_targets(radius: f64, count: usize, phase: f64) -> Vec<(f64, f64, f64)> {
    (0..count)
        .map(|i| {
            let angle = i as f64 * 2.0 * std::f64::consts::PI / count as f64 + phase;
            (radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect()
}
