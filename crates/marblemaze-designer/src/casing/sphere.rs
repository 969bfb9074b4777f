use super::{half_diagonal, ring_targets, CasingShape};
use crate::lattice::Lattice;
use marblemaze_core::geometry::pitch_multiples;
use marblemaze_core::{Node, Result};

/// Hollow sphere centred at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereCasing {
    pub diameter: f64,
    pub shell_thickness: f64,
    pub mounting_points: usize,
    pitch: f64,
}

impl SphereCasing {
    pub fn new(diameter: f64, shell_thickness: f64, mounting_points: usize, pitch: f64) -> Self {
        Self {
            diameter,
            shell_thickness,
            mounting_points,
            pitch,
        }
    }

    /// Radius of the playable volume.
    pub fn inner_radius(&self) -> f64 {
        self.diameter / 2.0 - self.shell_thickness
    }

    fn effective_radius(&self) -> f64 {
        self.inner_radius() - half_diagonal(self.pitch)
    }

    fn ring_radius(&self) -> f64 {
        (self.diameter - 2.0 * self.shell_thickness - 2.0 * self.pitch) / 2.0
    }
}

impl CasingShape for SphereCasing {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn contains_point(&self, x: f64, y: f64, z: f64) -> bool {
        let r = self.effective_radius();
        r > 0.0 && x * x + y * y + z * z <= r * r
    }

    fn create_nodes(&self) -> Result<Lattice> {
        let axis = pitch_multiples(self.effective_radius(), self.pitch);
        let mut lattice = Lattice::from_grid(self.pitch, self.name(), &axis, &axis, &axis, |x, y, z| {
            self.contains_point(x, y, z)
        })?;

        let ring = lattice.add_circular_nodes_on_planes(self.ring_radius(), &[0.0], self.mounting_points);
        lattice.remove_rectangular_nodes_close_to(&ring, self.pitch, &[0.0]);

        lattice.place_start_node_along_negative_x(0.0, 0.0);
        Ok(lattice)
    }

    fn mounting_targets(&self) -> Vec<(f64, f64, f64)> {
        ring_targets(
            self.inner_radius() + self.pitch,
            self.mounting_points,
            std::f64::consts::PI,
        )
    }

    fn accepts_mounting_node(&self, node: &Node) -> bool {
        node.z.abs() < 1e-9
    }
}
