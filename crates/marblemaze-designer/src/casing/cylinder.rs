use super::{ring_targets, AdjacencyRules, CasingShape};
use crate::lattice::Lattice;
use marblemaze_core::geometry::pitch_multiples;
use marblemaze_core::Result;

/// Upright cylinder centred at the origin, axis along z.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderCasing {
    pub diameter: f64,
    pub height: f64,
    pub shell_thickness: f64,
    pub mounting_points: usize,
    pitch: f64,
}

impl CylinderCasing {
    pub fn new(
        diameter: f64,
        height: f64,
        shell_thickness: f64,
        mounting_points: usize,
        pitch: f64,
    ) -> Self {
        Self {
            diameter,
            height,
            shell_thickness,
            mounting_points,
            pitch,
        }
    }

    pub fn inner_radius(&self) -> f64 {
        self.diameter / 2.0 - self.shell_thickness
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0 - self.shell_thickness
    }

    // node cube clearance: half the square diagonal radially, half a pitch axially
    fn effective_radius(&self) -> f64 {
        self.inner_radius() - self.pitch * std::f64::consts::FRAC_1_SQRT_2
    }

    fn effective_half_height(&self) -> f64 {
        self.half_height() - self.pitch / 2.0
    }

    fn ring_radius(&self) -> f64 {
        self.inner_radius() - self.pitch
    }
}

impl CasingShape for CylinderCasing {
    fn name(&self) -> &'static str {
        "cylinder"
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn contains_point(&self, x: f64, y: f64, z: f64) -> bool {
        let r = self.effective_radius();
        r > 0.0 && x * x + y * y <= r * r && z.abs() <= self.effective_half_height()
    }

    fn create_nodes(&self) -> Result<Lattice> {
        let radial = pitch_multiples(self.effective_radius(), self.pitch);
        let axial = pitch_multiples(self.effective_half_height(), self.pitch);
        let mut lattice = Lattice::from_grid(self.pitch, self.name(), &radial, &radial, &axial, |x, y, z| {
            self.contains_point(x, y, z)
        })?;

        let ring = lattice.add_circular_nodes_on_planes(self.ring_radius(), &[0.0], self.mounting_points);
        lattice.remove_rectangular_nodes_close_to(&ring, self.pitch, &[0.0]);

        lattice.place_start_node_along_negative_x(0.0, 0.0);
        Ok(lattice)
    }

    fn mounting_targets(&self) -> Vec<(f64, f64, f64)> {
        ring_targets(self.ring_radius(), self.mounting_points, 0.0)
    }

    fn adjacency_rules(&self) -> AdjacencyRules {
        AdjacencyRules {
            axis_locked_ring_bridges: true,
        }
    }
}
