use super::{half_diagonal, ring_targets, CasingShape};
use crate::lattice::{Lattice, RingSpec};
use marblemaze_core::geometry::pitch_multiples;
use marblemaze_core::{Node, Result};

/// Ellipsoid centred at the origin with independent semi-axes.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsoidCasing {
    pub diameters: (f64, f64, f64),
    pub shell_thickness: f64,
    pub mounting_points: usize,
    pitch: f64,
}

impl EllipsoidCasing {
    pub fn new(
        diameters: (f64, f64, f64),
        shell_thickness: f64,
        mounting_points: usize,
        pitch: f64,
    ) -> Self {
        Self {
            diameters,
            shell_thickness,
            mounting_points,
            pitch,
        }
    }

    /// Inner semi-axes (x, y, z).
    pub fn inner_radii(&self) -> (f64, f64, f64) {
        let (dx, dy, dz) = self.diameters;
        (
            dx / 2.0 - self.shell_thickness,
            dy / 2.0 - self.shell_thickness,
            dz / 2.0 - self.shell_thickness,
        )
    }

    fn effective_radii(&self) -> (f64, f64, f64) {
        let (rx, ry, rz) = self.inner_radii();
        let h = half_diagonal(self.pitch);
        ((rx - h).max(0.0), (ry - h).max(0.0), (rz - h).max(0.0))
    }
}

impl CasingShape for EllipsoidCasing {
    fn name(&self) -> &'static str {
        "ellipsoid"
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn contains_point(&self, x: f64, y: f64, z: f64) -> bool {
        let (ex, ey, ez) = self.effective_radii();
        if ex <= 0.0 || ey <= 0.0 || ez <= 0.0 {
            return false;
        }
        (x * x) / (ex * ex) + (y * y) / (ey * ey) + (z * z) / (ez * ez) <= 1.0
    }

    fn create_nodes(&self) -> Result<Lattice> {
        let (ex, ey, ez) = self.effective_radii();
        let xs = pitch_multiples(ex, self.pitch);
        let ys = pitch_multiples(ey, self.pitch);
        let zs = pitch_multiples(ez, self.pitch);
        let mut lattice = Lattice::from_grid(self.pitch, self.name(), &xs, &ys, &zs, |x, y, z| {
            self.contains_point(x, y, z)
        })?;

        let (rx, ry, _) = self.inner_radii();
        let axis_x = rx - self.pitch;
        let axis_y = ry - self.pitch;
        if axis_x > 0.0 && axis_y > 0.0 {
            let ring = RingSpec::ellipse(axis_x, axis_y, self.mounting_points);
            let added = lattice.add_ring_nodes_on_planes(&ring, &[0.0]);
            lattice.remove_rectangular_nodes_close_to(&added, self.pitch, &[0.0]);
        }

        lattice.place_start_node_along_negative_x(0.0, 0.0);
        Ok(lattice)
    }

    fn mounting_targets(&self) -> Vec<(f64, f64, f64)> {
        let (rx, ry, _) = self.inner_radii();
        let radius = (rx.min(ry) - self.pitch * 0.5).max(self.pitch);
        ring_targets(radius, self.mounting_points, 0.0)
    }

    fn accepts_mounting_node(&self, node: &Node) -> bool {
        node.in_circular_grid
    }
}
