use super::CasingShape;
use crate::lattice::Lattice;
use marblemaze_core::geometry::pitch_multiples;
use marblemaze_core::Result;

/// Rectangular box assembled from panels.
///
/// `width` runs along x, `length` along y and `height` along z.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCasing {
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub panel_thickness: f64,
    pitch: f64,
}

impl BoxCasing {
    pub fn new(width: f64, height: f64, length: f64, panel_thickness: f64, pitch: f64) -> Self {
        Self {
            width,
            height,
            length,
            panel_thickness,
            pitch,
        }
    }

    /// Inner half extents (x, y, z).
    pub fn inner_half_extents(&self) -> (f64, f64, f64) {
        (
            self.width / 2.0 - self.panel_thickness,
            self.length / 2.0 - self.panel_thickness,
            self.height / 2.0 - self.panel_thickness,
        )
    }

    fn effective_half_extents(&self) -> (f64, f64, f64) {
        let (hw, hl, hh) = self.inner_half_extents();
        let margin = self.pitch / 2.0;
        (hw - margin, hl - margin, hh - margin)
    }
}

impl CasingShape for BoxCasing {
    fn name(&self) -> &'static str {
        "box"
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn contains_point(&self, x: f64, y: f64, z: f64) -> bool {
        let (ex, ey, ez) = self.effective_half_extents();
        x.abs() <= ex && y.abs() <= ey && z.abs() <= ez
    }

    fn create_nodes(&self) -> Result<Lattice> {
        let (ex, ey, ez) = self.effective_half_extents();
        let xs = pitch_multiples(ex, self.pitch);
        let ys = pitch_multiples(ey, self.pitch);
        let zs = pitch_multiples(ez, self.pitch);

        let mut lattice = Lattice::from_grid(self.pitch, self.name(), &xs, &ys, &zs, |x, y, z| {
            self.contains_point(x, y, z)
        })?;

        // enter along the bottom front edge
        let prefer_y = lattice.axis_values(1).first().copied().unwrap_or(0.0);
        let prefer_z = lattice.axis_values(2).first().copied().unwrap_or(0.0);
        lattice.place_start_node_along_negative_x(prefer_y, prefer_z);
        Ok(lattice)
    }

    fn mounting_targets(&self) -> Vec<(f64, f64, f64)> {
        let (hw, hl, hh) = self.inner_half_extents();
        vec![
            (0.0, -hl, 0.0),
            (0.0, hl, 0.0),
            (hw, 0.0, 0.0),
            (-hw, 0.0, 0.0),
            (0.0, 0.0, hh),
            (0.0, 0.0, -hh),
        ]
    }
}
