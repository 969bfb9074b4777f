//! Quarter-turn rotations and grid-snapped placement transforms

use nalgebra::{Matrix3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rotation composed of quarter turns about X, then Y, then Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QuarterTurns {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl QuarterTurns {
    pub fn new(x: u8, y: u8, z: u8) -> Self {
        Self {
            x: x % 4,
            y: y % 4,
            z: z % 4,
        }
    }

    /// Draw one of the 64 rotations (X, Y, Z draws in that order).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let x = rng.gen_range(0..4);
        let y = rng.gen_range(0..4);
        let z = rng.gen_range(0..4);
        Self::new(x, y, z)
    }

    /// Angles in degrees, for logging and placement records.
    pub fn degrees(&self) -> (u16, u16, u16) {
        (
            u16::from(self.x) * 90,
            u16::from(self.y) * 90,
            u16::from(self.z) * 90,
        )
    }

    /// Integer rotation matrix `Rz * Ry * Rx`.
    pub fn matrix(&self) -> Matrix3<i32> {
        let rx = Matrix3::new(1, 0, 0, 0, 0, -1, 0, 1, 0);
        let ry = Matrix3::new(0, 0, 1, 0, 1, 0, -1, 0, 0);
        let rz = Matrix3::new(0, -1, 0, 1, 0, 0, 0, 0, 1);

        let mut m = Matrix3::identity();
        for _ in 0..self.x {
            m = rx * m;
        }
        for _ in 0..self.y {
            m = ry * m;
        }
        for _ in 0..self.z {
            m = rz * m;
        }
        m
    }

    /// Rotate a local grid offset.
    pub fn apply(&self, v: &Vector3<i32>) -> Vector3<i32> {
        self.matrix() * v
    }
}

/// Placement of an obstacle template inside the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTransform {
    pub rotation: QuarterTurns,
    /// World position of the template origin (a pitch multiple)
    pub translation: Vector3<f64>,
    pub pitch: f64,
}

impl ObstacleTransform {
    /// World position of a local grid offset.
    pub fn apply(&self, local: &Vector3<i32>) -> Vector3<f64> {
        let rotated = self.rotation.apply(local);
        self.translation + rotated.cast::<f64>() * self.pitch
    }
}
