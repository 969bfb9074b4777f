//! Grid geometry helpers
//!
//! Coordinates are plain `f64` triples. Lattice lookups go through [`GridKey`],
//! which quantizes each axis so that values produced by different float
//! computations (`k * pitch`, `start + i * pitch`, snapped trigonometry) map to
//! the same key.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Number of decimals kept by [`round_coord`] and [`snap`].
pub const COORD_DECIMALS: i32 = 10;

/// Quantization step used by [`GridKey`].
pub const KEY_RESOLUTION: f64 = 1e-7;

/// Values closer to zero than this are snapped to exactly zero.
pub const SNAP_EPSILON: f64 = 1e-9;

/// Round a coordinate to [`COORD_DECIMALS`] decimals.
pub fn round_coord(value: f64) -> f64 {
    let factor = 10f64.powi(COORD_DECIMALS);
    (value * factor).round() / factor
}

/// Round a coordinate and clamp tiny magnitudes (including `-0.0`) to zero.
pub fn snap(value: f64) -> f64 {
    let rounded = round_coord(value);
    if rounded.abs() < SNAP_EPSILON {
        0.0
    } else {
        rounded
    }
}

/// Inclusive float range from `start` to `stop` with the given step.
///
/// Each value is computed as `start + i * step` rather than accumulated. The
/// end point is accepted within a rounding tolerance and never exceeded, so
/// `frange(0.0, 1.0, 0.1)` yields eleven values ending in `1.0` and
/// `frange(0.0, 1.0, 0.6)` stops at `0.6`.
pub fn frange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    let tolerance = step * 1e-9;
    let mut values = Vec::new();
    let mut i = 0u64;
    loop {
        let value = start + i as f64 * step;
        if value > stop + tolerance {
            break;
        }
        values.push(snap(value).min(stop));
        i += 1;
    }
    values
}

/// Integer multiples of `pitch` lying in `[-extent, extent]`.
///
/// Used for lattice axes so every rectangular node sits on an exact pitch
/// multiple, symmetric around the origin.
pub fn pitch_multiples(extent: f64, pitch: f64) -> Vec<f64> {
    if pitch <= 0.0 || extent < 0.0 || !extent.is_finite() {
        return Vec::new();
    }
    let steps = (extent / pitch + 1e-9).floor() as i64;
    (-steps..=steps).map(|k| snap(k as f64 * pitch)).collect()
}

/// Snap a value to the nearest multiple of `pitch`.
pub fn quantize(value: f64, pitch: f64) -> f64 {
    snap((value / pitch).round() * pitch)
}

/// Hashable, quantized coordinate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl GridKey {
    /// Build a key from raw coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Self::quantize_axis(x),
            y: Self::quantize_axis(y),
            z: Self::quantize_axis(z),
        }
    }

    /// Build a key from a vector.
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    fn quantize_axis(value: f64) -> i64 {
        (value / KEY_RESOLUTION).round() as i64
    }
}

/// Squared Euclidean distance between two points.
pub fn squared_distance(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    let dz = a.2 - b.2;
    dx * dx + dy * dy + dz * dz
}

/// Euclidean distance between two points.
pub fn euclidean_distance(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Manhattan (L1) distance between two points.
pub fn manhattan_distance(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs() + (a.2 - b.2).abs()
}

/// Straight-line midpoint of two vectors.
pub fn midpoint(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    (a + b) * 0.5
}

/// True when two points coincide within `tolerance`.
pub fn is_same_location(a: &Vector3<f64>, b: &Vector3<f64>, tolerance: f64) -> bool {
    (a - b).norm() < tolerance
}

/// Normalize `v`, substituting `fallback` for a zero-length vector.
pub fn direction_or(v: Vector3<f64>, fallback: Vector3<f64>) -> Vector3<f64> {
    let length = v.norm();
    if length <= f64::EPSILON {
        fallback
    } else {
        v / length
    }
}
