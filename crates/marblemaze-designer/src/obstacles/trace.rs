//! Curve sampling and grid tracing
//!
//! Obstacle shapes are drawn as continuous curves in pitch units and then
//! traced onto the integer grid. The tracer walks one axis at a time between
//! consecutive samples, so the result is a 6-connected chain of cells, and
//! erases any loop the curve makes when it passes back through a cell.

use nalgebra::Vector3;
use std::f64::consts::TAU;

/// Samples taken per pitch of curve length.
const SAMPLES_PER_PITCH: f64 = 16.0;

/// Piecewise curve in pitch units, stored as dense samples.
#[derive(Debug, Clone)]
pub(crate) struct Curve {
    samples: Vec<Vector3<f64>>,
}

fn sample_count(length: f64) -> usize {
    (length * SAMPLES_PER_PITCH).ceil().max(1.0) as usize
}

impl Curve {
    pub fn start(at: Vector3<f64>) -> Self {
        Self { samples: vec![at] }
    }

    fn current(&self) -> Vector3<f64> {
        // `samples` is never empty: `start` seeds it.
        self.samples.last().copied().unwrap_or_else(Vector3::zeros)
    }

    pub fn line_to(mut self, to: Vector3<f64>) -> Self {
        let from = self.current();
        let n = sample_count((to - from).norm());
        self.samples
            .extend((1..=n).map(|k| from.lerp(&to, k as f64 / n as f64)));
        self
    }

    pub fn polyline(self, points: &[Vector3<f64>]) -> Self {
        points.iter().fold(self, |curve, p| curve.line_to(*p))
    }

    /// Bezier segment from the current point through `controls`; the last
    /// control point is the end point.
    pub fn bezier_to(mut self, controls: &[Vector3<f64>]) -> Self {
        let mut hull = vec![self.current()];
        hull.extend_from_slice(controls);
        let length: f64 = hull.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        let n = sample_count(length);
        for k in 1..=n {
            let t = k as f64 / n as f64;
            // de Casteljau
            let mut level = hull.clone();
            while level.len() > 1 {
                level = level.windows(2).map(|w| w[0].lerp(&w[1], t)).collect();
            }
            self.samples.push(level[0]);
        }
        self
    }

    /// Cubic Hermite segment. Tangents are directions only; they are scaled
    /// to the chord length.
    pub fn hermite_to(
        mut self,
        to: Vector3<f64>,
        start_tangent: Vector3<f64>,
        end_tangent: Vector3<f64>,
    ) -> Self {
        let from = self.current();
        let chord = (to - from).norm();
        let m0 = start_tangent.normalize() * chord;
        let m1 = end_tangent.normalize() * chord;
        let n = sample_count(chord * 1.5);
        for k in 1..=n {
            let t = k as f64 / n as f64;
            let (t2, t3) = (t * t, t * t * t);
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            self.samples
                .push(from * h00 + m0 * h10 + to * h01 + m1 * h11);
        }
        self
    }

    /// Circular arc from the current point through `via` to `to`.
    ///
    /// Collinear points degrade to a straight line.
    pub fn arc_through(mut self, via: Vector3<f64>, to: Vector3<f64>) -> Self {
        let from = self.current();
        let a = from - to;
        let b = via - to;
        let axb = a.cross(&b);
        let denom = 2.0 * axb.norm_squared();
        if denom < 1e-12 {
            return self.line_to(to);
        }
        let center = to + (b * a.norm_squared() - a * b.norm_squared()).cross(&axb) / denom;
        let radius = (from - center).norm();
        let normal = (via - from).cross(&(to - via)).normalize();
        let u = (from - center) / radius;
        let v = normal.cross(&u);
        let angle_of = |p: Vector3<f64>| {
            let q = p - center;
            q.dot(&v).atan2(q.dot(&u)).rem_euclid(TAU)
        };
        let sweep = angle_of(to);
        let n = sample_count(sweep * radius);
        for k in 1..=n {
            let t = sweep * k as f64 / n as f64;
            self.samples
                .push(center + u * (radius * t.cos()) + v * (radius * t.sin()));
        }
        self
    }

    /// Append `count` samples of a parametric curve over `t0..=t1`. The
    /// current point is joined to the first sample.
    pub fn parametric<F>(mut self, t0: f64, t1: f64, count: usize, f: F) -> Self
    where
        F: Fn(f64) -> Vector3<f64>,
    {
        let count = count.max(1);
        self = self.line_to(f(t0));
        self.samples
            .extend((1..=count).map(|k| f(t0 + (t1 - t0) * k as f64 / count as f64)));
        self
    }

    /// Trace the curve onto the grid.
    pub fn trace(&self) -> Vec<Vector3<i32>> {
        trace_grid(&self.samples)
    }
}

fn snap(p: &Vector3<f64>) -> Vector3<i32> {
    p.map(|v| v.round() as i32)
}

/// Axis with the largest absolute component; ties go to the lowest axis.
fn dominant_axis(delta: &Vector3<i32>) -> usize {
    (0..3)
        .max_by_key(|&axis| (delta[axis].abs(), std::cmp::Reverse(axis)))
        .unwrap_or(0)
}

fn visit(path: &mut Vec<Vector3<i32>>, cell: Vector3<i32>) {
    match path.iter().position(|c| *c == cell) {
        Some(k) => path.truncate(k + 1),
        None => path.push(cell),
    }
}

/// Turn samples into a loop-free chain of unit grid steps.
///
/// The first sample's cell always starts the chain and the last sample's
/// cell always ends it.
pub(crate) fn trace_grid(samples: &[Vector3<f64>]) -> Vec<Vector3<i32>> {
    let mut path: Vec<Vector3<i32>> = Vec::new();
    for sample in samples {
        let target = snap(sample);
        let Some(&last) = path.last() else {
            path.push(target);
            continue;
        };
        let mut cursor = last;
        while cursor != target {
            let delta = target - cursor;
            let axis = dominant_axis(&delta);
            cursor[axis] += delta[axis].signum();
            visit(&mut path, cursor);
        }
    }
    path
}
