//! Curves of the built-in obstacles, in pitch units

use super::trace::Curve;
use marblemaze_core::frange;
use nalgebra::{Vector2, Vector3};
use std::f64::consts::PI;

const EPS: f64 = 1e-9;

fn v(x: f64, y: f64, z: f64) -> Vector3<f64> {
    Vector3::new(x, y, z)
}

fn flat(p: Vector2<f64>) -> Vector3<f64> {
    Vector3::new(p.x, p.y, 0.0)
}

/// Three-dimensional hairpin that doubles back under itself.
pub(crate) fn u_turn() -> Curve {
    Curve::start(v(0.0, 0.0, 0.0)).polyline(&[
        v(0.0, 1.0, 0.0),
        v(0.0, 1.0, 1.0),
        v(1.0, 1.0, 1.0),
        v(1.0, 1.0, 0.0),
        v(1.0, 1.0, -2.0),
        v(0.0, 1.0, -2.0),
        v(0.0, 1.0, -1.0),
        v(0.0, 0.0, -1.0),
    ])
}

/// Rising loop shaped like a lowercase alpha.
pub(crate) fn alpha() -> Curve {
    Curve::start(v(0.0, -2.0, 0.0))
        .line_to(v(0.0, 0.0, 0.0))
        .bezier_to(&[
            v(0.0, 4.0, 0.0),
            v(4.0, 4.0, 1.0),
            v(4.0, 0.0, 2.0),
            v(0.0, 0.0, 2.0),
        ])
        .line_to(v(-2.0, 0.0, 2.0))
}

pub(crate) fn omega() -> Curve {
    Curve::start(v(-3.0, -2.0, 0.0))
        .line_to(v(-1.0, -2.0, 0.0))
        .arc_through(v(0.0, 2.0, 0.0), v(1.0, -2.0, 0.0))
        .line_to(v(3.0, -2.0, 0.0))
}

/// One helix turn of radius 1 climbing 2 pitches.
pub(crate) fn spiral() -> Curve {
    let samples = (2.0 * PI * 20.0).ceil() as usize;
    Curve::start(v(1.0, -1.0, 0.0))
        .line_to(v(1.0, 0.0, 0.0))
        .parametric(0.0, 2.0 * PI, samples, |t| v(t.cos(), t.sin(), t / PI))
        .line_to(v(1.0, 1.0, 2.0))
}

pub(crate) fn question_mark() -> Curve {
    Curve::start(v(0.0, -3.0, 0.0))
        .line_to(v(0.0, -2.0, 0.0))
        .hermite_to(v(1.0, 0.0, 0.0), Vector3::y(), Vector3::y())
        .arc_through(v(0.0, 1.0, 0.0), v(-1.0, 0.0, 0.0))
}

const HEX_DIRECTIONS: [(f64, f64); 6] = [
    (1.0, 0.0),
    (0.5, 0.866_025_403_784_438_6),
    (-0.5, 0.866_025_403_784_438_6),
    (-1.0, 0.0),
    (-0.5, -0.866_025_403_784_438_6),
    (0.5, -0.866_025_403_784_438_6),
];

fn expand_gosper(order: usize) -> String {
    (0..order).fold(String::from("A"), |axiom, _| {
        axiom
            .chars()
            .map(|c| match c {
                'A' => "A-B--B+A++AA+B-".to_string(),
                'B' => "+A-BB--B-A++A+B".to_string(),
                other => other.to_string(),
            })
            .collect()
    })
}

/// Walk an L-system program on the hex lattice, returning turtle positions.
fn hex_turtle(program: &str, step: f64) -> Vec<Vector2<f64>> {
    let mut heading = 0usize;
    let mut pos = Vector2::zeros();
    let mut points = vec![pos];
    for c in program.chars() {
        match c {
            '+' => heading = (heading + 1) % 6,
            '-' => heading = (heading + 5) % 6,
            'A' | 'B' => {
                let (dx, dy) = HEX_DIRECTIONS[heading];
                pos += Vector2::new(dx, dy) * step;
                points.push(pos);
            }
            _ => {}
        }
    }
    points
}

/// Drop consecutive duplicates, centre the bounding box on the origin and
/// shift so the first point sits on a grid node.
fn normalize_planar(points: Vec<Vector2<f64>>) -> Vec<Vector2<f64>> {
    let mut points: Vec<Vector2<f64>> = points.into_iter().fold(Vec::new(), |mut acc, p| {
        if acc.last().map_or(true, |q: &Vector2<f64>| (p - q).amax() > EPS) {
            acc.push(p);
        }
        acc
    });
    let Some(first) = points.first().copied() else {
        return points;
    };
    let (mut lo, mut hi) = (first, first);
    for p in &points {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    let center = (lo + hi) / 2.0;
    let start = first - center;
    let shift = start.map(f64::round) - start - center;
    for p in &mut points {
        *p += shift;
        if (p.y - p.y.round()).abs() < EPS {
            p.y = p.y.round();
        }
    }
    points
}

/// Order-2 flowsnake, cut after its first thirteen strokes.
pub(crate) fn gosper_curve() -> Curve {
    let step = 4.0 / 3f64.sqrt();
    let mut points = hex_turtle(&expand_gosper(2), step);
    points.truncate(14);
    let points = normalize_planar(points);

    let (start, second, end) = match points.as_slice() {
        [first, second, .., last] => (*first, *second, *last),
        _ => return Curve::start(Vector3::zeros()),
    };
    let entry_far = start - (second - start).normalize();
    let exit_far = Vector2::new((end.x - 1.0).round(), end.y);

    let body: Vec<Vector3<f64>> = points
        .iter()
        .copied()
        .chain(std::iter::once(exit_far))
        .map(flat)
        .collect();
    Curve::start(flat(entry_far)).polyline(&body)
}

/// Trefoil arc from the classic overhand knot parametrisation, with
/// straight leads out to the nearest grid nodes.
pub(crate) fn overhand_knot() -> Curve {
    let knot = |t: f64| {
        v(
            t.sin() + 2.0 * (2.0 * t).sin(),
            t.cos() - 2.0 * (2.0 * t).cos(),
            -(3.0 * t).sin(),
        )
    };
    let tangent = |t: f64| {
        v(
            t.cos() + 4.0 * (2.0 * t).cos(),
            -t.sin() + 4.0 * (2.0 * t).sin(),
            -3.0 * (3.0 * t).cos(),
        )
        .normalize()
    };
    let (t0, t1) = (0.005, 4.0 * PI / 3.0);
    let lead_in = (knot(t0) - tangent(t0) * 2.0).map(f64::round);
    let lead_out = (knot(t1) + tangent(t1) * 2.0).map(f64::round);
    let samples = ((t1 - t0) * 96.0).ceil() as usize;
    Curve::start(lead_in)
        .parametric(t0, t1, samples, knot)
        .line_to(lead_out)
}

/// Waveforms drawn by the signal generator obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    ZigZag,
    Sine,
    Pulse,
}

const SIGNAL_AMPLITUDE: f64 = 1.0;
const SIGNAL_PERIOD: f64 = 6.0;
const SIGNAL_CYCLES: usize = 2;
const SINE_SAMPLES_PER_PERIOD: usize = 64;

fn waveform(signal: Signal) -> Vec<Vector2<f64>> {
    let (a, p) = (SIGNAL_AMPLITUDE, SIGNAL_PERIOD);
    let cycles = SIGNAL_CYCLES as f64;
    match signal {
        Signal::ZigZag => {
            let mut points = vec![Vector2::new(0.0, -a)];
            for c in 0..SIGNAL_CYCLES {
                let x0 = c as f64 * p;
                points.push(Vector2::new(x0 + p / 2.0, a));
                points.push(Vector2::new(x0 + p, -a));
            }
            points
        }
        Signal::Sine => {
            let step = p / SINE_SAMPLES_PER_PERIOD as f64;
            frange(0.0, p * cycles, step)
                .into_iter()
                .map(|x| Vector2::new(x, a * (2.0 * PI * x / p).sin()))
                .collect()
        }
        Signal::Pulse => {
            let mut points: Vec<Vector2<f64>> = Vec::new();
            for c in 0..SIGNAL_CYCLES {
                let x0 = c as f64 * p;
                let edge = x0 + p / 2.0;
                if let Some(last) = points.last().copied() {
                    if (last.y - a).abs() > EPS {
                        points.push(Vector2::new(x0, a));
                    }
                } else {
                    points.push(Vector2::new(x0, a));
                }
                points.push(Vector2::new(edge, a));
                points.push(Vector2::new(edge, -a));
                points.push(Vector2::new(x0 + p, -a));
            }
            points
        }
    }
}

/// Planar waveform with two-pitch horizontal connectors at both ends.
pub(crate) fn signal(signal: Signal) -> Curve {
    let points = normalize_planar(waveform(signal));
    let (start, second, before_end, end) = match points.as_slice() {
        [first, second, .., penultimate, last] => (*first, *second, *penultimate, *last),
        _ => return Curve::start(Vector3::zeros()),
    };
    let back = if second.x - start.x < -EPS { 1.0 } else { -1.0 };
    let ahead = if end.x - before_end.x < -EPS { -1.0 } else { 1.0 };

    let mut body = vec![flat(start + Vector2::new(back, 0.0))];
    body.extend(points.iter().copied().map(flat));
    body.push(flat(end + Vector2::new(ahead, 0.0)));
    body.push(flat(end + Vector2::new(2.0 * ahead, 0.0)));
    Curve::start(flat(start + Vector2::new(2.0 * back, 0.0))).polyline(&body)
}
