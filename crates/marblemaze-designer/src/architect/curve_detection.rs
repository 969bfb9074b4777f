//! Curve classification of path node runs
//!
//! Detectors run in priority order (S-curve, quarter turn, circular run) and
//! annotate the nodes they claim with a curve type and a curve id. A claimed
//! node is never reconsidered by a later detector.

use marblemaze_core::{CurveDetector, Node, PathCurveType};
use nalgebra::Vector3;
use tracing::trace;

/// Coordinate equality tolerance for planarity and collinearity tests.
const COORD_EPSILON: f64 = 1e-6;

/// Minimum cosine between the two straight legs of an S-curve (about 18°).
const S_CURVE_DIRECTION_THRESHOLD: f64 = 0.95;

/// Minimum cosine between each step of a quarter-turn half and its chord.
const HALF_ALIGNMENT_THRESHOLD: f64 = 0.95;

const RIGHT_ANGLE_TOLERANCE_DEG: f64 = 5.0;

const S_CURVE_LENGTH: usize = 6;

/// Marked node counts of the quarter-turn detector, largest first. The
/// inspected window is two nodes longer.
const ARC_LENGTHS: [usize; 2] = [5, 3];

/// Run the enabled detectors over `nodes`, returning the next free curve id.
pub fn detect_curves(nodes: &mut [Node], detectors: &[CurveDetector], mut curve_id: u32) -> u32 {
    if detectors.contains(&CurveDetector::SCurve) {
        curve_id = detect_s_curves(nodes, curve_id);
    }
    if detectors.contains(&CurveDetector::Curve90) {
        curve_id = detect_arcs(nodes, curve_id);
    }
    if detectors.contains(&CurveDetector::CircularRun) {
        curve_id = detect_circular_runs(nodes, curve_id);
    }
    curve_id
}

/// Tag offset-Z shaped six-node windows.
///
/// The window splits into a leading triple, a middle pair and a trailing
/// triple. Both triples must run along the same axis, the middle pair must
/// leave it, and the leading and trailing directions must agree. The four
/// inner nodes receive one shared curve id.
pub fn detect_s_curves(nodes: &mut [Node], mut curve_id: u32) -> u32 {
    if nodes.len() < S_CURVE_LENGTH {
        return curve_id;
    }

    for i in 0..=nodes.len() - S_CURVE_LENGTH {
        let window = &nodes[i..i + S_CURVE_LENGTH];
        if window[1..S_CURVE_LENGTH - 1].iter().any(|n| n.used_in_curve) {
            continue;
        }
        if !is_in_plane(window) {
            continue;
        }

        let first = &window[..3];
        let middle = &window[2..4];
        let last = &window[3..];

        let matched = (0..3).any(|axis| {
            if !is_linear(first, axis) || !is_linear(last, axis) || is_linear(middle, axis) {
                return false;
            }
            let lead = unit(&(window[1].position() - window[0].position()));
            let trail = unit(&(window[5].position() - window[4].position()));
            lead.dot(&trail) > S_CURVE_DIRECTION_THRESHOLD
        });

        if matched {
            trace!(start = i, curve_id, "s-curve detected");
            for node in &mut nodes[i + 1..i + S_CURVE_LENGTH - 1] {
                claim(node, PathCurveType::SCurve, curve_id);
            }
            curve_id += 1;
        }
    }
    curve_id
}

/// Tag planar quarter turns in 7-node and then 5-node windows.
///
/// A matching window has its interior claimed, leaving the two end nodes free.
pub fn detect_arcs(nodes: &mut [Node], mut curve_id: u32) -> u32 {
    for n in ARC_LENGTHS {
        let window_len = n + 2;
        if nodes.len() < window_len {
            continue;
        }

        for i in 0..=nodes.len() - window_len {
            let window = &nodes[i..i + window_len];
            if window[1..window_len - 1].iter().any(|node| node.used_in_curve) {
                continue;
            }
            if !check_90_deg_curve(window) {
                continue;
            }

            trace!(start = i + 1, len = n, curve_id, "quarter turn detected");
            for node in &mut nodes[i + 1..i + 1 + n] {
                claim(node, PathCurveType::Curve90, curve_id);
            }
            curve_id += 1;
        }
    }
    curve_id
}

/// Tag every maximal run of unclaimed circular-grid nodes as one arc.
///
/// Runs of a single node count too, including at the head or tail.
pub fn detect_circular_runs(nodes: &mut [Node], mut curve_id: u32) -> u32 {
    let mut i = 0;
    while i < nodes.len() {
        if !nodes[i].in_circular_grid || nodes[i].used_in_curve {
            i += 1;
            continue;
        }
        let start = i;
        while i < nodes.len() && nodes[i].in_circular_grid && !nodes[i].used_in_curve {
            claim(&mut nodes[i], PathCurveType::Arc, curve_id);
            i += 1;
        }
        trace!(start, len = i - start, curve_id, "circular run detected");
        curve_id += 1;
    }
    curve_id
}

/// True when `window` is a single-plane quarter turn.
///
/// The window is halved with the middle node in both halves. Every step of a
/// half must follow that half's chord, and the two chords must meet at
/// 90° ± 5°.
pub fn check_90_deg_curve(window: &[Node]) -> bool {
    if window.len() < 3 {
        return false;
    }
    let Some(fixed_axis) = constant_axis(window) else {
        return false;
    };
    let plane: Vec<usize> = (0..3).filter(|&a| a != fixed_axis).collect();

    let middle = window.len() / 2;
    let first_half = &window[..=middle];
    let second_half = &window[middle..];

    if !all_steps_aligned(first_half, &plane) || !all_steps_aligned(second_half, &plane) {
        return false;
    }

    let first = unit(&in_plane(&first_half[0], &first_half[first_half.len() - 1], &plane));
    let second = unit(&in_plane(&second_half[0], &second_half[second_half.len() - 1], &plane));
    let angle = first.dot(&second).clamp(-1.0, 1.0).acos().to_degrees();
    (angle - 90.0).abs() <= RIGHT_ANGLE_TOLERANCE_DEG
}

/// True when all points share one coordinate.
pub fn is_in_plane(points: &[Node]) -> bool {
    constant_axis(points).is_some()
}

/// True when all points lie on a line parallel to `axis`.
pub fn is_linear(points: &[Node], axis: usize) -> bool {
    let Some(first) = points.first() else {
        return true;
    };
    let p0 = first.position();
    points.iter().all(|p| {
        let q = p.position();
        (0..3)
            .filter(|&a| a != axis)
            .all(|a| (q[a] - p0[a]).abs() < COORD_EPSILON)
    })
}

fn constant_axis(points: &[Node]) -> Option<usize> {
    let first = points.first()?.position();
    (0..3).find(|&axis| {
        points
            .iter()
            .all(|p| (p.position()[axis] - first[axis]).abs() < COORD_EPSILON)
    })
}

fn all_steps_aligned(points: &[Node], plane: &[usize]) -> bool {
    if points.len() < 2 {
        return true;
    }
    let chord = unit(&in_plane(&points[0], &points[points.len() - 1], plane));
    points
        .windows(2)
        .all(|pair| chord.dot(&unit(&in_plane(&pair[0], &pair[1], plane))) >= HALF_ALIGNMENT_THRESHOLD)
}

fn in_plane(a: &Node, b: &Node, plane: &[usize]) -> Vector3<f64> {
    let d = b.position() - a.position();
    let mut v = Vector3::zeros();
    for &axis in plane {
        v[axis] = d[axis];
    }
    v
}

fn unit(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

fn claim(node: &mut Node, curve_type: PathCurveType, curve_id: u32) {
    node.path_curve_type = Some(curve_type);
    node.curve_id = Some(curve_id);
    node.used_in_curve = true;
}
