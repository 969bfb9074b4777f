//! Path segments and their boundary adjustment

use marblemaze_core::geometry::is_same_location;
use marblemaze_core::{
    DesignStrategy, Node, ObstacleId, PathCurveType, PathProfileType, TransitionType,
};
use nalgebra::Vector3;
use serde::Serialize;

/// Tolerance for treating two boundary points as the same location.
pub const LOCATION_TOLERANCE: f64 = 1e-7;

/// A contiguous run of the ball path with one design strategy.
///
/// `nodes` are indices into the owning [`super::PathLayout`] node arena.
/// Neighbouring segments that share a boundary hold the same index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    pub nodes: Vec<usize>,
    pub main_index: usize,
    pub secondary_index: usize,
    pub design_strategy: Option<DesignStrategy>,
    pub curve_type: Option<PathCurveType>,
    pub profile: Option<PathProfileType>,
    pub accent_profile: Option<PathProfileType>,
    pub support_profile: Option<PathProfileType>,
    pub transition: Option<TransitionType>,
    /// Obstacle this segment was spliced from
    pub obstacle: Option<ObstacleId>,
    /// Placed obstacle body; never re-split or adjusted
    pub locked: bool,
}

impl PathSegment {
    pub fn new(nodes: Vec<usize>, main_index: usize, secondary_index: usize) -> Self {
        Self {
            nodes,
            main_index,
            secondary_index,
            design_strategy: None,
            curve_type: None,
            profile: None,
            accent_profile: None,
            support_profile: None,
            transition: None,
            obstacle: None,
            locked: false,
        }
    }

    /// New segment inheriting profile, strategy, curve type, transition and
    /// obstacle back-reference from `self`.
    pub fn derive(&self, nodes: Vec<usize>, main_index: usize, secondary_index: usize) -> Self {
        Self {
            nodes,
            main_index,
            secondary_index,
            design_strategy: self.design_strategy,
            curve_type: self.curve_type,
            profile: self.profile,
            accent_profile: None,
            support_profile: None,
            transition: self.transition,
            obstacle: self.obstacle,
            locked: false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.nodes.last().copied()
    }

    /// Ordering key `(main_index, secondary_index)`.
    pub fn label(&self) -> (usize, usize) {
        (self.main_index, self.secondary_index)
    }

    /// Extend the segment ends so neighbouring segments meet.
    ///
    /// Ends are pushed outward by half a pitch, or a full pitch towards a
    /// curved neighbour. Curved segments and segments that already bridge
    /// their neighbours are left alone. The global start node stays put and
    /// the global end node moves half a pitch along the travel direction. A
    /// lone node gets stitch nodes on both sides.
    pub fn adjust_start_and_endpoints(
        &mut self,
        arena: &mut Vec<Node>,
        pitch: f64,
        boundary: &Boundary,
    ) {
        let half = pitch / 2.0;

        // lone puzzle end following the previous segment
        if self.nodes.len() == 1 && arena[self.nodes[0]].puzzle_end {
            if let Some(prev) = boundary.previous_end {
                let end = self.nodes[0];
                let point = arena[end].position();
                let direction = unit_or_x(point - prev);
                let mut start = Node::detached(prev.x, prev.y, prev.z);
                start.segment_start = true;

                let node = &mut arena[end];
                node.set_position(&(point + direction * half));
                node.segment_end = true;

                arena.push(start);
                self.nodes.insert(0, arena.len() - 1);
                return;
            }
        }

        if self.curve_type.is_some() {
            return;
        }
        if self.handle_bridging(arena, boundary) {
            return;
        }

        let start_distance = if boundary.previous_curve.is_some() { pitch } else { half };
        let end_distance = if boundary.next_curve.is_some() { pitch } else { half };

        if self.nodes.len() >= 2 {
            let first = self.nodes[0];
            if arena[first].puzzle_start {
                arena[first].segment_start = true;
            } else {
                let start_point = arena[first].position();
                let next_point = arena[self.nodes[1]].position();
                let mut entering = match boundary.previous_end {
                    Some(prev) => start_point - prev,
                    None => next_point - start_point,
                };
                if entering.norm() == 0.0 {
                    entering = next_point - start_point;
                }
                let adjusted = start_point - unit_or_x(entering) * start_distance;
                let mut node = Node::detached(adjusted.x, adjusted.y, adjusted.z);
                node.segment_start = true;
                arena.push(node);
                self.nodes.insert(0, arena.len() - 1);
            }

            let last = self.nodes[self.nodes.len() - 1];
            let end_point = arena[last].position();
            let prev_point = arena[self.nodes[self.nodes.len() - 2]].position();
            let mut exiting = match boundary.next_start {
                Some(next) => next - end_point,
                None => end_point - prev_point,
            };
            if exiting.norm() == 0.0 {
                exiting = end_point - prev_point;
            }
            let direction = unit_or_x(exiting);

            if arena[last].puzzle_end {
                let node = &mut arena[last];
                node.set_position(&(end_point + direction * half));
                node.segment_end = true;
            } else {
                let adjusted = end_point + direction * end_distance;
                let mut node = Node::detached(adjusted.x, adjusted.y, adjusted.z);
                node.segment_end = true;
                arena.push(node);
                self.nodes.push(arena.len() - 1);
            }
            return;
        }

        let Some(&only) = self.nodes.first() else {
            return;
        };
        let point = arena[only].position();
        let entering = unit_or_x(match (boundary.previous_end, boundary.next_start) {
            (Some(prev), _) => point - prev,
            (None, Some(next)) => next - point,
            (None, None) => Vector3::x(),
        });
        let exiting = unit_or_x(match (boundary.next_start, boundary.previous_end) {
            (Some(next), _) => next - point,
            (None, Some(prev)) => point - prev,
            (None, None) => Vector3::x(),
        });

        let (is_end, is_start) = (arena[only].puzzle_end, arena[only].puzzle_start);
        if is_end {
            let node = &mut arena[only];
            node.set_position(&(point + exiting * half));
            node.segment_end = true;
        } else if is_start {
            arena[only].segment_start = true;
        } else {
            let s = point - entering * start_distance;
            let e = point + exiting * end_distance;
            let mut start = Node::detached(s.x, s.y, s.z);
            start.segment_start = true;
            let mut end = Node::detached(e.x, e.y, e.z);
            end.segment_end = true;
            arena.push(start);
            self.nodes.insert(0, arena.len() - 1);
            arena.push(end);
            self.nodes.push(arena.len() - 1);
        }
    }

    /// True when the segment already spans the gap to its neighbours.
    ///
    /// A lone node touching only one neighbour is moved onto the other.
    fn handle_bridging(&mut self, arena: &mut [Node], boundary: &Boundary) -> bool {
        let (Some(prev), Some(next)) = (boundary.previous_end, boundary.next_start) else {
            return false;
        };

        if self.nodes.len() == 1 {
            let node = &mut arena[self.nodes[0]];
            let p = node.position();
            let at_prev = is_same_location(&p, &prev, LOCATION_TOLERANCE);
            let at_next = is_same_location(&p, &next, LOCATION_TOLERANCE);
            return match (at_prev, at_next) {
                (true, true) => true,
                (true, false) => {
                    node.set_position(&next);
                    true
                }
                (false, true) => {
                    node.set_position(&prev);
                    true
                }
                (false, false) => false,
            };
        }

        match (self.first(), self.last()) {
            (Some(first), Some(last)) => {
                is_same_location(&arena[first].position(), &prev, LOCATION_TOLERANCE)
                    && is_same_location(&arena[last].position(), &next, LOCATION_TOLERANCE)
            }
            _ => false,
        }
    }
}

/// Neighbour context handed to [`PathSegment::adjust_start_and_endpoints`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Boundary {
    pub previous_end: Option<Vector3<f64>>,
    pub next_start: Option<Vector3<f64>>,
    pub previous_curve: Option<PathCurveType>,
    pub next_curve: Option<PathCurveType>,
}

fn unit_or_x(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::x)
}
