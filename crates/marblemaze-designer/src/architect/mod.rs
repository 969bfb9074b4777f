//! Path architect
//!
//! Turns the raw ball path into annotated [`PathSegment`]s for the sweep
//! profile generator:
//!
//! 1. split the path on waypoint boundaries and splice placed obstacles in
//! 2. assign a profile and a design strategy per segment
//! 3. classify curves in compound segments and trisect spline segments
//! 4. extend segment ends so neighbours meet, bridging curves and
//!    circular/rectangular boundaries
//! 5. add the start ramp and finish box, transitions and profile hints
//! 6. reindex to dense `(main_index, secondary_index)` labels
//!
//! The architect copies the path nodes into its own arena; the lattice is
//! never modified.

pub mod curve_detection;
mod segment;

pub use segment::{Boundary, PathSegment, LOCATION_TOLERANCE};

use crate::lattice::Lattice;
use crate::obstacles::PlacedObstacle;
use marblemaze_core::geometry::{direction_or, is_same_location, midpoint};
use marblemaze_core::{
    DesignStrategy, Node, NodeId, PathCurveType, PathProfileType, TransitionType,
};
use marblemaze_settings::PathSettings;
use nalgebra::Vector3;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Collinearity tolerance of the spline stitch test.
const COLLINEAR_TOLERANCE: f64 = 1e-5;

/// Frozen output of the architect.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathLayout {
    /// Node arena referenced by the segments
    pub nodes: Vec<Node>,
    /// Segments in path order
    pub segments: Vec<PathSegment>,
}

impl PathLayout {
    /// Nodes of one segment, in order.
    pub fn segment_nodes<'a>(&'a self, segment: &'a PathSegment) -> impl Iterator<Item = &'a Node> + 'a {
        segment.nodes.iter().map(move |&i| &self.nodes[i])
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment counts per design strategy: (single, compound, spline).
    pub fn strategy_counts(&self) -> (usize, usize, usize) {
        self.segments.iter().fold((0, 0, 0), |(s, c, p), seg| match seg.design_strategy {
            Some(DesignStrategy::Single) => (s + 1, c, p),
            Some(DesignStrategy::Compound) => (s, c + 1, p),
            Some(DesignStrategy::Spline) => (s, c, p + 1),
            None => (s, c, p),
        })
    }
}

/// Builds a [`PathLayout`] from a routed path.
pub struct PathArchitect<'a> {
    settings: &'a PathSettings,
    pitch: f64,
    nodes: Vec<Node>,
    segments: Vec<PathSegment>,
    next_main_index: usize,
    secondary_counters: HashMap<usize, usize>,
}

impl<'a> PathArchitect<'a> {
    pub fn new(settings: &'a PathSettings, pitch: f64) -> Self {
        Self {
            settings,
            pitch,
            nodes: Vec::new(),
            segments: Vec::new(),
            next_main_index: 1,
            secondary_counters: HashMap::new(),
        }
    }

    /// Run the whole pipeline.
    pub fn build<R: Rng + ?Sized>(
        settings: &PathSettings,
        lattice: &Lattice,
        total_path: &[NodeId],
        obstacles: &[PlacedObstacle],
        rng: &mut R,
    ) -> PathLayout {
        let mut architect = PathArchitect::new(settings, lattice.pitch());
        architect.split_path_into_segments(lattice, total_path, obstacles);
        architect.assign_path_properties(rng);
        architect.detect_curves_and_adjust_segments();
        architect.adjust_segments();
        architect.create_start_ramp();
        architect.create_finish_box();
        architect.assign_transition_types();
        architect.assign_profile_hints();
        architect.finalize_curve_types();
        architect.reindex_segments();

        info!(
            segments = architect.segments.len(),
            nodes = architect.nodes.len(),
            "path layout built"
        );
        architect.into_layout()
    }

    /// Segments built so far.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Node arena built so far.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_layout(self) -> PathLayout {
        PathLayout {
            nodes: self.nodes,
            segments: self.segments,
        }
    }

    /// Seed the architect with explicit nodes and segments.
    pub fn with_segments(mut self, nodes: Vec<Node>, segments: Vec<PathSegment>) -> Self {
        self.next_main_index = segments.iter().map(|s| s.main_index + 1).max().unwrap_or(1);
        self.nodes = nodes;
        self.segments = segments;
        self
    }

    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn position(&self, index: usize) -> Vector3<f64> {
        self.nodes[index].position()
    }

    fn next_secondary(&mut self, main_index: usize) -> usize {
        let counter = self.secondary_counters.entry(main_index).or_insert(0);
        let value = *counter;
        *counter += 1;
        value
    }

    /// Cut the raw path into segments.
    ///
    /// The first two nodes form the start ramp. Every
    /// `waypoint_change_interval`-th non-mounting waypoint closes a segment,
    /// mounting nodes stand alone, and an obstacle entry closes the open
    /// segment and splices in entry stitch, locked body and exit stitch.
    pub fn split_path_into_segments(
        &mut self,
        lattice: &Lattice,
        total_path: &[NodeId],
        obstacles: &[PlacedObstacle],
    ) {
        let mut arena_index: HashMap<NodeId, usize> = HashMap::new();
        let raw: Vec<usize> = total_path
            .iter()
            .map(|&id| self.intern(lattice, &mut arena_index, id))
            .collect();
        let by_entry: HashMap<usize, &PlacedObstacle> = obstacles
            .iter()
            .filter_map(|o| {
                let pos = total_path.iter().position(|&id| id == o.entry)?;
                Some((raw[pos], o))
            })
            .collect();

        let rest = if raw.len() >= 2 {
            let main = self.take_main_index();
            debug!(main, "start ramp segment");
            self.segments.push(PathSegment::new(raw[..2].to_vec(), main, 0));
            &raw[2..]
        } else {
            &raw[..]
        };

        let interval = self.settings.waypoint_change_interval.max(1);
        let mut current: Vec<usize> = Vec::new();
        let mut waypoint_counter = 0usize;
        let mut pending_exit: Option<usize> = None;

        for &index in rest {
            if pending_exit == Some(index) {
                pending_exit = None;
                continue;
            }

            if self.nodes[index].mounting {
                if !current.is_empty() {
                    self.close_segment(std::mem::take(&mut current), "before mounting node");
                }
                self.close_segment(vec![index], "mounting node");
                continue;
            }

            current.push(index);

            if let Some(obstacle) = by_entry.get(&index) {
                if current.len() > 1 {
                    self.close_segment(std::mem::take(&mut current), "before obstacle");
                } else if let Some(last) = self.segments.last_mut() {
                    last.nodes.append(&mut current);
                }
                current.clear();

                let body: Vec<usize> = obstacle
                    .path
                    .iter()
                    .map(|&id| self.intern(lattice, &mut arena_index, id))
                    .collect();
                self.splice_obstacle(obstacle, body);
                pending_exit = arena_index.get(&obstacle.exit).copied();
                continue;
            }

            let node = &self.nodes[index];
            if node.waypoint && !node.mounting {
                waypoint_counter += 1;
                if waypoint_counter % interval == 0 {
                    self.close_segment(std::mem::take(&mut current), "waypoint interval reached");
                }
            }
        }

        if !current.is_empty() {
            self.close_segment(current, "final remainder");
        }
    }

    /// Arena index of a lattice node, copying it in on first use.
    fn intern(&mut self, lattice: &Lattice, arena_index: &mut HashMap<NodeId, usize>, id: NodeId) -> usize {
        if let Some(&index) = arena_index.get(&id) {
            return index;
        }
        let index = self.push_node(lattice.node(id).clone());
        arena_index.insert(id, index);
        index
    }

    fn take_main_index(&mut self) -> usize {
        let main = self.next_main_index;
        self.next_main_index += 1;
        main
    }

    fn close_segment(&mut self, nodes: Vec<usize>, reason: &str) {
        let main = self.take_main_index();
        debug!(main, len = nodes.len(), reason, "segment created");
        self.segments.push(PathSegment::new(nodes, main, 0));
    }

    /// Emit entry stitch, locked body and exit stitch under one main index.
    fn splice_obstacle(&mut self, obstacle: &PlacedObstacle, body: Vec<usize>) {
        let main = self.take_main_index();
        let n = body.len();

        if n < 4 {
            let mut segment = PathSegment::new(body, main, 0);
            segment.design_strategy = Some(DesignStrategy::Compound);
            segment.obstacle = Some(obstacle.id);
            segment.locked = true;
            self.segments.push(segment);
            return;
        }

        let mut entry = PathSegment::new(vec![body[0], body[1]], main, 0);
        entry.design_strategy = Some(DesignStrategy::Single);
        entry.obstacle = Some(obstacle.id);

        let mut locked = PathSegment::new(body[1..n - 1].to_vec(), main, 1);
        locked.design_strategy = Some(DesignStrategy::Compound);
        locked.obstacle = Some(obstacle.id);
        locked.locked = true;

        let mut exit = PathSegment::new(vec![body[n - 2], body[n - 1]], main, 2);
        exit.design_strategy = Some(DesignStrategy::Single);
        exit.obstacle = Some(obstacle.id);

        debug!(main, obstacle = %obstacle.name, body = n, "obstacle spliced");
        self.segments.extend([entry, locked, exit]);
        self.secondary_counters.insert(main, 3);
    }

    /// Pick a profile and design strategy per segment.
    ///
    /// Mounting segments are limited to bridge-compatible profiles and the
    /// compound strategy. Segments of one obstacle share their profile. The
    /// previous profile and strategy are avoided when alternatives exist.
    pub fn assign_path_properties<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut previous_profile: Option<PathProfileType> = None;
        let mut previous_strategy: Option<DesignStrategy> = None;
        let mut obstacle_profiles: HashMap<usize, PathProfileType> = HashMap::new();

        for segment in &mut self.segments {
            let has_mounting = segment.nodes.iter().any(|&i| self.nodes[i].mounting);
            let (mut profiles, mut strategies) = if has_mounting {
                let mut allowed: Vec<PathProfileType> = PathProfileType::mounting_profiles()
                    .into_iter()
                    .filter(|p| self.settings.profile_types.contains(p))
                    .collect();
                if allowed.is_empty() {
                    allowed.push(PathProfileType::UShape);
                }
                (allowed, vec![DesignStrategy::Compound])
            } else {
                (
                    self.settings.profile_types.clone(),
                    self.settings.design_strategies.clone(),
                )
            };

            let shared = segment
                .obstacle
                .and_then(|_| obstacle_profiles.get(&segment.main_index).copied());

            if shared.is_none() {
                exclude_previous(&mut profiles, previous_profile);
            }
            exclude_previous(&mut strategies, previous_strategy);

            let profile = match shared {
                Some(p) => p,
                None => {
                    let p = profiles.choose(rng).copied().unwrap_or(PathProfileType::UShape);
                    if segment.obstacle.is_some() {
                        obstacle_profiles.insert(segment.main_index, p);
                    }
                    p
                }
            };
            segment.profile = Some(profile);

            if segment.design_strategy.is_none() {
                let strategy = if segment.locked {
                    DesignStrategy::Compound
                } else {
                    strategies.choose(rng).copied().unwrap_or(DesignStrategy::Compound)
                };
                segment.design_strategy = Some(strategy);
            }

            previous_profile = segment.profile;
            previous_strategy = segment.design_strategy;
        }
    }

    /// Classify curves in compound segments and trisect spline segments.
    pub fn detect_curves_and_adjust_segments(&mut self) {
        let mut curve_id = 1u32;
        let mut i = 0;
        while i < self.segments.len() {
            let segment = self.segments[i].clone();
            if segment.locked {
                i += 1;
                continue;
            }

            match segment.design_strategy {
                Some(DesignStrategy::Compound) => {
                    let mut replacement = Vec::new();
                    for sub in self.split_at_mounting(&segment) {
                        if sub.nodes.len() > 1 {
                            curve_id = self.detect_in_segment(&sub, curve_id);
                            replacement.extend(self.split_by_detected_curves(&sub));
                        } else {
                            replacement.push(sub);
                        }
                    }
                    let count = replacement.len();
                    self.segments.splice(i..i + 1, replacement);
                    i += count;
                }
                Some(DesignStrategy::Spline) => {
                    let previous = i.checked_sub(1).map(|p| self.segments[p].clone());
                    let next = self.segments.get(i + 1).cloned();
                    let replacement =
                        self.split_spline_segment(&segment, previous.as_ref(), next.as_ref());
                    let count = replacement.len();
                    self.segments.splice(i..i + 1, replacement);
                    i += count;
                }
                _ => i += 1,
            }
        }
        debug!(curves = curve_id - 1, segments = self.segments.len(), "curve detection done");
    }

    /// Give every mounting node inside a multi-node segment its own segment.
    fn split_at_mounting(&mut self, segment: &PathSegment) -> Vec<PathSegment> {
        let mounting = |i: &usize| self.nodes[*i].mounting;
        if segment.nodes.len() < 2 || !segment.nodes.iter().any(mounting) {
            return vec![segment.clone()];
        }

        let mut runs: Vec<Vec<usize>> = Vec::new();
        let mut run: Vec<usize> = Vec::new();
        for &index in &segment.nodes {
            if self.nodes[index].mounting {
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
                runs.push(vec![index]);
            } else {
                run.push(index);
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }

        runs.into_iter()
            .enumerate()
            .map(|(k, nodes)| {
                let secondary = if k == 0 {
                    segment.secondary_index
                } else {
                    self.next_secondary(segment.main_index)
                };
                segment.derive(nodes, segment.main_index, secondary)
            })
            .collect()
    }

    fn detect_in_segment(&mut self, segment: &PathSegment, curve_id: u32) -> u32 {
        let mut run: Vec<Node> = segment.nodes.iter().map(|&i| self.nodes[i].clone()).collect();
        let next = curve_detection::detect_curves(&mut run, &self.settings.curve_detectors, curve_id);
        for (&index, node) in segment.nodes.iter().zip(run) {
            self.nodes[index] = node;
        }
        next
    }

    /// Split a classified segment wherever curve type or curve id changes.
    ///
    /// Two different curves meeting head to tail get a 2-node connecting
    /// segment between them.
    fn split_by_detected_curves(&mut self, original: &PathSegment) -> Vec<PathSegment> {
        let main = original.main_index;
        let mut out = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_type: Option<PathCurveType> = None;
        let mut current_id: Option<u32> = None;

        for &index in &original.nodes {
            let (node_type, node_id) = {
                let node = &self.nodes[index];
                (node.path_curve_type, node.curve_id)
            };

            if node_type != current_type || node_id != current_id {
                if let Some(&tail) = current.last() {
                    let secondary = self.next_secondary(main);
                    let mut segment = original.derive(std::mem::take(&mut current), main, secondary);
                    segment.curve_type = current_type;
                    out.push(segment);

                    if let (Some(a), Some(b)) = (current_id, node_id) {
                        if a != b {
                            let secondary = self.next_secondary(main);
                            let mut connector = original.derive(vec![tail, index], main, secondary);
                            connector.design_strategy = Some(DesignStrategy::Compound);
                            connector.curve_type = None;
                            out.push(connector);
                        }
                    }
                }
                current_type = node_type;
                current_id = node_id;
            }
            current.push(index);
        }

        if !current.is_empty() {
            let secondary = self.next_secondary(main);
            let mut segment = original.derive(current, main, secondary);
            segment.curve_type = current_type;
            out.push(segment);
        }
        out
    }

    /// Trisect a spline segment into leading stitch, body and trailing stitch.
    ///
    /// A stitch is dropped when the path continues straight across that
    /// boundary. Segments of two nodes or fewer become lone compound nodes.
    fn split_spline_segment(
        &mut self,
        segment: &PathSegment,
        previous: Option<&PathSegment>,
        next: Option<&PathSegment>,
    ) -> Vec<PathSegment> {
        let main = segment.main_index;
        let nodes = &segment.nodes;
        let mut out = Vec::new();

        if nodes.len() <= 2 {
            for &index in nodes {
                let secondary = self.next_secondary(main);
                let mut single = segment.derive(vec![index], main, secondary);
                single.design_strategy = Some(DesignStrategy::Compound);
                out.push(single);
            }
            return out;
        }

        let needs_leading = match previous.and_then(PathSegment::last) {
            Some(tail) => {
                let first = self.position(nodes[0]);
                let second = self.position(nodes[1]);
                !are_collinear(&(first - self.position(tail)), &(second - first))
            }
            None => true,
        };
        let needs_trailing = match next.and_then(PathSegment::first) {
            Some(head) => {
                let last = self.position(nodes[nodes.len() - 1]);
                let penultimate = self.position(nodes[nodes.len() - 2]);
                !are_collinear(&(last - penultimate), &(self.position(head) - last))
            }
            None => true,
        };

        let body_start = usize::from(needs_leading);
        let body_end = if needs_trailing { nodes.len() - 1 } else { nodes.len() };

        if needs_leading {
            let secondary = self.next_secondary(main);
            let mut stitch = segment.derive(vec![nodes[0]], main, secondary);
            stitch.design_strategy = Some(DesignStrategy::Single);
            out.push(stitch);
        }
        if body_start < body_end {
            let secondary = self.next_secondary(main);
            let mut body = segment.derive(nodes[body_start..body_end].to_vec(), main, secondary);
            body.design_strategy = Some(DesignStrategy::Spline);
            out.push(body);
        }
        if needs_trailing {
            let secondary = self.next_secondary(main);
            let mut stitch = segment.derive(vec![nodes[nodes.len() - 1]], main, secondary);
            stitch.design_strategy = Some(DesignStrategy::Single);
            out.push(stitch);
        }
        out
    }

    /// Extend segment ends, bridge into curves and split mixed stitches.
    pub fn adjust_segments(&mut self) {
        let mut previous_end: Option<usize> = None;
        let mut previous_curve: Option<PathCurveType> = None;
        let mut i = 0;

        while i < self.segments.len() {
            let curved = self.segments[i].curve_type.is_some();
            if let (true, Some(prev), Some(head)) = (curved, previous_end, self.segments[i].first()) {
                if !is_same_location(&self.position(prev), &self.position(head), LOCATION_TOLERANCE) {
                    let both_circular =
                        self.nodes[prev].in_circular_grid && self.nodes[head].in_circular_grid;
                    let target = &self.segments[i];
                    let mut bridge =
                        target.derive(vec![prev, head], target.main_index, target.secondary_index);
                    bridge.design_strategy = Some(DesignStrategy::Compound);
                    bridge.curve_type = Some(if both_circular {
                        PathCurveType::Arc
                    } else {
                        PathCurveType::Straight
                    });
                    debug!(
                        main = target.main_index,
                        secondary = target.secondary_index,
                        curve = ?bridge.curve_type,
                        "bridge inserted before curved segment"
                    );
                    previous_end = Some(head);
                    previous_curve = bridge.curve_type;
                    self.segments.insert(i, bridge);
                    i += 1;
                }
            }

            let boundary = Boundary {
                previous_end: previous_end.map(|p| self.position(p)),
                next_start: self
                    .segments
                    .get(i + 1)
                    .and_then(PathSegment::first)
                    .map(|n| self.position(n)),
                previous_curve,
                next_curve: self.segments.get(i + 1).and_then(|s| s.curve_type),
            };

            let mut segment = std::mem::replace(&mut self.segments[i], PathSegment::new(Vec::new(), 0, 0));
            if !segment.locked {
                segment.adjust_start_and_endpoints(&mut self.nodes, self.pitch, &boundary);
            }

            if segment.design_strategy == Some(DesignStrategy::Single) {
                if let Some(runs) = self.split_mixed_single(&segment) {
                    let count = runs.len();
                    if let Some(last) = runs.last() {
                        previous_end = last.last();
                        previous_curve = last.curve_type;
                    }
                    self.segments.splice(i..i + 1, runs);
                    i += count;
                    continue;
                }
            }

            if let Some(end) = segment.last() {
                previous_end = Some(end);
                previous_curve = segment.curve_type;
            }
            self.segments[i] = segment;
            i += 1;
        }

        self.harmonise_circular_transitions();
    }

    /// Replace a stitch that mixes circular and rectangular nodes with 2-node runs.
    fn split_mixed_single(&self, segment: &PathSegment) -> Option<Vec<PathSegment>> {
        let mut unique: Vec<usize> = Vec::new();
        for &index in &segment.nodes {
            let duplicate = unique.last().is_some_and(|&last| {
                is_same_location(&self.position(last), &self.position(index), LOCATION_TOLERANCE)
            });
            if !duplicate {
                unique.push(index);
            }
        }
        if unique.len() <= 2 {
            return None;
        }
        let circular = unique.iter().filter(|&&i| self.nodes[i].in_circular_grid).count();
        if circular == 0 || circular == unique.len() {
            return None;
        }

        Some(
            unique
                .windows(2)
                .map(|pair| {
                    let is_circular = pair.iter().all(|&i| self.nodes[i].in_circular_grid);
                    let mut run =
                        segment.derive(pair.to_vec(), segment.main_index, segment.secondary_index);
                    run.design_strategy = Some(DesignStrategy::Compound);
                    run.curve_type = Some(if is_circular {
                        PathCurveType::Arc
                    } else {
                        PathCurveType::Straight
                    });
                    run
                })
                .collect(),
        )
    }

    /// Move circular/rectangular hand-overs off segment boundaries.
    ///
    /// Only boundaries between different main indices are considered. When
    /// both boundary nodes are circular but the node before (pattern A) or
    /// after (pattern B) is not, a straight midpoint bridge is inserted as a
    /// 2-node segment sharing its end nodes with both neighbours.
    pub fn harmonise_circular_transitions(&mut self) {
        let mut idx = 0;
        while idx + 1 < self.segments.len() {
            let (a, b) = (&self.segments[idx], &self.segments[idx + 1]);
            if a.main_index == b.main_index || a.nodes.len() < 2 || b.nodes.len() < 2 {
                idx += 1;
                continue;
            }

            let second_last_a = a.nodes[a.nodes.len() - 2];
            let end_a = a.nodes[a.nodes.len() - 1];
            let start_b = b.nodes[0];
            let second_b = b.nodes[1];
            let boundary_circular =
                self.nodes[end_a].in_circular_grid && self.nodes[start_b].in_circular_grid;

            if boundary_circular && !self.nodes[second_last_a].in_circular_grid {
                let mid = midpoint(&self.position(second_last_a), &self.position(start_b));
                let mut bridge = Node::detached(mid.x, mid.y, mid.z);
                bridge.in_rectangular_grid = self.nodes[second_last_a].in_rectangular_grid;
                let bridge = self.push_node(bridge);

                let b = &self.segments[idx + 1];
                let mut connector =
                    b.derive(vec![bridge, start_b], b.main_index, b.secondary_index.saturating_sub(1));
                connector.design_strategy = Some(DesignStrategy::Compound);
                connector.curve_type = None;

                debug!(main_a = self.segments[idx].main_index, main_b = b.main_index, "harmonised pattern A");
                let a = &mut self.segments[idx];
                let last = a.nodes.len() - 1;
                a.nodes[last] = bridge;
                self.segments.insert(idx + 1, connector);
                idx += 2;
                continue;
            }

            if boundary_circular && !self.nodes[second_b].in_circular_grid {
                let mid = midpoint(&self.position(end_a), &self.position(second_b));
                let mut bridge = Node::detached(mid.x, mid.y, mid.z);
                bridge.in_rectangular_grid = self.nodes[second_b].in_rectangular_grid;
                let bridge = self.push_node(bridge);

                let a = &self.segments[idx];
                let mut connector = a.derive(vec![end_a, bridge], a.main_index, a.secondary_index + 1);
                connector.design_strategy = Some(DesignStrategy::Compound);
                connector.curve_type = None;

                debug!(main_a = a.main_index, main_b = self.segments[idx + 1].main_index, "harmonised pattern B");
                self.segments[idx + 1].nodes[0] = bridge;
                self.segments.insert(idx + 1, connector);
                idx += 2;
                continue;
            }

            idx += 1;
        }
    }

    /// The segment holding the puzzle start gets the U profile.
    pub fn create_start_ramp(&mut self) {
        let nodes = &self.nodes;
        if let Some(segment) = self
            .segments
            .iter_mut()
            .find(|s| s.nodes.iter().any(|&i| nodes[i].puzzle_start))
        {
            segment.profile = Some(PathProfileType::UShape);
        }
    }

    /// Extend the puzzle end by half a pitch into a closing straight segment.
    ///
    /// The extension follows the travel direction, or the ring tangent when
    /// the last two nodes are both circular.
    pub fn create_finish_box(&mut self) {
        let found = self.segments.iter().enumerate().find_map(|(s, seg)| {
            seg.nodes
                .iter()
                .position(|&i| self.nodes[i].puzzle_end)
                .map(|k| (s, k))
        });
        let Some((s, k)) = found else {
            return;
        };
        if k < 1 {
            return;
        }

        let segment = &self.segments[s];
        let last = segment.nodes[k];
        let prev = segment.nodes[k - 1];
        let p = self.position(prev);
        let q = self.position(last);
        let travel = q - p;

        let direction = if self.nodes[prev].in_circular_grid && self.nodes[last].in_circular_grid {
            let mut tangent = direction_or(Vector3::new(-q.y, q.x, 0.0), direction_or(travel, Vector3::x()));
            if travel.dot(&tangent) < 0.0 {
                tangent = -tangent;
            }
            tangent
        } else {
            direction_or(travel, Vector3::x())
        };
        let extended = q + direction * (self.pitch / 2.0);

        let template = &self.nodes[last];
        let mut end = Node::detached(extended.x, extended.y, extended.z);
        end.in_circular_grid = template.in_circular_grid;
        end.in_rectangular_grid = template.in_rectangular_grid;
        end.puzzle_end = true;
        end.segment_end = true;

        let old = &mut self.nodes[last];
        old.puzzle_end = false;
        old.segment_end = false;
        let end = self.push_node(end);

        let segment = &self.segments[s];
        let mut finish = segment.derive(vec![last, end], segment.main_index, segment.secondary_index + 1);
        finish.design_strategy = Some(DesignStrategy::Compound);
        finish.curve_type = Some(PathCurveType::Straight);
        debug!(main = finish.main_index, "finish box appended");
        self.segments.push(finish);
    }

    /// Round for V/O profiles and stitches; otherwise alternate per main index.
    pub fn assign_transition_types(&mut self) {
        let mut transition = TransitionType::Round;
        for segment in &mut self.segments {
            if segment.transition.is_some() {
                continue;
            }
            let round_profile = matches!(
                segment.profile,
                Some(PathProfileType::VShape) | Some(PathProfileType::OShape)
            );
            if round_profile || segment.design_strategy == Some(DesignStrategy::Single) {
                segment.transition = Some(TransitionType::Round);
                continue;
            }
            if segment.secondary_index == 0 {
                transition = transition.flipped();
            }
            segment.transition = Some(transition);
        }
    }

    /// Fill accent and support profiles from the profile registries.
    pub fn assign_profile_hints(&mut self) {
        for segment in &mut self.segments {
            segment.support_profile = segment.profile.and_then(PathProfileType::support_profile);
            segment.accent_profile = segment.profile.and_then(PathProfileType::accent_profile);
        }
    }

    /// Unclassified compound runs are straight.
    fn finalize_curve_types(&mut self) {
        for segment in &mut self.segments {
            if segment.design_strategy == Some(DesignStrategy::Compound) && segment.curve_type.is_none() {
                segment.curve_type = Some(PathCurveType::Straight);
            }
        }
    }

    /// Dense labels: main indices from 1 in order of appearance, secondary from 0.
    pub fn reindex_segments(&mut self) {
        let mut next_main = 1;
        let mut secondary = 0;
        let mut previous: Option<usize> = None;
        let mut mapped = 0;

        for segment in &mut self.segments {
            if previous != Some(segment.main_index) {
                previous = Some(segment.main_index);
                mapped = next_main;
                next_main += 1;
                secondary = 0;
            }
            segment.main_index = mapped;
            segment.secondary_index = secondary;
            secondary += 1;
        }
    }
}

fn exclude_previous<T: PartialEq + Copy>(options: &mut Vec<T>, previous: Option<T>) {
    if let Some(prev) = previous {
        if options.len() > 1 && options.contains(&prev) {
            options.retain(|o| *o != prev);
        }
    }
}

fn are_collinear(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    let (Some(da), Some(db)) = (a.try_normalize(0.0), b.try_normalize(0.0)) else {
        return false;
    };
    let dot = da.dot(&db).clamp(-1.0, 1.0);
    if dot.abs() >= 1.0 - COLLINEAR_TOLERANCE {
        return true;
    }
    da.cross(&db).norm_squared() <= COLLINEAR_TOLERANCE
}
