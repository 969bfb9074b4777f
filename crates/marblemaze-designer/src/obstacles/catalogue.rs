//! Built-in obstacle templates
//!
//! A template is a chain of grid offsets in pitch units. The chain cells are
//! the nodes the obstacle occupies, its 6-neighbourhood forms the clearance
//! shell, and the first and last cell are where the ball enters and leaves.
//! The built-in shapes are drawn as curves and traced onto the grid.

use super::shapes::{self, Signal};
use super::trace::Curve;
use marblemaze_core::{PlacementError, Result};
use nalgebra::Vector3;
use std::collections::BTreeSet;

const CARDINAL_OFFSETS: [[i32; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// A prefabricated sub-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleTemplate {
    name: String,
    path: Vec<Vector3<i32>>,
}

impl ObstacleTemplate {
    /// Create a template from its polyline. The polyline must not be empty.
    pub fn new(name: impl Into<String>, path: &[[i32; 3]]) -> Self {
        Self {
            name: name.into(),
            path: path.iter().map(|p| Vector3::new(p[0], p[1], p[2])).collect(),
        }
    }

    /// Template whose path is `curve` traced onto the grid.
    pub(crate) fn traced(name: impl Into<String>, curve: &Curve) -> Self {
        Self {
            name: name.into(),
            path: curve.trace(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Occupied offsets, in path order.
    pub fn occupied(&self) -> &[Vector3<i32>] {
        &self.path
    }

    /// Offsets next to the obstacle that other obstacles may overlap.
    pub fn clearance(&self) -> Vec<Vector3<i32>> {
        let occupied: BTreeSet<[i32; 3]> = self.path.iter().map(|p| [p.x, p.y, p.z]).collect();
        let mut shell = BTreeSet::new();
        for p in &self.path {
            for d in CARDINAL_OFFSETS {
                let q = [p.x + d[0], p.y + d[1], p.z + d[2]];
                if !occupied.contains(&q) {
                    shell.insert(q);
                }
            }
        }
        shell
            .into_iter()
            .map(|q| Vector3::new(q[0], q[1], q[2]))
            .collect()
    }

    /// Entry offset (first polyline vertex).
    pub fn entry(&self) -> Vector3<i32> {
        self.path.first().copied().unwrap_or_else(Vector3::zeros)
    }

    /// Exit offset (last polyline vertex).
    pub fn exit(&self) -> Vector3<i32> {
        self.path.last().copied().unwrap_or_else(Vector3::zeros)
    }
}

/// Set of obstacle templates available for placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleCatalogue {
    templates: Vec<ObstacleTemplate>,
}

impl ObstacleCatalogue {
    /// Catalogue from explicit templates.
    pub fn new(templates: Vec<ObstacleTemplate>) -> Self {
        Self { templates }
    }

    /// The built-in templates, U Turn first.
    pub fn builtin() -> Self {
        Self::new(vec![
            ObstacleTemplate::traced("U Turn", &shapes::u_turn()),
            ObstacleTemplate::traced("Alpha", &shapes::alpha()),
            ObstacleTemplate::traced("Omega", &shapes::omega()),
            ObstacleTemplate::traced("Spiral", &shapes::spiral()),
            ObstacleTemplate::traced("Question Mark", &shapes::question_mark()),
            ObstacleTemplate::traced("Gosper Curve", &shapes::gosper_curve()),
            ObstacleTemplate::traced("Overhand Knot", &shapes::overhand_knot()),
            ObstacleTemplate::traced("Zig Zag", &shapes::signal(Signal::ZigZag)),
            ObstacleTemplate::traced("Sine", &shapes::signal(Signal::Sine)),
            ObstacleTemplate::traced("Pulse", &shapes::signal(Signal::Pulse)),
        ])
    }

    /// Restrict the catalogue to the named templates, keeping catalogue order.
    ///
    /// An empty list keeps every template.
    pub fn filtered(&self, allowed: &[String]) -> Result<Self> {
        if allowed.is_empty() {
            return Ok(self.clone());
        }
        for name in allowed {
            if self.get(name).is_none() {
                return Err(PlacementError::UnknownObstacle { name: name.clone() }.into());
            }
        }
        Ok(Self::new(
            self.templates
                .iter()
                .filter(|t| allowed.iter().any(|a| a == t.name()))
                .cloned()
                .collect(),
        ))
    }

    pub fn get(&self, name: &str) -> Option<&ObstacleTemplate> {
        self.templates.iter().find(|t| t.name() == name)
    }

    pub fn templates(&self) -> &[ObstacleTemplate] {
        &self.templates
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(ObstacleTemplate::name).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for ObstacleCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}
