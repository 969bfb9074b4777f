//! Rejection-sampling obstacle placement
//!
//! Placement cycles through the allowed templates in catalogue order. Each
//! template gets up to `max_attempts` random draws per cycle (rotation, then
//! origin); a cycle that places nothing ends the run.

use super::catalogue::{ObstacleCatalogue, ObstacleTemplate};
use super::transform::{ObstacleTransform, QuarterTurns};
use crate::lattice::{Bounds, Lattice};
use marblemaze_core::geometry::quantize;
use marblemaze_core::{GridKey, NodeId, ObstacleId, PlacementError, Result};
use marblemaze_settings::ObstacleSettings;
use nalgebra::Vector3;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// An obstacle committed to the lattice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedObstacle {
    pub id: ObstacleId,
    pub name: String,
    pub transform: ObstacleTransform,
    /// Occupied lattice nodes in polyline order, entry first
    pub path: Vec<NodeId>,
    pub entry: NodeId,
    pub exit: NodeId,
}

impl PlacedObstacle {
    /// True when `node` belongs to this obstacle's body.
    pub fn contains(&self, node: NodeId) -> bool {
        self.path.contains(&node)
    }
}

/// Places catalogue obstacles into a lattice.
#[derive(Debug, Clone)]
pub struct ObstacleManager {
    settings: ObstacleSettings,
    catalogue: ObstacleCatalogue,
}

impl ObstacleManager {
    /// Restrict `catalogue` to the allowed names in `settings`.
    ///
    /// Fails with [`PlacementError::UnknownObstacle`] for a name the catalogue
    /// does not know.
    pub fn new(settings: ObstacleSettings, catalogue: &ObstacleCatalogue) -> Result<Self> {
        let catalogue = catalogue.filtered(&settings.allowed)?;
        Ok(Self { settings, catalogue })
    }

    pub fn catalogue(&self) -> &ObstacleCatalogue {
        &self.catalogue
    }

    /// Place up to `settings.count` obstacles.
    ///
    /// Exhausted templates are skipped with a warning; the returned list may be
    /// shorter than requested.
    pub fn place_obstacles<R: Rng + ?Sized>(
        &self,
        lattice: &mut Lattice,
        rng: &mut R,
    ) -> Vec<PlacedObstacle> {
        let mut placed: Vec<PlacedObstacle> = Vec::new();
        let target = self.settings.count;
        if target == 0 || self.catalogue.is_empty() {
            return placed;
        }
        let Some(bounds) = lattice.bounds() else {
            return placed;
        };

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut cycle = 0usize;
        while placed.len() < target {
            cycle += 1;
            let mut progress = false;

            for template in self.catalogue.templates() {
                if placed.len() >= target {
                    break;
                }
                let used = counts.get(template.name()).copied().unwrap_or(0);
                if used >= self.settings.per_type_limit {
                    continue;
                }

                let id = ObstacleId(placed.len());
                match self.try_place_one(template, id, lattice, &bounds, rng) {
                    Some(obstacle) => {
                        *counts.entry(template.name()).or_default() += 1;
                        debug!(
                            cycle,
                            name = template.name(),
                            placed = placed.len() + 1,
                            target,
                            "obstacle placed"
                        );
                        placed.push(obstacle);
                        progress = true;
                    }
                    None => {
                        let err = PlacementError::Exhausted {
                            name: template.name().to_string(),
                            attempts: self.settings.max_attempts,
                        };
                        warn!(cycle, "{err}");
                    }
                }
            }

            if !progress {
                break;
            }
        }

        for (name, count) in &counts {
            info!(obstacle = *name, count, "obstacle placement summary");
        }
        info!(placed = placed.len(), requested = target, "obstacles placed");
        placed
    }

    fn try_place_one<R: Rng + ?Sized>(
        &self,
        template: &ObstacleTemplate,
        id: ObstacleId,
        lattice: &mut Lattice,
        bounds: &Bounds,
        rng: &mut R,
    ) -> Option<PlacedObstacle> {
        let pitch = lattice.pitch();
        let clearance = template.clearance();

        for attempt in 0..self.settings.max_attempts {
            let rotation = QuarterTurns::random(rng);
            let interior = interior_candidates(lattice, bounds, template, &clearance, rotation);
            let pool = if interior.is_empty() {
                fallback_candidates(lattice)
            } else {
                interior
            };
            let Some(&origin_id) = pool.choose(rng) else {
                return None;
            };

            let origin = lattice.node(origin_id).position();
            let transform = ObstacleTransform {
                rotation,
                translation: origin.map(|v| quantize(v, pitch)),
                pitch,
            };

            match resolve_placement(lattice, template, &clearance, &transform) {
                Some(path) => return Some(commit(lattice, template, id, transform, path)),
                None => {
                    debug!(
                        attempt = attempt + 1,
                        name = template.name(),
                        rotation = ?rotation.degrees(),
                        pool = pool.len(),
                        "placement rejected"
                    );
                }
            }
        }
        None
    }
}

/// Origins for which the rotated obstacle, clearance included, stays inside `bounds`.
fn interior_candidates(
    lattice: &Lattice,
    bounds: &Bounds,
    template: &ObstacleTemplate,
    clearance: &[Vector3<i32>],
    rotation: QuarterTurns,
) -> Vec<NodeId> {
    let pitch = lattice.pitch();
    let mut lo = Vector3::repeat(i32::MAX);
    let mut hi = Vector3::repeat(i32::MIN);
    for offset in template.occupied().iter().chain(clearance) {
        let r = rotation.apply(offset);
        lo = lo.inf(&r);
        hi = hi.sup(&r);
    }

    let min = bounds.min - lo.cast::<f64>() * pitch;
    let max = bounds.max - hi.cast::<f64>() * pitch;
    let inner = Bounds { min, max };
    let eps = pitch * 1e-6;

    lattice
        .iter()
        .filter(|(_, n)| n.in_rectangular_grid && !n.start_ramp)
        .filter(|(_, n)| inner.contains(&n.position(), eps))
        .map(|(id, _)| id)
        .collect()
}

fn fallback_candidates(lattice: &Lattice) -> Vec<NodeId> {
    lattice
        .iter()
        .filter(|(_, n)| n.in_rectangular_grid && !n.start_ramp)
        .map(|(id, _)| id)
        .collect()
}

/// Lattice ids of the transformed occupied offsets, or `None` if any is
/// missing or already claimed, or if a clearance offset falls off the lattice.
fn resolve_placement(
    lattice: &Lattice,
    template: &ObstacleTemplate,
    clearance: &[Vector3<i32>],
    transform: &ObstacleTransform,
) -> Option<Vec<NodeId>> {
    let mut path = Vec::with_capacity(template.occupied().len());
    for offset in template.occupied() {
        let world = transform.apply(offset);
        let id = lattice.find_key(&GridKey::from_vector(&world))?;
        let node = lattice.node(id);
        if node.occupied || node.waypoint || node.mounting || node.start_ramp {
            return None;
        }
        path.push(id);
    }
    for offset in clearance {
        lattice.find_key(&GridKey::from_vector(&transform.apply(offset)))?;
    }
    Some(path)
}

fn commit(
    lattice: &mut Lattice,
    template: &ObstacleTemplate,
    id: ObstacleId,
    transform: ObstacleTransform,
    path: Vec<NodeId>,
) -> PlacedObstacle {
    for &node_id in &path {
        let node = lattice.node_mut(node_id);
        node.occupied = true;
        node.obstacle = Some(id);
    }

    let entry = path[0];
    let exit = path[path.len() - 1];
    lattice.node_mut(entry).waypoint = true;
    if entry == exit {
        warn!(name = template.name(), "obstacle entry and exit map to the same node");
    }

    PlacedObstacle {
        id,
        name: template.name().to_string(),
        transform,
        path,
        entry,
        exit,
    }
}
