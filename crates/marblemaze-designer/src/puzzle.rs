//! End-to-end puzzle generation
//!
//! Runs the stages in a fixed order and threads one seeded PRNG through
//! them, so a configuration and seed always yield the same puzzle.

use crate::architect::{PathArchitect, PathLayout};
use crate::casing::Casing;
use crate::lattice::Lattice;
use crate::obstacles::{ObstacleCatalogue, ObstacleManager, PlacedObstacle};
use crate::pathfinding::{Adjacency, PathFinder, PathPlan};
use marblemaze_core::{NodeId, Result};
use marblemaze_settings::PuzzleConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

/// Counts describing a generated puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PuzzleSummary {
    pub casing: String,
    pub seed: u64,
    pub lattice_nodes: usize,
    pub mounting_nodes: usize,
    pub obstacles: usize,
    pub waypoints: usize,
    pub path_nodes: usize,
    pub missed_mounting: usize,
    pub segments: usize,
}

/// A generated puzzle: lattice, obstacles, routed path and segment layout.
#[derive(Debug, Clone)]
pub struct Puzzle {
    casing: &'static str,
    seed: u64,
    lattice: Lattice,
    obstacles: Vec<PlacedObstacle>,
    plan: PathPlan,
    layout: PathLayout,
}

impl Puzzle {
    /// Generate a puzzle from a validated configuration.
    ///
    /// Only configuration and lattice errors are returned. Later stages
    /// degrade to fewer obstacles, waypoints or path legs.
    pub fn generate(config: &PuzzleConfig) -> Result<Self> {
        Self::generate_with_catalogue(config, &ObstacleCatalogue::builtin())
    }

    /// Like [`Puzzle::generate`] with a custom obstacle catalogue.
    pub fn generate_with_catalogue(config: &PuzzleConfig, catalogue: &ObstacleCatalogue) -> Result<Self> {
        config.validate()?;
        let pitch = config.node_size;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let casing = Casing::from_settings(&config.casing, pitch)?;
        let mut lattice = casing.create_nodes()?;
        let mounting = casing.get_mounting_waypoints(&mut lattice);

        let manager = ObstacleManager::new(config.obstacles.clone(), catalogue)?;
        let obstacles = manager.place_obstacles(&mut lattice, &mut rng);

        lattice.select_waypoints(config.waypoints.count, config.waypoints.candidates, &mut rng);

        let adjacency = Adjacency::new(
            casing.adjacency_rules(),
            pitch,
            config.path.bridge_tolerance_factor,
        );
        let plan = PathFinder::new(adjacency).connect_waypoints(&mut lattice, &obstacles)?;

        let layout = PathArchitect::build(&config.path, &lattice, &plan.total_path, &obstacles, &mut rng);

        let puzzle = Self {
            casing: casing.name(),
            seed: config.seed,
            lattice,
            obstacles,
            plan,
            layout,
        };
        let summary = puzzle.summary();
        info!(
            casing = summary.casing,
            seed = summary.seed,
            mounting = mounting.len(),
            obstacles = summary.obstacles,
            path_nodes = summary.path_nodes,
            segments = summary.segments,
            "puzzle generated"
        );
        Ok(puzzle)
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn obstacles(&self) -> &[PlacedObstacle] {
        &self.obstacles
    }

    pub fn plan(&self) -> &PathPlan {
        &self.plan
    }

    /// Ordered ball path through the lattice.
    pub fn total_path(&self) -> &[NodeId] {
        &self.plan.total_path
    }

    pub fn layout(&self) -> &PathLayout {
        &self.layout
    }

    pub fn summary(&self) -> PuzzleSummary {
        PuzzleSummary {
            casing: self.casing.to_string(),
            seed: self.seed,
            lattice_nodes: self.lattice.len(),
            mounting_nodes: self.lattice.mounting_nodes().len(),
            obstacles: self.obstacles.len(),
            waypoints: self.lattice.waypoints().len(),
            path_nodes: self.plan.total_path.len(),
            missed_mounting: self.plan.missed_mounting.len(),
            segments: self.layout.segments.len(),
        }
    }
}
