//! # marblemaze designer
//!
//! Path topology synthesis for 3D-printable marble maze puzzles. Given a
//! casing shape and a node size, the designer lays out a node lattice, places
//! prefabricated obstacles, routes a continuous ball path through mounting
//! and random waypoints, and cuts that path into annotated segments for the
//! sweep profile generator.
//!
//! ## Architecture
//!
//! ```text
//! PuzzleConfig
//!   └── Casing (sphere, box, cylinder, ellipsoid)
//!         └── Lattice (rectangular grid + circular rings, start ramp, mounting)
//!               ├── ObstacleManager (catalogue, rotate, translate, occupy)
//!               ├── select_waypoints (best-candidate sampling)
//!               └── PathFinder (hybrid adjacency, A*, teleport, end-trim)
//!                     └── PathArchitect (split, profiles, curves, bridges)
//!                           └── PathLayout (nodes + segments)
//! ```
//!
//! All randomness flows from one seeded PRNG in stage order: obstacles,
//! waypoints, then path properties.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marblemaze_designer::Puzzle;
//! use marblemaze_settings::PuzzleConfig;
//!
//! let puzzle = Puzzle::generate(&PuzzleConfig::default().with_seed(7))?;
//! for segment in &puzzle.layout().segments {
//!     println!("{:?} {:?}", segment.label(), segment.design_strategy);
//! }
//! ```

pub mod architect;
pub mod casing;
pub mod lattice;
pub mod obstacles;
pub mod pathfinding;
pub mod puzzle;

pub use architect::{PathArchitect, PathLayout, PathSegment};
pub use casing::{AdjacencyRules, Casing, CasingShape};
pub use lattice::{Bounds, Lattice};
pub use obstacles::{ObstacleCatalogue, ObstacleManager, ObstacleTemplate, PlacedObstacle};
pub use pathfinding::{Adjacency, PathFinder, PathPlan};
pub use puzzle::{Puzzle, PuzzleSummary};
