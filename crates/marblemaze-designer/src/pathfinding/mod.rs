//! Path finding
//!
//! - `neighbors`: hybrid rectangular/circular adjacency
//! - `astar`: single-pair A* with per-query scratch state
//! - `waypoints`: waypoint distribution policy, obstacle teleport and end-trim

mod astar;
mod neighbors;
mod waypoints;

pub use astar::{PathFinder, SearchScratch};
pub use neighbors::{Adjacency, NeighborList};
pub use waypoints::{DistributionPolicy, PathPlan, WaypointKind};
