//! Obstacle catalogue and placement
//!
//! Obstacles are prefabricated sub-paths. The catalogue describes them in
//! local grid offsets; the manager rotates and translates them into the
//! lattice, marks their nodes occupied and registers the entry node as a
//! waypoint so the path finder can splice the obstacle into the ball path.

mod catalogue;
mod manager;
mod shapes;
mod trace;
mod transform;

pub use catalogue::{ObstacleCatalogue, ObstacleTemplate};
pub use manager::{ObstacleManager, PlacedObstacle};
pub use transform::{ObstacleTransform, QuarterTurns};
