//! # marblemaze core
//!
//! Shared types for the marble maze path synthesis workspace:
//! - [`Node`] and the arena ids ([`NodeId`], [`ObstacleId`])
//! - Grid geometry helpers and the quantized [`GridKey`]
//! - Path annotation enums shared by the path architect and configuration
//! - The unified [`Error`] type

pub mod error;
pub mod geometry;
pub mod node;
pub mod path_types;

pub use error::{Error, LatticeError, PathError, PlacementError, Result};
pub use geometry::{frange, pitch_multiples, quantize, snap, GridKey};
pub use node::{Node, NodeId, ObstacleId};
pub use path_types::{
    CurveDetector, DesignStrategy, PathCurveType, PathProfileType, TransitionType,
};
