//! Error handling for marblemaze
//!
//! Provides error types for every generation stage:
//! - Lattice errors (casing configuration, node lookup)
//! - Placement errors (obstacle catalogue and placement)
//! - Path errors (path finder and path architect)
//!
//! Only lattice configuration errors abort a generation run. The remaining
//! stages degrade gracefully and report through `tracing` instead.

use thiserror::Error;

/// Lattice error type
///
/// Raised while building the node lattice for a casing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    /// The casing produced no interior nodes
    #[error("No nodes were created inside the {casing} casing")]
    EmptyLattice {
        /// The casing shape name.
        casing: String,
    },

    /// A casing dimension is not usable
    #[error("Invalid casing dimension '{name}': {value}")]
    InvalidDimension {
        /// The dimension name.
        name: String,
        /// The offending value.
        value: f64,
    },
}

/// Obstacle placement error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// The requested obstacle is not part of the catalogue
    #[error("Unknown obstacle type: {name}")]
    UnknownObstacle {
        /// The requested obstacle name.
        name: String,
    },

    /// No valid placement was found within the attempt budget
    #[error("Could not place obstacle '{name}' after {attempts} attempts")]
    Exhausted {
        /// The obstacle name.
        name: String,
        /// Number of attempts made.
        attempts: usize,
    },
}

/// Path error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The lattice has no start node to route from
    #[error("Lattice has no start node")]
    NoStartNode,
}

/// Main error type for marblemaze
///
/// Unifies all error types for consistent error handling across the workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Lattice error
    #[error(transparent)]
    Lattice(#[from] LatticeError),

    /// Placement error
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Path error
    #[error(transparent)]
    Path(#[from] PathError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error stems from an unusable casing configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Lattice(LatticeError::EmptyLattice { .. })
                | Error::Lattice(LatticeError::InvalidDimension { .. })
        )
    }

    /// Check if this is a lattice error
    pub fn is_lattice_error(&self) -> bool {
        matches!(self, Error::Lattice(_))
    }

    /// Check if this is a placement error
    pub fn is_placement_error(&self) -> bool {
        matches!(self, Error::Placement(_))
    }

    /// Check if this is a path error
    pub fn is_path_error(&self) -> bool {
        matches!(self, Error::Path(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
