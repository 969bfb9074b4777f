//! Puzzle generation configuration
//!
//! Configuration is organized into logical sections:
//! - Casing shape and dimensions
//! - Obstacle placement budget
//! - Random waypoint sampling
//! - Path architecture (segmenting, profiles, curve detection)
//!
//! Every section has sensible defaults, so a partial JSON or TOML file only
//! needs to name the values it overrides.

use crate::error::{SettingsError, SettingsResult};
use marblemaze_core::{CurveDetector, DesignStrategy, PathProfileType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Casing shape and dimensions (millimetres)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum CasingSettings {
    /// Hollow sphere
    Sphere {
        diameter: f64,
        shell_thickness: f64,
        mounting_points: usize,
    },
    /// Rectangular box assembled from panels
    Box {
        width: f64,
        height: f64,
        length: f64,
        panel_thickness: f64,
    },
    /// Upright cylinder
    Cylinder {
        diameter: f64,
        height: f64,
        shell_thickness: f64,
        mounting_points: usize,
    },
    /// Ellipsoid with independent diameters per axis
    Ellipsoid {
        diameter_x: f64,
        diameter_y: f64,
        diameter_z: f64,
        shell_thickness: f64,
        mounting_points: usize,
    },
}

impl Default for CasingSettings {
    fn default() -> Self {
        Self::Sphere {
            diameter: 100.0,
            shell_thickness: 2.5,
            mounting_points: 4,
        }
    }
}

impl CasingSettings {
    /// Default box casing.
    pub fn default_box() -> Self {
        Self::Box {
            width: 100.0,
            height: 100.0,
            length: 150.0,
            panel_thickness: 3.0,
        }
    }

    /// Default cylinder casing.
    pub fn default_cylinder() -> Self {
        Self::Cylinder {
            diameter: 100.0,
            height: 100.0,
            shell_thickness: 2.5,
            mounting_points: 8,
        }
    }

    /// Default ellipsoid casing.
    pub fn default_ellipsoid() -> Self {
        Self::Ellipsoid {
            diameter_x: 120.0,
            diameter_y: 100.0,
            diameter_z: 80.0,
            shell_thickness: 2.5,
            mounting_points: 4,
        }
    }

    /// Shape name, as used in config files and log output.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Cylinder { .. } => "cylinder",
            Self::Ellipsoid { .. } => "ellipsoid",
        }
    }

    fn validate(&self) -> SettingsResult<()> {
        let positive = |key: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::invalid(key, format!("must be > 0, got {}", value)))
            }
        };
        let wall = |key: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SettingsError::invalid(key, format!("must be >= 0, got {}", value)))
            }
        };

        match *self {
            Self::Sphere {
                diameter,
                shell_thickness,
                ..
            } => {
                positive("casing.diameter", diameter)?;
                wall("casing.shell_thickness", shell_thickness)?;
            }
            Self::Box {
                width,
                height,
                length,
                panel_thickness,
            } => {
                positive("casing.width", width)?;
                positive("casing.height", height)?;
                positive("casing.length", length)?;
                wall("casing.panel_thickness", panel_thickness)?;
            }
            Self::Cylinder {
                diameter,
                height,
                shell_thickness,
                ..
            } => {
                positive("casing.diameter", diameter)?;
                positive("casing.height", height)?;
                wall("casing.shell_thickness", shell_thickness)?;
            }
            Self::Ellipsoid {
                diameter_x,
                diameter_y,
                diameter_z,
                shell_thickness,
                ..
            } => {
                positive("casing.diameter_x", diameter_x)?;
                positive("casing.diameter_y", diameter_y)?;
                positive("casing.diameter_z", diameter_z)?;
                wall("casing.shell_thickness", shell_thickness)?;
            }
        }
        Ok(())
    }
}

/// Obstacle placement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleSettings {
    /// Number of obstacle instances to try to place
    pub count: usize,
    /// Rejection-sampling draws per instance
    pub max_attempts: usize,
    /// Maximum instances of a single catalogue type
    pub per_type_limit: usize,
    /// Allowed catalogue names (empty means all)
    pub allowed: Vec<String>,
}

impl Default for ObstacleSettings {
    fn default() -> Self {
        Self {
            count: 3,
            max_attempts: 200,
            per_type_limit: 3,
            allowed: Vec::new(),
        }
    }
}

/// Random (non-mounting) waypoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointSettings {
    /// Number of waypoints to select
    pub count: usize,
    /// Candidates drawn per selection (best-candidate sampling)
    pub candidates: usize,
}

impl Default for WaypointSettings {
    fn default() -> Self {
        Self {
            count: 5,
            candidates: 10,
        }
    }
}

/// Path architecture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Every Nth non-mounting waypoint closes a segment
    pub waypoint_change_interval: usize,
    /// Near-cardinal bridge tolerance as a fraction of the pitch
    pub bridge_tolerance_factor: f64,
    /// Profiles the architect may choose from
    pub profile_types: Vec<PathProfileType>,
    /// Design strategies the architect may choose from
    pub design_strategies: Vec<DesignStrategy>,
    /// Enabled curve detectors
    pub curve_detectors: Vec<CurveDetector>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            waypoint_change_interval: 3,
            bridge_tolerance_factor: 0.1,
            profile_types: vec![
                PathProfileType::LShape,
                PathProfileType::LShapeMirrored,
                PathProfileType::OShape,
                PathProfileType::UShape,
                PathProfileType::VShape,
                PathProfileType::SquareWithHoleShape,
            ],
            design_strategies: vec![DesignStrategy::Compound, DesignStrategy::Spline],
            curve_detectors: CurveDetector::all(),
        }
    }
}

/// Complete puzzle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Seed of the single PRNG shared by all stages
    pub seed: u64,
    /// Lattice pitch
    pub node_size: f64,
    pub casing: CasingSettings,
    pub obstacles: ObstacleSettings,
    pub waypoints: WaypointSettings,
    pub path: PathSettings,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            node_size: 10.0,
            casing: CasingSettings::default(),
            obstacles: ObstacleSettings::default(),
            waypoints: WaypointSettings::default(),
            path: PathSettings::default(),
        }
    }
}

impl PuzzleConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: replace the casing.
    pub fn with_casing(mut self, casing: CasingSettings) -> Self {
        self.casing = casing;
        self
    }

    /// Builder: replace the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if !self.node_size.is_finite() || self.node_size <= 0.0 {
            return Err(SettingsError::invalid("node_size", "must be > 0"));
        }

        self.casing.validate()?;

        if self.obstacles.max_attempts == 0 {
            return Err(SettingsError::invalid("obstacles.max_attempts", "must be > 0"));
        }
        if self.obstacles.per_type_limit == 0 {
            return Err(SettingsError::invalid("obstacles.per_type_limit", "must be > 0"));
        }

        if self.path.waypoint_change_interval == 0 {
            return Err(SettingsError::invalid(
                "path.waypoint_change_interval",
                "must be > 0",
            ));
        }
        if !(self.path.bridge_tolerance_factor > 0.0 && self.path.bridge_tolerance_factor < 1.0) {
            return Err(SettingsError::invalid(
                "path.bridge_tolerance_factor",
                "must be between 0 and 1",
            ));
        }
        if self.path.profile_types.is_empty() {
            return Err(SettingsError::invalid("path.profile_types", "must not be empty"));
        }
        if self.path.design_strategies.is_empty() {
            return Err(SettingsError::invalid(
                "path.design_strategies",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
