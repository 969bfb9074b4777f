//! marblemaze Settings Crate
//!
//! Handles puzzle configuration, validation and JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{
    CasingSettings, ObstacleSettings, PathSettings, PuzzleConfig, WaypointSettings,
};
pub use error::{SettingsError, SettingsResult};
