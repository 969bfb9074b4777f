//! # marblemaze
//!
//! Procedural path topology for 3D-printable marble maze puzzles.
//!
//! ## Architecture
//!
//! marblemaze is organized as a workspace with multiple crates:
//!
//! 1. **marblemaze-core** - Node arena types, grid geometry, path annotations, errors
//! 2. **marblemaze-settings** - Puzzle configuration with JSON/TOML persistence
//! 3. **marblemaze-designer** - Lattice, obstacles, path finding and path architecture
//! 4. **marblemaze** - Binary that loads a configuration and generates a puzzle
//!
//! Solid modeling, export and visualization consume the generated
//! [`PathLayout`] and live outside this workspace.

pub use marblemaze_core::{Error, Node, NodeId, Result};
pub use marblemaze_designer as designer;
pub use marblemaze_designer::{PathLayout, PathSegment, Puzzle, PuzzleSummary};
pub use marblemaze_settings::{CasingSettings, PuzzleConfig};

use anyhow::Context;
use std::path::Path;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - stderr output, so stdout stays free for generated data
/// - RUST_LOG environment variable support
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_line_number(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer().json().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

/// Load a configuration file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PuzzleConfig> {
    let Some(path) = path else {
        return Ok(PuzzleConfig::default());
    };
    let config = PuzzleConfig::load_from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!(path = %path.display(), "configuration loaded");
    Ok(config)
}
