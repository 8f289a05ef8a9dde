//! Error types
//!
//! Only construction-time failures are surfaced as errors. Runtime queries
//! against the terrain, the particle pool and the decal buffer never fail:
//! out-of-range input is clamped and a full pool truncates spawn requests.

use std::io;
use std::path::PathBuf;

use glam::Vec3;
use thiserror::Error;

/// Errors raised while building terrain from a heightmap.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// The heightmap image does not exist
    #[error("heightmap not found: {}", path.display())]
    HeightmapNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The heightmap exists but could not be decoded
    #[error("failed to decode heightmap: {0}")]
    Image(#[from] image::ImageError),

    /// A heightmap needs at least one sample
    #[error("heightmap is empty ({width}x{height})")]
    EmptyHeightmap {
        /// Width in samples
        width: u32,
        /// Height in samples
        height: u32,
    },

    /// Sample buffer length does not match the declared dimensions
    #[error("heightmap has {actual} samples, expected {expected}")]
    SampleCount {
        /// width * height
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },

    /// The horizontal terrain extent must be positive
    #[error("terrain size must have positive X and Z extent, got {0}")]
    InvalidSize(Vec3),
}

/// Errors raised while loading a world configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The config file is not valid JSON for [`crate::config::WorldConfig`]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while assembling a [`crate::world::World`].
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for terrain construction.
pub type Result<T> = std::result::Result<T, TerrainError>;
