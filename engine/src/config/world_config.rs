//! World Configuration
//!
//! Level-load parameters for the landscape and the splatter system, plus the
//! initial graphics settings. Every field has a default so a config file only
//! needs to list what it overrides.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::graphics_config::GraphicsSettings;
use crate::error::ConfigError;
use crate::physics::{DEFAULT_CAPACITY, DEFAULT_GRAVITY, DEFAULT_PARTICLE_SIZE};

/// Terrain construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Monochrome heightmap image
    pub heightmap: PathBuf,
    /// World-space volume occupied by the terrain
    pub size: Vec3,
    /// World position of heightmap sample (0, 0)
    pub offset: Vec3,
    /// Absolute water surface height
    pub water_height: f32,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("data/landscape/earth.png"),
            size: Vec3::new(1000.0, 60.0, 1000.0),
            offset: Vec3::new(-500.0, -20.0, -500.0),
            water_height: 0.0,
        }
    }
}

/// Splatter system construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplatterConfig {
    /// Particle pool capacity
    pub capacity: usize,
    /// Particle billboard size; also scales secondary splat radii
    pub particle_size: f32,
    /// Particle acceleration
    pub gravity: Vec3,
    /// Base particle life in seconds (randomized ±25%)
    pub particle_life: f32,
    /// Initial particle speed of a burst (m/s)
    pub burst_speed: f32,
    /// Splatter RGB color
    pub color: [f32; 3],
    /// Decal opacity laid down at the centre of a splat
    pub decal_strength: f32,
    /// Splat generations allowed to trigger further splats
    pub max_generation: u8,
    /// Seed for burst and secondary-splat randomness
    pub seed: u64,
}

impl Default for SplatterConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            particle_size: DEFAULT_PARTICLE_SIZE,
            gravity: DEFAULT_GRAVITY,
            particle_life: 2.0,
            burst_speed: 4.0,
            color: [0.45, 0.02, 0.02],
            decal_strength: 0.8,
            max_generation: 3,
            seed: 0x5EED,
        }
    }
}

/// Everything needed to bring up a [`crate::world::World`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub landscape: LandscapeConfig,
    pub splatter: SplatterConfig,
    pub graphics: GraphicsSettings,
}

impl WorldConfig {
    /// Parse a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}
