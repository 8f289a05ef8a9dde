//! Landscape
//!
//! The terrain together with its water surface. The terrain is immutable once
//! built and shared with the splatter system through an `Arc`.

use std::sync::Arc;

use glam::Vec3;

use super::heightfield::HeightField;
use super::heightmap::HeightMap;
use crate::config::LandscapeConfig;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct Landscape {
    terrain: Arc<HeightField>,
    water_height: f32,
}

impl Landscape {
    pub fn new(terrain: HeightField, water_height: f32) -> Self {
        Self {
            terrain: Arc::new(terrain),
            water_height,
        }
    }

    /// Build from an in-memory heightmap using the config's extent.
    pub fn from_heightmap(heightmap: &HeightMap, config: &LandscapeConfig) -> Result<Self> {
        let terrain = HeightField::from_heightmap(heightmap, config.size, config.offset)?;
        Ok(Self::new(terrain, config.water_height))
    }

    /// Load the heightmap named by `config` and build the terrain.
    ///
    /// A missing heightmap is fatal and reported as
    /// [`TerrainError::HeightmapNotFound`](crate::error::TerrainError::HeightmapNotFound).
    pub fn load(config: &LandscapeConfig) -> Result<Self> {
        let heightmap = HeightMap::load(&config.heightmap)?;
        log::info!(
            "Loaded landscape {} ({}x{} samples)",
            config.heightmap.display(),
            heightmap.width(),
            heightmap.height()
        );
        Self::from_heightmap(&heightmap, config)
    }

    pub fn terrain(&self) -> &Arc<HeightField> {
        &self.terrain
    }

    pub fn water_height(&self) -> f32 {
        self.water_height
    }

    /// Whether `position` lies below the water surface.
    pub fn is_under_water(&self, position: Vec3) -> bool {
        position.y < self.water_height
    }
}
