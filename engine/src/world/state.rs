//! World State
//!
//! Frame driver for the splatter world. Owns the landscape, the splatter
//! system and the current graphics settings, and threads those settings into
//! every update. Hit-scan style weapons go through [`World::shoot`], which
//! casts against the terrain and splats where the ray lands.

use glam::{Mat4, Vec3};

use super::landscape::Landscape;
use crate::config::{GraphicsSettings, WorldConfig};
use crate::effects::{SplatOutcome, SplatterSystem};
use crate::error::WorldError;
use crate::render::batches::SplatterDrawList;

#[derive(Debug)]
pub struct World {
    landscape: Landscape,
    splatter: SplatterSystem,
    graphics: GraphicsSettings,
}

impl World {
    pub fn new(landscape: Landscape, config: &WorldConfig) -> Self {
        let splatter = SplatterSystem::new(
            landscape.terrain().clone(),
            landscape.water_height(),
            config.splatter.clone(),
            config.graphics,
        );
        Self {
            landscape,
            splatter,
            graphics: config.graphics,
        }
    }

    /// Load the landscape named by `config` and assemble the world.
    pub fn load(config: &WorldConfig) -> Result<Self, WorldError> {
        let landscape = Landscape::load(&config.landscape)?;
        Ok(Self::new(landscape, config))
    }

    /// Advance one frame by `delta` seconds.
    pub fn update(&mut self, delta: f32) {
        self.splatter.update(delta, &self.graphics);
    }

    /// Draw batches for the current frame under `view`.
    pub fn draw(&self, view: Mat4) -> SplatterDrawList {
        self.splatter.draw(view)
    }

    /// Replace the graphics settings; takes effect on the next update.
    pub fn set_graphics(&mut self, graphics: GraphicsSettings) {
        self.graphics = graphics;
    }

    pub fn graphics(&self) -> &GraphicsSettings {
        &self.graphics
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn splatter(&self) -> &SplatterSystem {
        &self.splatter
    }

    pub fn splatter_mut(&mut self) -> &mut SplatterSystem {
        &mut self.splatter
    }

    /// Cast a ray against the terrain.
    ///
    /// `length` is the maximum distance on input and the hit distance on
    /// output; it is left untouched when nothing is hit.
    pub fn intersect_line(&self, origin: Vec3, direction: Vec3, length: &mut f32) -> bool {
        self.landscape
            .terrain()
            .ray_intersection(origin, direction, length)
    }

    /// Splat `radius` at the first terrain point hit within `range`.
    ///
    /// Returns the hit point with the splat outcome, or `None` if the ray
    /// misses or `direction` is zero.
    pub fn shoot(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        range: f32,
        radius: f32,
    ) -> Option<(Vec3, SplatOutcome)> {
        let direction = direction.try_normalize()?;
        let mut length = range;
        if !self.intersect_line(origin, direction, &mut length) {
            return None;
        }
        let hit = origin + direction * length;
        let outcome = self.splatter.splat(hit, radius);
        log::trace!(
            "Shot hit {:?} at {:.2}m: {} patches, {} particles",
            hit,
            length,
            outcome.patches,
            outcome.particles
        );
        Some((hit, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplatterQuality;
    use crate::world::heightmap::HeightMap;

    fn world(quality: SplatterQuality) -> World {
        let config = WorldConfig {
            graphics: GraphicsSettings::with_quality(quality),
            ..Default::default()
        };
        let map = HeightMap::flat(33, 33, 0.5).unwrap();
        let landscape = Landscape::from_heightmap(&map, &config.landscape).unwrap();
        World::new(landscape, &config)
    }

    #[test]
    fn test_shoot_hits_ground() {
        let mut world = world(SplatterQuality::High);
        // Default landscape: 60 high from -20, flat at half height = 10
        let (hit, outcome) = world
            .shoot(Vec3::new(0.0, 50.0, 0.0), Vec3::new(0.3, -1.0, 0.1), 200.0, 2.0)
            .unwrap();

        assert!((hit.y - 10.0).abs() < 1e-3);
        assert!(outcome.patches > 0);
        assert_eq!(outcome.particles, SplatterQuality::High.particles_per_splat());
    }

    #[test]
    fn test_shoot_misses() {
        let mut world = world(SplatterQuality::High);
        assert!(world.shoot(Vec3::new(0.0, 50.0, 0.0), Vec3::Y, 200.0, 2.0).is_none());
        assert!(world.shoot(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Y, 10.0, 2.0).is_none());
        assert!(world.shoot(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, 100.0, 2.0).is_none());
        assert_eq!(world.splatter().stats().decal_patches, 0);
    }

    #[test]
    fn test_set_graphics_applies_on_update() {
        let mut world = world(SplatterQuality::High);
        world.set_graphics(GraphicsSettings::with_quality(SplatterQuality::Low));
        assert_eq!(world.splatter().quality(), SplatterQuality::High);

        world.update(1.0 / 60.0);
        assert_eq!(world.splatter().quality(), SplatterQuality::Low);
    }

    #[test]
    fn test_draw_is_read_only() {
        let mut world = world(SplatterQuality::High);
        world.shoot(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Y, 100.0, 2.0);
        world.update(1.0 / 60.0);

        let before = world.splatter().stats();
        let first = world.draw(Mat4::IDENTITY);
        let second = world.draw(Mat4::IDENTITY);
        assert_eq!(first, second);
        assert_eq!(world.splatter().stats(), before);
    }
}
