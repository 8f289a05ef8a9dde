//! Splatter System
//!
//! Orchestrates splats on a terrain: every splat blends a decal into the
//! accumulation buffer and, depending on the quality tier, throws a burst of
//! particles. The particles fall under gravity and are resolved against the
//! terrain and water by a [`SplatterInteractor`]; the splats they raise on
//! impact are applied once the particle pass has finished.
//!
//! Per frame the driver calls [`SplatterSystem::update`] then
//! [`SplatterSystem::draw`]. Nothing here is shared between threads.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::decals::DecalBuffer;
use super::interaction::{SplatterInteractor, SplatterPolicy};
use crate::config::{GraphicsSettings, SplatterConfig, SplatterQuality};
use crate::physics::{Particle, ParticleSystem};
use crate::render::batches::{ParticleBatch, SplatterDrawList};
use crate::world::heightfield::{HeightField, MapRect, WorldRect};

/// Result of a single splat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplatOutcome {
    /// Decal patches the splat blended into
    pub patches: usize,
    /// Particles spawned for the burst
    pub particles: usize,
}

/// Counters for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplatterStats {
    pub decal_patches: usize,
    pub alive_particles: usize,
    pub dropped_spawns: u64,
    pub secondary_splats: u64,
}

/// Decal accumulation plus particle bursts over one terrain.
#[derive(Debug)]
pub struct SplatterSystem {
    terrain: Arc<HeightField>,
    particles: ParticleSystem<SplatterInteractor>,
    decals: DecalBuffer,
    config: SplatterConfig,
    /// Settings of the last update; quality and culling for splats and draws
    settings: GraphicsSettings,
    rng: StdRng,
    secondary_splats: u64,
}

impl SplatterSystem {
    pub fn new(
        terrain: Arc<HeightField>,
        water_height: f32,
        config: SplatterConfig,
        settings: GraphicsSettings,
    ) -> Self {
        let mut particles = ParticleSystem::new(config.capacity);
        particles.set_gravity(config.gravity);
        particles.set_size(config.particle_size);

        let mut interactor = SplatterInteractor::new(
            Arc::clone(&terrain),
            water_height,
            config.gravity,
            config.particle_size,
            config.max_generation,
            config.seed.wrapping_add(1),
        );
        interactor.set_policy(SplatterPolicy::for_quality(settings.splatter_quality));
        particles.set_interaction(interactor);

        log::debug!(
            "Splatter system: {} particle slots, quality {}",
            config.capacity,
            settings.splatter_quality
        );

        Self {
            terrain,
            particles,
            decals: DecalBuffer::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            settings,
            secondary_splats: 0,
        }
    }

    /// Splat at `position` with the given world `radius`.
    ///
    /// Blends a decal into every patch of [`affected_rect`](Self::affected_rect)
    /// the circle reaches and spawns a burst sized by the current quality
    /// tier. Splats outside the terrain leave no decal.
    pub fn splat(&mut self, position: Vec3, radius: f32) -> SplatOutcome {
        self.splat_generation(position, radius, 0, true)
    }

    fn splat_generation(
        &mut self,
        position: Vec3,
        radius: f32,
        generation: u8,
        burst: bool,
    ) -> SplatOutcome {
        let quality = self.settings.splatter_quality;
        let patches = self.decals.splat(
            &self.terrain,
            position,
            radius,
            quality.decal_resolution(),
            self.config.decal_strength,
            self.config.color,
        );

        if !burst || !position.is_finite() || !(radius > 0.0) {
            return SplatOutcome {
                patches,
                particles: 0,
            };
        }

        // Each generation throws half the particles of its parent
        let count = quality
            .particles_per_splat()
            .checked_shr(u32::from(generation))
            .unwrap_or(0);
        if count == 0 {
            return SplatOutcome {
                patches,
                particles: 0,
            };
        }

        let ground = self.terrain.height_at(position.x, position.z);
        let origin = Vec3::new(position.x, position.y.max(ground), position.z);
        let speed = self.config.burst_speed;
        let life = self.config.particle_life;
        let size = self.config.particle_size;
        let [r, g, b] = self.config.color;
        let rng = &mut self.rng;

        let particles = self.particles.emit(count, |_| {
            let direction = Vec3::new(
                rng.random_range(-1.0..=1.0),
                rng.random_range(0.2..=1.0),
                rng.random_range(-1.0..=1.0),
            )
            .normalize_or(Vec3::Y);
            Particle {
                position: origin,
                velocity: direction * speed * rng.random_range(0.5..=1.0),
                life: life * rng.random_range(0.75..=1.25),
                size,
                color: [r, g, b, 1.0],
                generation,
            }
        });

        SplatOutcome { patches, particles }
    }

    /// Grid rectangle a splat at `position` with `radius` affects, clamped to
    /// the terrain.
    pub fn affected_rect(&self, position: Vec3, radius: f32) -> MapRect {
        self.terrain
            .patch_rect(&WorldRect::around(Vec2::new(position.x, position.z), radius))
    }

    /// Advance the simulation by `delta` seconds under `settings`.
    ///
    /// The interaction policy is derived from the quality tier once for the
    /// whole tick. Splats raised by dying particles are applied after the
    /// particle pass, in the order they were raised.
    pub fn update(&mut self, delta: f32, settings: &GraphicsSettings) {
        if settings.splatter_quality != self.settings.splatter_quality {
            log::info!(
                "Splatter quality {} -> {}",
                self.settings.splatter_quality,
                settings.splatter_quality
            );
        }
        self.settings = *settings;

        if let Some(interactor) = self.particles.interaction_mut() {
            interactor.set_policy(SplatterPolicy::for_quality(settings.splatter_quality));
        }

        self.particles.advance(delta);

        let pending = self
            .particles
            .interaction_mut()
            .map(SplatterInteractor::take_pending)
            .unwrap_or_default();
        for secondary in pending {
            self.splat_generation(
                secondary.position,
                secondary.radius,
                secondary.generation,
                secondary.burst,
            );
            self.secondary_splats += 1;
        }
    }

    /// Build the frame's draw batches under `transform`.
    ///
    /// Decals and particles farther than the far plane from the eye point of
    /// `transform` are left out. Read only.
    pub fn draw(&self, transform: Mat4) -> SplatterDrawList {
        let eye = transform.inverse().transform_point3(Vec3::ZERO);
        let far_plane = self.settings.far_plane;
        let in_range = |point: Vec3| point.distance(eye) <= far_plane;

        let decals = self.decals.build_batch(&self.terrain, in_range);
        let particles = ParticleBatch {
            particles: self
                .particles
                .particles()
                .filter(|p| in_range(p.position))
                .map(Particle::to_gpu)
                .collect(),
        };

        SplatterDrawList {
            transform,
            decals,
            particles,
        }
    }

    pub fn quality(&self) -> SplatterQuality {
        self.settings.splatter_quality
    }

    pub fn settings(&self) -> &GraphicsSettings {
        &self.settings
    }

    pub fn stats(&self) -> SplatterStats {
        SplatterStats {
            decal_patches: self.decals.len(),
            alive_particles: self.particles.alive_count(),
            dropped_spawns: self.particles.dropped_spawns(),
            secondary_splats: self.secondary_splats,
        }
    }

    pub fn particles(&self) -> &ParticleSystem<SplatterInteractor> {
        &self.particles
    }

    pub fn decals(&self) -> &DecalBuffer {
        &self.decals
    }

    pub fn terrain(&self) -> &Arc<HeightField> {
        &self.terrain
    }
}
