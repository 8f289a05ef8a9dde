//! Splatter Particle Interaction
//!
//! The policy registered with the splatter particle pool. It decides what
//! happens to a particle that reaches water or the ground:
//!
//! - below the water surface: buoyancy (`v -= g / 1.1 * dt`), particle lives on
//! - below the ground: particle dies, and if it is not also under water
//!   - chain splats on (HIGH): a secondary splat with a randomized radius
//!   - splat below on (MEDIUM): a decal-only mark
//!   - otherwise (LOW): absorbed silently
//!
//! Secondary splats are queued, never applied during the particle pass, and
//! are bounded by the particle generation counter.

use std::sync::Arc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SplatterQuality;
use crate::physics::{Particle, ParticleInteraction};
use crate::world::heightfield::HeightField;

/// Secondary splat radius range as a multiple of the particle size.
pub const SECONDARY_RADIUS_RANGE: (f32, f32) = (0.5, 2.0);

/// Buoyancy divisor applied to gravity under water.
const BUOYANCY_DIVISOR: f32 = 1.1;

/// Per-tick interaction switches derived from the quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplatterPolicy {
    /// Dying particles leave a decal-only mark
    pub splat_below: bool,
    /// Dying particles trigger a full secondary splat with its own burst
    pub chain_splats: bool,
}

impl SplatterPolicy {
    pub fn for_quality(quality: SplatterQuality) -> Self {
        Self {
            splat_below: quality == SplatterQuality::Medium,
            chain_splats: quality == SplatterQuality::High,
        }
    }
}

/// A splat raised by a dying particle, applied after the particle pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SecondarySplat {
    pub position: Vec3,
    pub radius: f32,
    /// Generation handed to particles spawned by this splat
    pub generation: u8,
    /// Whether the splat spawns a particle burst or only marks the terrain
    pub burst: bool,
}

/// Terrain/water collision policy for splatter particles.
#[derive(Debug)]
pub struct SplatterInteractor {
    terrain: Arc<HeightField>,
    water_height: f32,
    gravity: Vec3,
    particle_size: f32,
    max_generation: u8,
    policy: SplatterPolicy,
    rng: StdRng,
    pending: Vec<SecondarySplat>,
}

impl SplatterInteractor {
    pub fn new(
        terrain: Arc<HeightField>,
        water_height: f32,
        gravity: Vec3,
        particle_size: f32,
        max_generation: u8,
        seed: u64,
    ) -> Self {
        Self {
            terrain,
            water_height,
            gravity,
            particle_size,
            max_generation,
            policy: SplatterPolicy::default(),
            rng: StdRng::seed_from_u64(seed),
            pending: Vec::new(),
        }
    }

    /// Set the switches for the coming tick.
    pub fn set_policy(&mut self, policy: SplatterPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> SplatterPolicy {
        self.policy
    }

    pub fn water_height(&self) -> f32 {
        self.water_height
    }

    /// Drain splats queued during the last particle pass.
    pub fn take_pending(&mut self) -> Vec<SecondarySplat> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[SecondarySplat] {
        &self.pending
    }
}

impl ParticleInteraction for SplatterInteractor {
    fn particle_interaction(&mut self, delta: f32, particle: &mut Particle) {
        let threshold = -self.particle_size / 2.0;
        let below_water = particle.position.y - self.water_height < threshold;
        let below_ground = self.terrain.height_above_ground(particle.position) < threshold;

        if below_water {
            particle.velocity -= self.gravity / BUOYANCY_DIVISOR * delta;
        }

        if !below_ground {
            return;
        }
        particle.kill();
        if below_water {
            return;
        }

        if self.policy.chain_splats {
            if particle.generation >= self.max_generation {
                return;
            }
            let (min, max) = SECONDARY_RADIUS_RANGE;
            self.pending.push(SecondarySplat {
                position: particle.position,
                radius: self.particle_size * self.rng.random_range(min..max),
                generation: particle.generation + 1,
                burst: true,
            });
        } else if self.policy.splat_below {
            self.pending.push(SecondarySplat {
                position: particle.position,
                radius: self.particle_size,
                generation: particle.generation.saturating_add(1),
                burst: false,
            });
        }
    }
}
