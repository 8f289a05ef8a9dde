//! Particle Pool Simulation
//!
//! A fixed-capacity pool of CPU particles integrated under gravity every tick.
//! Domain-specific collision response is delegated to a single registered
//! [`ParticleInteraction`] policy, so the pool itself knows nothing about
//! terrain, water or decals.
//!
//! Slots are preallocated and reused in place: a dead particle keeps its slot
//! until the next spawn overwrites it, so indices stay stable for the whole
//! lifetime of the system.

use glam::Vec3;

use crate::render::batches::GpuParticle;

/// Default pool capacity
pub const DEFAULT_CAPACITY: usize = 2048;

/// Default billboard size in world units
pub const DEFAULT_PARTICLE_SIZE: f32 = 0.2;

/// Standard gravity (m/s²)
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// A single simulated particle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    /// World position
    pub position: Vec3,
    /// Velocity (m/s)
    pub velocity: Vec3,
    /// Remaining life in seconds; `<= 0.0` means dead
    pub life: f32,
    /// Billboard size in world units
    pub size: f32,
    /// RGBA color
    pub color: [f32; 4],
    /// Splat generation that spawned this particle (0 = primary splat)
    pub generation: u8,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            life: 0.0, // Dead by default
            size: DEFAULT_PARTICLE_SIZE,
            color: [1.0, 1.0, 1.0, 1.0],
            generation: 0,
        }
    }
}

impl Particle {
    /// Create a live particle with default size and color.
    pub fn new(position: Vec3, velocity: Vec3, life: f32) -> Self {
        Self {
            position,
            velocity,
            life,
            ..Default::default()
        }
    }

    /// Check if this particle is still alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Force the particle into the dead state.
    #[inline]
    pub fn kill(&mut self) {
        self.life = 0.0;
    }

    /// Convert to GPU-compatible format.
    pub fn to_gpu(&self) -> GpuParticle {
        GpuParticle {
            position: self.position.to_array(),
            lifetime: self.life,
            size: self.size,
            color: [self.color[0], self.color[1], self.color[2]],
        }
    }
}

/// Per-particle, per-tick interaction policy.
///
/// Called once for every live particle after gravity integration. The policy
/// may change position, velocity or life; setting life to `<= 0.0` kills the
/// particle at the end of the tick.
pub trait ParticleInteraction {
    fn particle_interaction(&mut self, delta: f32, particle: &mut Particle);
}

impl<T: ParticleInteraction + ?Sized> ParticleInteraction for Box<T> {
    fn particle_interaction(&mut self, delta: f32, particle: &mut Particle) {
        (**self).particle_interaction(delta, particle);
    }
}

/// Interaction policy that leaves particles untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInteraction;

impl ParticleInteraction for NoInteraction {
    fn particle_interaction(&mut self, _delta: f32, _particle: &mut Particle) {}
}

/// Bounded particle pool with at most one interaction policy.
#[derive(Debug)]
pub struct ParticleSystem<I = NoInteraction> {
    /// Preallocated slots, `len() == capacity`
    particles: Vec<Particle>,
    /// Acceleration applied every tick
    gravity: Vec3,
    /// Visual size handed to newly spawned particles
    size: f32,
    /// Registered interaction policy
    interaction: Option<I>,
    /// Spawn requests dropped because the pool was full
    dropped: u64,
}

impl<I: ParticleInteraction> ParticleSystem<I> {
    /// Create an empty pool with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            gravity: DEFAULT_GRAVITY,
            size: DEFAULT_PARTICLE_SIZE,
            interaction: None,
            dropped: 0,
        }
    }

    /// Spawn up to `count` identical particles.
    ///
    /// When fewer free slots exist, only that many are spawned; the rest of
    /// the request is dropped and counted in [`dropped_spawns`](Self::dropped_spawns).
    /// Returns the number of particles spawned; a `life <= 0.0` request
    /// spawns nothing.
    pub fn spawn(&mut self, position: Vec3, velocity: Vec3, life: f32, count: usize) -> usize {
        let size = self.size;
        self.emit(count, |_| Particle {
            position,
            velocity,
            life,
            size,
            ..Default::default()
        })
    }

    /// Spawn up to `count` particles built by `make(i)` for `i in 0..count`.
    ///
    /// Same truncation rules as [`spawn`](Self::spawn). Particles `make`
    /// returns already dead are discarded without taking a slot and are
    /// neither spawned nor dropped.
    pub fn emit(&mut self, count: usize, mut make: impl FnMut(usize) -> Particle) -> usize {
        let mut free = self.particles.iter_mut().filter(|slot| !slot.is_alive());
        let mut next = free.next();
        let mut made = 0;
        let mut spawned = 0;
        while made < count {
            let Some(slot) = next.as_deref_mut() else {
                break;
            };
            let particle = make(made);
            made += 1;
            if particle.is_alive() {
                *slot = particle;
                spawned += 1;
                next = free.next();
            }
        }

        let dropped = count - made;
        if dropped > 0 {
            if self.dropped == 0 {
                log::debug!(
                    "Particle pool exhausted ({} slots), dropping spawn requests",
                    self.particles.len()
                );
            }
            self.dropped += dropped as u64;
        }
        spawned
    }

    /// Advance every live particle by `delta` seconds.
    ///
    /// Gravity is integrated into velocity, velocity into position, and life
    /// is reduced by `delta`. The registered interaction then sees that
    /// post-integration state. Particles whose life ends at `<= 0.0` are dead
    /// and their slots are reused by the next spawn.
    pub fn advance(&mut self, delta: f32) {
        let gravity = self.gravity;
        for particle in self.particles.iter_mut().filter(|p| p.is_alive()) {
            particle.velocity += gravity * delta;
            particle.position += particle.velocity * delta;
            particle.life -= delta;

            if let Some(interaction) = self.interaction.as_mut() {
                interaction.particle_interaction(delta, particle);
            }
        }
    }

    /// Register the interaction policy, replacing and returning any previous one.
    pub fn set_interaction(&mut self, interaction: I) -> Option<I> {
        self.interaction.replace(interaction)
    }

    /// Remove and return the registered interaction policy.
    pub fn clear_interaction(&mut self) -> Option<I> {
        self.interaction.take()
    }

    pub fn interaction(&self) -> Option<&I> {
        self.interaction.as_ref()
    }

    pub fn interaction_mut(&mut self) -> Option<&mut I> {
        self.interaction.as_mut()
    }

    /// Iterate over live particles.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    /// Slot by index, alive or dead.
    pub fn slot(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Get the current number of live particles.
    pub fn alive_count(&self) -> usize {
        self.particles().count()
    }

    /// Get the total particle capacity.
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Total spawn requests dropped because the pool was full.
    pub fn dropped_spawns(&self) -> u64 {
        self.dropped
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Visual size of newly spawned particles.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size.max(0.0);
    }

    /// Kill every particle.
    pub fn clear(&mut self) {
        self.particles.iter_mut().for_each(Particle::kill);
    }
}
