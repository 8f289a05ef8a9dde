//! Physics Module
//!
//! CPU-side particle simulation.

pub mod particles;

pub use particles::{
    NoInteraction, Particle, ParticleInteraction, ParticleSystem, DEFAULT_CAPACITY,
    DEFAULT_GRAVITY, DEFAULT_PARTICLE_SIZE,
};
