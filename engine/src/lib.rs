//! Splatter Engine Library
//!
//! Terrain queries, particle simulation and splatter decal accumulation for a
//! real-time game world.
//!
//! # Modules
//!
//! - [`world`] - Heightfield terrain, landscape and the frame driver
//! - [`physics`] - Fixed-capacity particle pool with a pluggable interaction policy
//! - [`effects`] - Splatter decals, particle bursts and terrain interaction
//! - [`render`] - Draw batches and their wgpu submission layer
//! - [`config`] - World configuration and runtime graphics settings
//!
//! # Example
//!
//! ```ignore
//! use splatter_engine::config::{GraphicsSettings, SplatterQuality, WorldConfig};
//! use splatter_engine::world::World;
//! use glam::{Mat4, Vec3};
//!
//! let config = WorldConfig::load("data/world.json")?;
//! let mut world = World::load(&config)?;
//!
//! // Splat where a shot lands
//! world.shoot(Vec3::new(0.0, 40.0, 0.0), Vec3::new(0.2, -1.0, 0.0), 200.0, 1.5);
//!
//! // Per frame: update, then draw
//! world.update(1.0 / 60.0);
//! let draw_list = world.draw(Mat4::look_at_rh(eye, target, Vec3::Y));
//! renderer.upload(&queue, &draw_list, proj);
//!
//! // Settings take effect on the next update
//! world.set_graphics(GraphicsSettings::with_quality(SplatterQuality::Medium));
//! ```

pub mod config;
pub mod effects;
pub mod error;
pub mod physics;
pub mod render;
pub mod world;

pub use config::{GraphicsSettings, SplatterQuality, WorldConfig};
pub use effects::{SplatterStats, SplatterSystem};
pub use error::{ConfigError, TerrainError, WorldError};
pub use physics::{Particle, ParticleInteraction, ParticleSystem};
pub use world::{HeightField, HeightMap, Landscape, World};
