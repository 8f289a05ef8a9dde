//! Render Module
//!
//! Draw-ready batches produced by the splatter system and the wgpu layer that
//! submits them.

pub mod batches;
pub mod splatter_renderer;

pub use batches::{
    DecalBatch, DecalVertex, GpuParticle, ParticleBatch, SplatterDrawList, SplatterUniforms,
};
pub use splatter_renderer::{
    SplatterRenderer, DEPTH_FORMAT, MAX_DECAL_QUADS, MAX_SPLATTER_PARTICLES,
};
