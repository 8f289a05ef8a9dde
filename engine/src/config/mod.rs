//! Config Module
//!
//! Level-load configuration and the runtime graphics settings.

pub mod graphics_config;
pub mod world_config;

pub use graphics_config::{GraphicsSettings, SplatterQuality};
pub use world_config::{LandscapeConfig, SplatterConfig, WorldConfig};
