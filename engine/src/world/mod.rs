//! World Module
//!
//! Terrain, landscape and the per-frame world driver.
//!
//! ## Default World
//! A 1km x 1km landscape centred on the origin, 60m of vertical range starting
//! 20m below sea level, with the water surface at height 0.

pub mod heightfield;
pub mod heightmap;
pub mod landscape;
pub mod state;

pub use heightfield::{HeightField, MapRect, WorldRect};
pub use heightmap::HeightMap;
pub use landscape::Landscape;
pub use state::World;
