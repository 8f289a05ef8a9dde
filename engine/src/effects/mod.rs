//! Effects Module
//!
//! Splatter decals, the particle interaction policy that resolves splatter
//! particles against the landscape, and the system tying both together.

pub mod decals;
pub mod interaction;
pub mod splatter;

pub use decals::{DecalBuffer, DecalPatch, DECAL_LIFT, MIN_VISIBLE_ALPHA};
pub use interaction::{SecondarySplat, SplatterInteractor, SplatterPolicy, SECONDARY_RADIUS_RANGE};
pub use splatter::{SplatOutcome, SplatterStats, SplatterSystem};
