//! Graphics Settings
//!
//! Runtime-adjustable knobs owned by the frame driver and passed into the
//! splatter system every update. There is no process-wide quality state.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Splatter quality tier.
///
/// Controls how many particles a splat emits, the resolution of newly created
/// decal patches and how dying particles interact with the terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SplatterQuality {
    /// Decals only, particles are absorbed silently
    #[default]
    Low,
    /// Particle bursts; dying particles leave a mark
    Medium,
    /// Full bursts; dying particles trigger secondary splats
    High,
}

impl SplatterQuality {
    /// All tiers, lowest first.
    pub const ALL: [SplatterQuality; 3] = [Self::Low, Self::Medium, Self::High];

    /// Parse a tier name case-insensitively.
    ///
    /// Unknown names fall back to [`SplatterQuality::Low`] with a warning.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => {
                log::warn!("{:?} is not a valid splatter quality, using Low", name);
                Self::Low
            }
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Particles emitted by a primary splat.
    pub fn particles_per_splat(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 12,
            Self::High => 32,
        }
    }

    /// Decal texels per grid cell along each axis for newly created patches.
    pub fn decal_resolution(self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 4,
        }
    }
}

impl FromStr for SplatterQuality {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for SplatterQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for SplatterQuality {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<SplatterQuality> for String {
    fn from(quality: SplatterQuality) -> Self {
        quality.name().to_string()
    }
}

/// Graphics settings threaded through `update`/`draw` by the frame driver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    /// Current splatter quality tier
    pub splatter_quality: SplatterQuality,
    /// Render distance; particles and decals beyond it are not drawn
    pub far_plane: f32,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            splatter_quality: SplatterQuality::High,
            far_plane: 500.0,
        }
    }
}

impl GraphicsSettings {
    pub fn with_quality(quality: SplatterQuality) -> Self {
        Self {
            splatter_quality: quality,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_name_case_insensitive() {
        assert_eq!(SplatterQuality::from_name("high"), SplatterQuality::High);
        assert_eq!(SplatterQuality::from_name("Medium"), SplatterQuality::Medium);
        assert_eq!(SplatterQuality::from_name("LOW"), SplatterQuality::Low);
        assert_eq!("hIgH".parse::<SplatterQuality>().unwrap(), SplatterQuality::High);
    }

    #[test]
    fn test_quality_unknown_falls_back_to_low() {
        assert_eq!(SplatterQuality::from_name("ultra"), SplatterQuality::Low);
        assert_eq!(SplatterQuality::from_name(""), SplatterQuality::Low);
    }

    #[test]
    fn test_quality_names_round_trip() {
        for quality in SplatterQuality::ALL {
            assert_eq!(SplatterQuality::from_name(quality.name()), quality);
        }
        assert_eq!(SplatterQuality::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_quality_tiers_scale() {
        assert_eq!(SplatterQuality::Low.particles_per_splat(), 0);
        assert!(
            SplatterQuality::Medium.particles_per_splat()
                < SplatterQuality::High.particles_per_splat()
        );
        assert!(SplatterQuality::Low.decal_resolution() < SplatterQuality::High.decal_resolution());
        assert!(SplatterQuality::Low < SplatterQuality::High);
    }

    #[test]
    fn test_settings_serde() {
        let settings: GraphicsSettings =
            serde_json::from_str(r#"{ "splatter_quality": "medium" }"#).unwrap();
        assert_eq!(settings.splatter_quality, SplatterQuality::Medium);
        assert_eq!(settings.far_plane, 500.0);

        let json = serde_json::to_string(&GraphicsSettings::default()).unwrap();
        assert!(json.contains("\"High\""));
    }
}
