//! Headless Splatter Simulation
//!
//! Run with: `cargo run --bin splatter_sim -- [config.json] [--frames N] [--quality NAME]`
//! (`--help` lists the options)
//!
//! Brings up a world from a JSON config (or a procedural landscape when no
//! config is given), fires random shots at the terrain and steps the frame
//! loop at 60 Hz, logging splatter statistics along the way.
//!
//! Set `RUST_LOG=debug` for per-system detail.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use splatter_engine::config::{SplatterQuality, WorldConfig};
use splatter_engine::world::{HeightMap, Landscape, World};

const FRAME_DELTA: f32 = 1.0 / 60.0;

/// Frames between shots
const SHOT_INTERVAL: u32 = 15;

/// Frames between stats lines
const REPORT_INTERVAL: u32 = 60;

#[derive(Parser, Debug)]
#[command(name = "splatter_sim")]
#[command(about = "Headless splatter simulation over a heightfield world", long_about = None)]
struct Args {
    /// JSON world config; a procedural landscape is used when omitted
    config: Option<PathBuf>,

    /// Number of 60 Hz frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Splatter quality tier (low, medium or high)
    #[arg(long)]
    quality: Option<SplatterQuality>,
}

/// Rolling hills, normalized to [0, 1].
fn procedural_heightmap() -> Result<HeightMap, Box<dyn Error>> {
    const SAMPLES: u32 = 129;
    let heightmap = HeightMap::from_fn(SAMPLES, SAMPLES, |x, y| {
        let u = x as f32 / (SAMPLES - 1) as f32 * std::f32::consts::TAU;
        let v = y as f32 / (SAMPLES - 1) as f32 * std::f32::consts::TAU;
        0.5 + 0.25 * (u * 2.0).sin() * (v * 3.0).cos() + 0.1 * (u * 7.0 + v * 5.0).sin()
    })?;
    Ok(heightmap)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    if let Some(quality) = args.quality {
        config.graphics.splatter_quality = quality;
    }

    let mut world = match &args.config {
        Some(_) => World::load(&config)?,
        None => {
            log::info!("No config given, using a procedural landscape");
            let landscape = Landscape::from_heightmap(&procedural_heightmap()?, &config.landscape)?;
            World::new(landscape, &config)
        }
    };

    log::info!(
        "Simulating {} frames at quality {}",
        args.frames,
        world.graphics().splatter_quality
    );

    let mut rng = StdRng::seed_from_u64(config.splatter.seed);
    let eye = Vec3::new(0.0, 80.0, 120.0);
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    let mut shots = 0u32;
    let mut hits = 0u32;

    for frame in 1..=args.frames {
        if frame % SHOT_INTERVAL == 0 {
            let target = Vec3::new(rng.random_range(-60.0..60.0), 0.0, rng.random_range(-60.0..60.0));
            let radius = rng.random_range(0.5..2.5);
            shots += 1;
            if world.shoot(eye, target - eye, 1000.0, radius).is_some() {
                hits += 1;
            }
        }

        world.update(FRAME_DELTA);
        let draw_list = world.draw(view);

        if frame % REPORT_INTERVAL == 0 {
            let stats = world.splatter().stats();
            log::info!(
                "frame {:5}: {} patches, {} particles, {} secondary splats, {} decal quads",
                frame,
                stats.decal_patches,
                stats.alive_particles,
                stats.secondary_splats,
                draw_list.decals.quad_count()
            );
        }
    }

    let stats = world.splatter().stats();
    println!("shots fired:       {}", shots);
    println!("shots hit:         {}", hits);
    println!("decal patches:     {}", stats.decal_patches);
    println!("alive particles:   {}", stats.alive_particles);
    println!("secondary splats:  {}", stats.secondary_splats);
    println!("dropped spawns:    {}", stats.dropped_spawns);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["splatter_sim"]).unwrap();
        assert_eq!(args.frames, 600);
        assert!(args.config.is_none());
        assert!(args.quality.is_none());
    }

    #[test]
    fn test_args_all_options() {
        let args =
            Args::try_parse_from(["splatter_sim", "--frames", "10", "--quality", "medium", "world.json"])
                .unwrap();
        assert_eq!(args.frames, 10);
        assert_eq!(args.quality, Some(SplatterQuality::Medium));
        assert_eq!(args.config, Some(PathBuf::from("world.json")));
    }

    #[test]
    fn test_args_reject_flags_as_config() {
        assert!(Args::try_parse_from(["splatter_sim", "--help"]).is_err());
        assert!(Args::try_parse_from(["splatter_sim", "--frame", "10"]).is_err());
        assert!(Args::try_parse_from(["splatter_sim", "--frames", "many"]).is_err());
    }
}
