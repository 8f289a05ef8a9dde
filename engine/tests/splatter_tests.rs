//! Splatter Tests - Decal Accumulation, Quality Tiers and Secondary Splats
//!
//! Tests for the splatter system end to end: splat coverage and patch
//! rectangles, burst sizes per quality tier, bounded secondary splat chains
//! and read-only draws.

use std::sync::Arc;

use glam::{IVec2, Mat4, Vec2, Vec3};
use splatter_engine::config::{GraphicsSettings, SplatterConfig, SplatterQuality};
use splatter_engine::effects::SplatterSystem;
use splatter_engine::world::{HeightField, HeightMap, WorldRect};

/// 4x4 samples spanning (10, 1, 10) at the origin.
fn small_terrain() -> Arc<HeightField> {
    let map = HeightMap::from_fn(4, 4, |x, y| (x + y) as f32 / 6.0).unwrap();
    Arc::new(HeightField::from_heightmap(&map, Vec3::new(10.0, 1.0, 10.0), Vec3::ZERO).unwrap())
}

/// 41x41 flat samples spanning (40, 4, 40), ground at y = 2.
fn flat_terrain() -> Arc<HeightField> {
    let map = HeightMap::flat(41, 41, 0.5).unwrap();
    Arc::new(HeightField::from_heightmap(&map, Vec3::new(40.0, 4.0, 40.0), Vec3::ZERO).unwrap())
}

fn splatter(terrain: Arc<HeightField>, quality: SplatterQuality) -> SplatterSystem {
    SplatterSystem::new(
        terrain,
        -100.0,
        SplatterConfig::default(),
        GraphicsSettings::with_quality(quality),
    )
}

fn run(system: &mut SplatterSystem, seconds: f32) {
    let settings = *system.settings();
    let frames = (seconds * 60.0) as usize;
    for _ in 0..frames {
        system.update(1.0 / 60.0, &settings);
    }
}

// ============================================================================
// Splat Tests
// ============================================================================

#[test]
fn test_splat_high_at_origin() {
    let mut system = splatter(small_terrain(), SplatterQuality::High);
    let outcome = system.splat(Vec3::ZERO, 2.0);

    assert!(outcome.particles > 0);
    assert!(outcome.patches >= 1);
    assert!(system.decals().coverage_at(IVec2::ZERO) > 0.0);
    assert_eq!(system.stats().alive_particles, outcome.particles);
}

#[test]
fn test_splat_coverage_is_monotonic() {
    let mut system = splatter(flat_terrain(), SplatterQuality::Medium);
    let position = Vec3::new(20.0, 2.0, 20.0);
    let cell = IVec2::new(20, 20);

    let mut previous = 0.0;
    for _ in 0..6 {
        system.splat(position, 1.5);
        let coverage = system.decals().coverage_at(cell);
        assert!(coverage > previous);
        assert!(coverage <= 1.0);
        previous = coverage;
    }
}

#[test]
fn test_affected_rect_matches_world_to_map() {
    let terrain = flat_terrain();
    let system = splatter(terrain.clone(), SplatterQuality::High);

    for (position, radius) in [
        (Vec3::new(20.0, 0.0, 20.0), 1.5),
        (Vec3::new(7.3, 0.0, 12.9), 0.4),
        (Vec3::new(33.0, 0.0, 3.0), 2.25),
    ] {
        let rect = system.affected_rect(position, radius);
        let center = Vec2::new(position.x, position.z);

        assert_eq!(rect.origin, terrain.to_map_xz(center - Vec2::splat(radius)));
        assert_eq!(
            rect.end(),
            terrain.to_map_f_xz(center + Vec2::splat(radius)).ceil().as_ivec2()
        );
        assert_eq!(rect, terrain.to_map_rect(&WorldRect::around(center, radius)));
    }
}

#[test]
fn test_splat_touches_only_affected_cells() {
    let mut system = splatter(flat_terrain(), SplatterQuality::High);
    let position = Vec3::new(12.4, 2.0, 30.7);
    let rect = system.affected_rect(position, 1.2);

    system.splat(position, 1.2);
    assert!(!system.decals().is_empty());
    for (cell, _) in system.decals().patches() {
        assert!(rect.contains(cell), "{:?} outside {:?}", cell, rect);
    }
}

#[test]
fn test_low_quality_spawns_no_particles() {
    let mut system = splatter(small_terrain(), SplatterQuality::Low);
    let outcome = system.splat(Vec3::new(5.0, 0.5, 5.0), 2.0);

    assert_eq!(outcome.particles, 0);
    assert!(outcome.patches > 0);
    assert_eq!(system.stats().alive_particles, 0);
}

#[test]
fn test_splat_outside_terrain_is_noop() {
    let mut system = splatter(small_terrain(), SplatterQuality::High);
    let position = Vec3::new(-500.0, 0.0, 900.0);

    assert!(system.affected_rect(position, 2.0).is_empty());
    let outcome = system.splat(position, 2.0);
    assert_eq!(outcome.patches, 0);
    assert!(system.decals().is_empty());
}

#[test]
fn test_degenerate_splats_are_harmless() {
    let mut system = splatter(small_terrain(), SplatterQuality::High);
    assert_eq!(system.splat(Vec3::splat(f32::NAN), 1.0).patches, 0);
    let negative = system.splat(Vec3::new(5.0, 0.0, 5.0), -1.0);
    assert_eq!((negative.patches, negative.particles), (0, 0));
    assert!(system.decals().is_empty());
}

#[test]
fn test_far_away_splat_leaves_no_decal() {
    let mut system = splatter(small_terrain(), SplatterQuality::High);

    for position in [Vec3::new(1e10, 0.0, 1e10), Vec3::new(-1e10, 0.0, 1e10)] {
        assert!(system.affected_rect(position, 2.0).is_empty());
        assert_eq!(system.splat(position, 2.0).patches, 0);
    }
    assert!(system.decals().is_empty());
}

#[test]
fn test_huge_radius_covers_every_quad() {
    let terrain = small_terrain();
    let mut system = splatter(terrain.clone(), SplatterQuality::Low);

    assert_eq!(system.affected_rect(Vec3::new(5.0, 0.0, 5.0), 1e10), terrain.quad_rect());
    assert_eq!(system.splat(Vec3::new(5.0, 0.0, 5.0), 1e10).patches, 9);
}

#[test]
fn test_splat_on_far_corner_stays_on_terrain() {
    let terrain = small_terrain();
    let mut system = splatter(terrain.clone(), SplatterQuality::Low);

    system.splat(Vec3::new(10.0, 1.0, 10.0), 1.0);
    assert!(system.decals().patch(IVec2::splat(3)).is_none());
    assert!(system.decals().coverage_at(IVec2::splat(2)) > 0.0);
    for (cell, _) in system.decals().patches() {
        assert!(terrain.quad_rect().contains(cell), "{:?} past the edge", cell);
    }

    let batch = system.draw(Mat4::IDENTITY).decals;
    assert!(!batch.is_empty());
    for vertex in &batch.vertices {
        let [x, _, z] = vertex.position;
        assert!((0.0..=10.0 + 1e-4).contains(&x), "x = {}", x);
        assert!((0.0..=10.0 + 1e-4).contains(&z), "z = {}", z);
    }
}

// ============================================================================
// Update Tests
// ============================================================================

#[test]
fn test_high_quality_chains_are_bounded() {
    let mut system = splatter(flat_terrain(), SplatterQuality::High);
    for i in 0..4 {
        system.splat(Vec3::new(8.0 + i as f32 * 8.0, 2.0, 20.0), 1.0);
    }

    run(&mut system, 10.0);

    let stats = system.stats();
    assert_eq!(stats.alive_particles, 0, "chains must terminate");
    assert!(stats.secondary_splats > 0);
    assert!(stats.decal_patches > 0);
}

#[test]
fn test_medium_quality_marks_without_bursts() {
    let mut system = splatter(flat_terrain(), SplatterQuality::Medium);
    system.splat(Vec3::new(20.0, 2.0, 20.0), 1.0);
    let patches_after_splat = system.stats().decal_patches;

    run(&mut system, 5.0);

    let stats = system.stats();
    assert_eq!(stats.alive_particles, 0);
    assert_eq!(stats.secondary_splats, SplatterQuality::Medium.particles_per_splat() as u64);
    assert!(stats.decal_patches >= patches_after_splat);
}

#[test]
fn test_particles_under_water_do_not_splat() {
    let terrain = flat_terrain();
    let mut system = SplatterSystem::new(
        terrain,
        50.0,
        SplatterConfig::default(),
        GraphicsSettings::with_quality(SplatterQuality::High),
    );
    system.splat(Vec3::new(20.0, 2.0, 20.0), 1.0);

    run(&mut system, 10.0);

    assert_eq!(system.stats().secondary_splats, 0);
    assert_eq!(system.stats().alive_particles, 0);
}

#[test]
fn test_small_pool_counts_dropped_spawns() {
    let config = SplatterConfig {
        capacity: 10,
        ..Default::default()
    };
    let mut system = SplatterSystem::new(
        flat_terrain(),
        -100.0,
        config,
        GraphicsSettings::with_quality(SplatterQuality::High),
    );

    let outcome = system.splat(Vec3::new(20.0, 2.0, 20.0), 1.0);
    assert_eq!(outcome.particles, 10);
    assert_eq!(system.stats().dropped_spawns, 22);
}

// ============================================================================
// Draw Tests
// ============================================================================

#[test]
fn test_draw_does_not_mutate() {
    let mut system = splatter(flat_terrain(), SplatterQuality::High);
    system.splat(Vec3::new(20.0, 2.0, 20.0), 2.0);
    run(&mut system, 0.2);

    let view = Mat4::look_at_rh(Vec3::new(20.0, 20.0, 40.0), Vec3::new(20.0, 2.0, 20.0), Vec3::Y);
    let before = system.stats();
    let first = system.draw(view);
    let second = system.draw(view);

    assert_eq!(first, second);
    assert_eq!(system.stats(), before);
    assert_eq!(first.transform, view);
    assert_eq!(first.particles.len(), before.alive_particles);
    assert!(!first.decals.is_empty());
}

#[test]
fn test_draw_only_live_particles() {
    let mut system = splatter(flat_terrain(), SplatterQuality::High);
    system.splat(Vec3::new(20.0, 2.0, 20.0), 2.0);
    run(&mut system, 10.0);

    let draw_list = system.draw(Mat4::IDENTITY);
    assert!(draw_list.particles.is_empty());
    assert!(!draw_list.decals.is_empty());
}
