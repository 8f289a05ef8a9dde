//! Render Tests - GPU Struct Layout, Draw Batches and Shader Validation
//!
//! Tests for the render module: byte layout of every GPU-facing struct,
//! decal batch construction from a splatter system, and parsing plus
//! validation of the splatter WGSL shaders with naga.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use splatter_engine::config::{GraphicsSettings, SplatterConfig, SplatterQuality};
use splatter_engine::effects::{SplatterSystem, DECAL_LIFT};
use splatter_engine::render::{DecalBatch, DecalVertex, GpuParticle, SplatterUniforms};
use splatter_engine::world::{HeightField, HeightMap};

const PARTICLE_SHADER: &str = include_str!("../../shaders/splatter_particle.wgsl");
const DECAL_SHADER: &str = include_str!("../../shaders/splatter_decal.wgsl");

fn parse_and_validate(name: &str, source: &str) -> naga::Module {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(e) => panic!("Failed to parse {}:\n{}", name, e.emit_to_string(source)),
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("Failed to validate {}:\n{:?}", name, e);
    }
    module
}

fn entry_points(module: &naga::Module) -> Vec<&str> {
    module.entry_points.iter().map(|e| e.name.as_str()).collect()
}

// ============================================================================
// GPU Struct Layout Tests (Critical - must match the WGSL declarations)
// ============================================================================

#[test]
fn test_gpu_particle_size_exact_32_bytes() {
    assert_eq!(std::mem::size_of::<GpuParticle>(), 32);
    assert_eq!(std::mem::align_of::<GpuParticle>(), 4);
}

#[test]
fn test_decal_vertex_size_exact_36_bytes() {
    assert_eq!(std::mem::size_of::<DecalVertex>(), 36);
}

#[test]
fn test_uniforms_bytemuck_layout() {
    let view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let uniforms = SplatterUniforms::new(view, Mat4::IDENTITY);
    let bytes: &[u8] = bytemuck::bytes_of(&uniforms);

    assert_eq!(bytes.len(), 128);
    // Column-major: translation lives in the fourth column
    let floats: &[f32] = bytemuck::cast_slice(bytes);
    assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    assert_eq!(floats[16], 1.0);
}

#[test]
fn test_gpu_particle_field_order() {
    let particle = GpuParticle {
        position: [1.0, 2.0, 3.0],
        lifetime: 4.0,
        size: 5.0,
        color: [6.0, 7.0, 8.0],
    };
    let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&particle));
    assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
}

// ============================================================================
// Draw Batch Tests
// ============================================================================

#[test]
fn test_decal_batch_from_splatter() {
    let map = HeightMap::flat(21, 21, 0.5).unwrap();
    let terrain =
        HeightField::from_heightmap(&map, Vec3::new(20.0, 2.0, 20.0), Vec3::ZERO).unwrap();
    let mut system = SplatterSystem::new(
        Arc::new(terrain),
        -10.0,
        SplatterConfig::default(),
        GraphicsSettings::with_quality(SplatterQuality::Low),
    );
    system.splat(Vec3::new(10.0, 1.0, 10.0), 1.0);

    let draw_list = system.draw(Mat4::IDENTITY);
    let decals: &DecalBatch = &draw_list.decals;

    assert!(decals.quad_count() > 0);
    assert_eq!(decals.vertices.len(), decals.quad_count() * 4);
    assert!(decals.indices.iter().all(|&i| (i as usize) < decals.vertices.len()));
    for vertex in &decals.vertices {
        // Draped over flat ground at y = 1
        assert!((vertex.position[1] - (1.0 + DECAL_LIFT)).abs() < 1e-5);
        assert!(vertex.color[3] > 0.0 && vertex.color[3] <= 1.0);
        assert!(vertex.uv.iter().all(|uv| (0.0..=1.0).contains(uv)));
    }
}

// ============================================================================
// Shader Validation Tests
// ============================================================================

#[test]
fn test_particle_shader_validates() {
    let module = parse_and_validate("splatter_particle.wgsl", PARTICLE_SHADER);
    let names = entry_points(&module);
    assert!(names.contains(&"vs_particle"));
    assert!(names.contains(&"fs_particle"));
}

#[test]
fn test_decal_shader_validates() {
    let module = parse_and_validate("splatter_decal.wgsl", DECAL_SHADER);
    let names = entry_points(&module);
    assert!(names.contains(&"vs_decal"));
    assert!(names.contains(&"fs_decal"));
}
