//! Draw Batches
//!
//! Plain vertex/instance data produced by the splatter system each frame and
//! consumed by a GPU submission layer such as
//! [`SplatterRenderer`](super::splatter_renderer::SplatterRenderer).
//! Nothing in here touches the GPU.

use glam::Mat4;

/// GPU-compatible particle data structure.
///
/// Layout (32 bytes total, scalar fields only so the WGSL side needs no padding):
/// - position: 3 x f32 (12 bytes) - World position of the particle
/// - lifetime: f32 (4 bytes) - Remaining life in seconds
/// - size: f32 (4 bytes) - Billboard size in world units
/// - color: 3 x f32 (12 bytes) - RGB color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuParticle {
    pub position: [f32; 3],
    pub lifetime: f32,
    pub size: f32,
    pub color: [f32; 3],
}

static_assertions::assert_eq_size!(GpuParticle, [u8; 32]);

impl Default for GpuParticle {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            lifetime: 0.0, // Dead by default
            size: 0.2,
            color: [0.45, 0.02, 0.02],
        }
    }
}

/// Vertex of a decal quad draped over the terrain.
///
/// Layout (36 bytes): position (12) + uv (8) + rgba color (16).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DecalVertex {
    pub position: [f32; 3],
    /// Coordinates inside the owning patch, 0..1
    pub uv: [f32; 2],
    /// RGB plus accumulated opacity
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(DecalVertex, [u8; 36]);

/// View and projection matrices shared by both splatter pipelines.
///
/// Layout (128 bytes total):
/// - view: mat4x4<f32> (64 bytes)
/// - proj: mat4x4<f32> (64 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplatterUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

const _: () = {
    assert!(
        std::mem::size_of::<SplatterUniforms>() == 128,
        "SplatterUniforms must be exactly 128 bytes"
    );
};

impl Default for SplatterUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

impl SplatterUniforms {
    pub fn new(view: Mat4, proj: Mat4) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
        }
    }
}

/// Indexed triangle list of decal quads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecalBatch {
    pub vertices: Vec<DecalVertex>,
    pub indices: Vec<u32>,
}

impl DecalBatch {
    /// Append a quad given its corners in counter-clockwise order seen from above.
    pub fn push_quad(&mut self, corners: [DecalVertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Camera-facing billboards, one instance per live particle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBatch {
    pub particles: Vec<GpuParticle>,
}

impl ParticleBatch {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Everything the splatter system draws in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatterDrawList {
    /// View (or model-view) transform to render under
    pub transform: Mat4,
    /// Accumulated decals, drawn first
    pub decals: DecalBatch,
    /// Live particles, drawn after the decals
    pub particles: ParticleBatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_quad_indices() {
        let mut batch = DecalBatch::default();
        let v = DecalVertex {
            position: [0.0; 3],
            uv: [0.0; 2],
            color: [1.0; 4],
        };
        batch.push_quad([v; 4]);
        batch.push_quad([v; 4]);

        assert_eq!(batch.vertices.len(), 8);
        assert_eq!(batch.quad_count(), 2);
        assert_eq!(&batch.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_uniforms_size() {
        assert_eq!(std::mem::size_of::<SplatterUniforms>(), 128);
    }
}
