//! Splatter GPU Submission
//!
//! Uploads a [`SplatterDrawList`] and records its draw calls. Decals are drawn
//! first as an indexed triangle list with a depth bias so they sit on the
//! terrain; particles follow as instanced camera-facing billboards read from a
//! storage buffer.
//!
//! Both pipelines share one bind group: the view/projection uniforms at
//! binding 0 and the particle storage buffer at binding 1.

use glam::Mat4;

use super::batches::{DecalVertex, GpuParticle, SplatterDrawList, SplatterUniforms};

/// Maximum particles uploaded per frame
pub const MAX_SPLATTER_PARTICLES: usize = 4096;

/// Maximum decal quads uploaded per frame
pub const MAX_DECAL_QUADS: usize = 65536;

/// Particle storage buffer size in bytes
pub const PARTICLE_BUFFER_SIZE: usize = MAX_SPLATTER_PARTICLES * std::mem::size_of::<GpuParticle>();

/// Decal vertex buffer size in bytes
pub const DECAL_VERTEX_BUFFER_SIZE: usize = MAX_DECAL_QUADS * 4 * std::mem::size_of::<DecalVertex>();

/// Decal index buffer size in bytes
pub const DECAL_INDEX_BUFFER_SIZE: usize = MAX_DECAL_QUADS * 6 * std::mem::size_of::<u32>();

/// Depth attachment format both pipelines test against
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex layout matching [`DecalVertex`]
const DECAL_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 12,
        shader_location: 1,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: 20,
        shader_location: 2,
    },
];

/// GPU resources for drawing splatter decals and particles.
pub struct SplatterRenderer {
    uniform_buffer: wgpu::Buffer,
    particle_buffer: wgpu::Buffer,
    decal_vertex_buffer: wgpu::Buffer,
    decal_index_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    decal_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    /// Particles in the last upload
    particle_count: u32,
    /// Decal indices in the last upload
    decal_index_count: u32,
}

impl SplatterRenderer {
    /// Create buffers and both pipelines for `surface_format`.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Splatter Uniform Buffer"),
            size: std::mem::size_of::<SplatterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let particle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Splatter Particle Buffer"),
            size: PARTICLE_BUFFER_SIZE as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let decal_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Splatter Decal Vertex Buffer"),
            size: DECAL_VERTEX_BUFFER_SIZE as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let decal_index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Splatter Decal Index Buffer"),
            size: DECAL_INDEX_BUFFER_SIZE as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Splatter Bind Group Layout"),
            entries: &[
                // Binding 0: view/projection matrices
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Binding 1: live particles (read-only)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Splatter Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: particle_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Splatter Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let decal_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Splatter Decal Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../../shaders/splatter_decal.wgsl").into(),
            ),
        });

        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Splatter Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../../shaders/splatter_particle.wgsl").into(),
            ),
        });

        let decal_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Splatter Decal Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &decal_shader,
                entry_point: Some("vs_decal"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<DecalVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &DECAL_ATTRIBUTES,
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                // Pull decals toward the camera to avoid z-fighting with the terrain
                bias: wgpu::DepthBiasState {
                    constant: -2,
                    slope_scale: -1.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &decal_shader,
                entry_point: Some("fs_decal"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Splatter Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &particle_shader,
                entry_point: Some("vs_particle"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[], // All data from the storage buffer
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false, // Translucent
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &particle_shader,
                entry_point: Some("fs_particle"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        Self {
            uniform_buffer,
            particle_buffer,
            decal_vertex_buffer,
            decal_index_buffer,
            bind_group,
            decal_pipeline,
            particle_pipeline,
            particle_count: 0,
            decal_index_count: 0,
        }
    }

    /// Upload a frame's draw list, rendered under `draw_list.transform` and `proj`.
    ///
    /// Batches larger than the GPU buffers are truncated; decals are cut at
    /// whole quads.
    pub fn upload(&mut self, queue: &wgpu::Queue, draw_list: &SplatterDrawList, proj: Mat4) {
        let uniforms = SplatterUniforms::new(draw_list.transform, proj);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let particles = &draw_list.particles.particles;
        let particle_count = particles.len().min(MAX_SPLATTER_PARTICLES);
        if particle_count < particles.len() {
            log::debug!(
                "Splatter particle batch truncated to {} of {}",
                particle_count,
                particles.len()
            );
        }
        if particle_count > 0 {
            queue.write_buffer(
                &self.particle_buffer,
                0,
                bytemuck::cast_slice(&particles[..particle_count]),
            );
        }
        self.particle_count = particle_count as u32;

        let decals = &draw_list.decals;
        let quads = decals.quad_count().min(MAX_DECAL_QUADS);
        if quads < decals.quad_count() {
            log::debug!(
                "Splatter decal batch truncated to {} of {} quads",
                quads,
                decals.quad_count()
            );
        }
        if quads > 0 {
            queue.write_buffer(
                &self.decal_vertex_buffer,
                0,
                bytemuck::cast_slice(&decals.vertices[..quads * 4]),
            );
            queue.write_buffer(
                &self.decal_index_buffer,
                0,
                bytemuck::cast_slice(&decals.indices[..quads * 6]),
            );
        }
        self.decal_index_count = (quads * 6) as u32;
    }

    /// Record decal then particle draws for the last upload.
    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);

        if self.decal_index_count > 0 {
            render_pass.set_pipeline(&self.decal_pipeline);
            render_pass.set_vertex_buffer(0, self.decal_vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.decal_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.decal_index_count, 0, 0..1);
        }

        if self.particle_count > 0 {
            render_pass.set_pipeline(&self.particle_pipeline);
            // 6 vertices per billboard, one instance per particle
            render_pass.draw(0..6, 0..self.particle_count);
        }
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn decal_index_count(&self) -> u32 {
        self.decal_index_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decal_attributes_match_vertex() {
        let last = DECAL_ATTRIBUTES[2];
        assert_eq!(
            last.offset + last.format.size(),
            std::mem::size_of::<DecalVertex>() as u64
        );
    }

    #[test]
    fn test_buffer_sizes() {
        assert_eq!(PARTICLE_BUFFER_SIZE, MAX_SPLATTER_PARTICLES * 32);
        assert_eq!(DECAL_VERTEX_BUFFER_SIZE, MAX_DECAL_QUADS * 4 * 36);
        assert_eq!(DECAL_INDEX_BUFFER_SIZE, MAX_DECAL_QUADS * 24);
    }
}
