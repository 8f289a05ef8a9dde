//! Decal Accumulation
//!
//! Persistent splatter marks keyed by terrain map cell. Each cell holds a
//! small square of opacity texels whose resolution is fixed when the patch is
//! first created. Later splats blend into the existing texels
//! (`a += c * (1 - a)`), so coverage only ever grows and a patch is never
//! rebuilt at a different resolution.

use std::collections::HashMap;

use glam::{IVec2, Vec2, Vec3};

use crate::render::batches::{DecalBatch, DecalVertex};
use crate::world::heightfield::{HeightField, WorldRect};

/// Texels fainter than this are not emitted as geometry.
pub const MIN_VISIBLE_ALPHA: f32 = 0.01;

/// Height of decal quads above the terrain surface.
pub const DECAL_LIFT: f32 = 0.02;

/// Circular splat footprint in map coordinates.
#[derive(Clone, Copy, Debug)]
struct Stamp {
    center: Vec2,
    radius: Vec2,
    strength: f32,
    color: [f32; 3],
}

impl Stamp {
    /// Opacity contributed to the square `[min, max]`, using its point
    /// closest to the splat centre. Falls off quadratically to zero at the rim.
    fn contribution(&self, min: Vec2, max: Vec2) -> f32 {
        let nearest = self.center.clamp(min, max);
        let d = ((nearest - self.center) / self.radius).length_squared();
        if d >= 1.0 {
            0.0
        } else {
            self.strength * (1.0 - d)
        }
    }
}

/// Blended splatter record for one terrain map cell.
#[derive(Clone, Debug, PartialEq)]
pub struct DecalPatch {
    resolution: u32,
    alpha: Vec<f32>,
    color: [f32; 3],
    splats: u32,
}

impl DecalPatch {
    fn new(resolution: u32, color: [f32; 3]) -> Self {
        let resolution = resolution.max(1);
        Self {
            resolution,
            alpha: vec![0.0; (resolution * resolution) as usize],
            color,
            splats: 0,
        }
    }

    /// Texels per cell along each axis.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Opacity of texel `(u, v)`.
    pub fn texel(&self, u: u32, v: u32) -> f32 {
        self.alpha[(u + v * self.resolution) as usize]
    }

    pub fn texels(&self) -> &[f32] {
        &self.alpha
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    /// Number of splats that have blended into this patch.
    pub fn splat_count(&self) -> u32 {
        self.splats
    }

    /// Mean texel opacity, 0..1.
    pub fn coverage(&self) -> f32 {
        self.alpha.iter().sum::<f32>() / self.alpha.len() as f32
    }

    fn blend(&mut self, cell: IVec2, stamp: &Stamp) -> bool {
        let texel = 1.0 / self.resolution as f32;
        let mut strongest = 0.0_f32;

        for v in 0..self.resolution {
            for u in 0..self.resolution {
                let min = cell.as_vec2() + Vec2::new(u as f32, v as f32) * texel;
                let c = stamp.contribution(min, min + Vec2::splat(texel));
                if c > 0.0 {
                    let a = &mut self.alpha[(u + v * self.resolution) as usize];
                    *a += c * (1.0 - *a);
                    strongest = strongest.max(c);
                }
            }
        }

        if strongest > 0.0 {
            for (channel, target) in self.color.iter_mut().zip(stamp.color) {
                *channel += (target - *channel) * strongest;
            }
            self.splats += 1;
        }
        strongest > 0.0
    }
}

/// Append/blend-only decal store. There is no removal API.
#[derive(Clone, Debug, Default)]
pub struct DecalBuffer {
    patches: HashMap<IVec2, DecalPatch>,
}

impl DecalBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blend a circular splat of `radius` around `position` into the buffer.
    ///
    /// Affects the cells of `terrain.patch_rect` of the circle's bounding box
    /// that the circle actually reaches. New patches are created at
    /// `resolution`; existing ones keep theirs. Returns the number of patches
    /// touched; splats outside the terrain touch none.
    pub fn splat(
        &mut self,
        terrain: &HeightField,
        position: Vec3,
        radius: f32,
        resolution: u32,
        strength: f32,
        color: [f32; 3],
    ) -> usize {
        if !(radius > 0.0) || !position.is_finite() || !(strength > 0.0) {
            return 0;
        }

        let center = Vec2::new(position.x, position.z);
        let rect = terrain.patch_rect(&WorldRect::around(center, radius));
        let stamp = Stamp {
            center: terrain.to_map_f(position),
            radius: terrain.to_map_size_f(Vec2::splat(radius)),
            strength: strength.min(1.0),
            color,
        };

        let mut touched = 0;
        for cell in rect.cells() {
            if stamp.contribution(cell.as_vec2(), cell.as_vec2() + Vec2::ONE) <= 0.0 {
                continue;
            }
            let patch = self
                .patches
                .entry(cell)
                .or_insert_with(|| DecalPatch::new(resolution, color));
            if patch.blend(cell, &stamp) {
                touched += 1;
            }
        }
        touched
    }

    pub fn patch(&self, cell: IVec2) -> Option<&DecalPatch> {
        self.patches.get(&cell)
    }

    /// Coverage of `cell`, zero where nothing was splatted.
    pub fn coverage_at(&self, cell: IVec2) -> f32 {
        self.patch(cell).map_or(0.0, DecalPatch::coverage)
    }

    pub fn patches(&self) -> impl Iterator<Item = (IVec2, &DecalPatch)> {
        self.patches.iter().map(|(cell, patch)| (*cell, patch))
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Drape every visible texel over the terrain as a quad.
    ///
    /// `visible` receives the world centre of each patch; patches it rejects
    /// are skipped. Patches are emitted in row order so output is stable.
    pub fn build_batch(&self, terrain: &HeightField, visible: impl Fn(Vec3) -> bool) -> DecalBatch {
        let mut cells: Vec<IVec2> = self.patches.keys().copied().collect();
        cells.sort_unstable_by_key(|c| (c.y, c.x));

        let drape = |map: Vec2, uv: Vec2, color: [f32; 4]| {
            let world = terrain.to_world_f(map);
            DecalVertex {
                position: [world.x, terrain.height_at(world.x, world.y) + DECAL_LIFT, world.y],
                uv: uv.to_array(),
                color,
            }
        };

        let mut batch = DecalBatch::default();
        for cell in cells {
            let patch = &self.patches[&cell];

            let center = terrain.to_world_f(cell.as_vec2() + Vec2::splat(0.5));
            let center = Vec3::new(center.x, terrain.height_at(center.x, center.y), center.y);
            if !visible(center) {
                continue;
            }

            let res = patch.resolution;
            let texel = 1.0 / res as f32;
            for v in 0..res {
                for u in 0..res {
                    let alpha = patch.texel(u, v);
                    if alpha < MIN_VISIBLE_ALPHA {
                        continue;
                    }
                    let color = [patch.color[0], patch.color[1], patch.color[2], alpha];
                    let uv0 = Vec2::new(u as f32, v as f32) * texel;
                    let map0 = cell.as_vec2() + uv0;
                    // Counter-clockwise seen from above (+Y)
                    batch.push_quad([
                        drape(map0, uv0, color),
                        drape(map0 + Vec2::new(0.0, texel), uv0 + Vec2::new(0.0, texel), color),
                        drape(map0 + Vec2::splat(texel), uv0 + Vec2::splat(texel), color),
                        drape(map0 + Vec2::new(texel, 0.0), uv0 + Vec2::new(texel, 0.0), color),
                    ]);
                }
            }
        }
        batch
    }
}
