//! HeightField Terrain Queries
//!
//! A terrain is a grid of vertices in the X/Z plane whose heights are read
//! from a [`HeightMap`]. The heightmap resolution defines the grid resolution.
//!
//! ## Coordinate spaces
//! - **World**: metres, `(x, z)` horizontal, `y` up.
//! - **Map**: heightmap sample coordinates. Sample `(0, 0)` sits at the terrain
//!   offset and sample `(width - 1, height - 1)` at `offset + size`, so the
//!   scale factor is `(samples - 1) / size` per axis.
//!
//! World to map conversion floors points and rounds rectangles outward, so a
//! world-space region is never under-covered by the map rectangle.

use glam::{IVec2, Vec2, Vec3};

use super::heightmap::HeightMap;
use crate::error::{Result, TerrainError};

/// Determinant threshold below which a ray is treated as parallel to a triangle.
const RAY_EPSILON: f32 = 1e-7;

/// Projected direction components below this are treated as zero when walking cells.
const WALK_EPSILON: f32 = 1e-6;

/// Rectangle in world X/Z coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    /// Minimum corner (x, z)
    pub min: Vec2,
    /// Extent along x and z
    pub size: Vec2,
}

impl WorldRect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Bounding box of a circle of `radius` around `center` (x, z).
    pub fn around(center: Vec2, radius: f32) -> Self {
        let radius = radius.max(0.0);
        Self {
            min: center - Vec2::splat(radius),
            size: Vec2::splat(radius * 2.0),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }
}

/// Rectangle in integer heightmap coordinates. `size` may be zero (empty).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapRect {
    pub origin: IVec2,
    pub size: IVec2,
}

impl MapRect {
    pub const EMPTY: MapRect = MapRect {
        origin: IVec2::ZERO,
        size: IVec2::ZERO,
    };

    pub fn new(origin: IVec2, size: IVec2) -> Self {
        Self {
            origin,
            size: size.max(IVec2::ZERO),
        }
    }

    /// Exclusive upper corner, saturating at the `i32` range.
    pub fn end(&self) -> IVec2 {
        self.origin.saturating_add(self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.size.x as usize * self.size.y as usize
        }
    }

    pub fn contains(&self, point: IVec2) -> bool {
        point.cmpge(self.origin).all() && point.cmplt(self.end()).all()
    }

    /// Intersection with another rectangle; empty if they do not overlap.
    pub fn intersect(&self, other: &MapRect) -> MapRect {
        let origin = self.origin.max(other.origin);
        let end = self.end().min(other.end());
        if end.x <= origin.x || end.y <= origin.y {
            return MapRect::EMPTY;
        }
        MapRect::new(origin, end.saturating_sub(origin))
    }

    /// Every cell in the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + use<> {
        let origin = self.origin;
        let end = self.end();
        (origin.y..end.y).flat_map(move |y| (origin.x..end.x).map(move |x| IVec2::new(x, y)))
    }
}

/// Heightmap-backed terrain with point-height and ray-intersection queries.
///
/// Vertex positions and normals are computed once at construction and are
/// read-only afterwards.
#[derive(Clone, Debug)]
pub struct HeightField {
    map_size: IVec2,
    size: Vec3,
    offset: Vec3,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    to_map_factor: Vec2,
}

impl HeightField {
    /// Build terrain from a heightmap.
    ///
    /// # Arguments
    /// * `heightmap` - Normalized samples; `1.0` maps to `size.y`
    /// * `size` - World-space volume occupied by the terrain
    /// * `offset` - World position of sample `(0, 0)` at height `0.0`
    pub fn from_heightmap(heightmap: &HeightMap, size: Vec3, offset: Vec3) -> Result<Self> {
        if !(size.x > 0.0 && size.z > 0.0) {
            return Err(TerrainError::InvalidSize(size));
        }

        let width = heightmap.width() as i32;
        let height = heightmap.height() as i32;
        let to_map_factor = Vec2::new(
            (width - 1).max(1) as f32 / size.x,
            (height - 1).max(1) as f32 / size.z,
        );

        let mut vertices = Vec::with_capacity(heightmap.samples().len());
        for y in 0..height {
            for x in 0..width {
                let sample = heightmap.sample(x as u32, y as u32);
                vertices.push(Vec3::new(
                    offset.x + x as f32 / to_map_factor.x,
                    offset.y + sample * size.y,
                    offset.z + y as f32 / to_map_factor.y,
                ));
            }
        }

        let mut field = Self {
            map_size: IVec2::new(width, height),
            size,
            offset,
            vertices,
            normals: Vec::new(),
            to_map_factor,
        };
        field.normals = field.compute_normals();

        log::debug!(
            "Built terrain {}x{} samples, size {}, offset {}",
            width,
            height,
            size,
            offset
        );
        Ok(field)
    }

    /// Central-difference normals, one-sided at the borders.
    fn compute_normals(&self) -> Vec<Vec3> {
        let mut normals = Vec::with_capacity(self.vertices.len());
        for y in 0..self.map_size.y {
            for x in 0..self.map_size.x {
                let left = self.vertex_position(IVec2::new(x - 1, y));
                let right = self.vertex_position(IVec2::new(x + 1, y));
                let back = self.vertex_position(IVec2::new(x, y - 1));
                let front = self.vertex_position(IVec2::new(x, y + 1));
                let along_x = right - left;
                let along_z = front - back;
                normals.push(along_z.cross(along_x).normalize_or(Vec3::Y));
            }
        }
        normals
    }

    /// Heightmap dimensions in samples.
    pub fn map_size(&self) -> IVec2 {
        self.map_size
    }

    /// World-space volume occupied by the terrain.
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// World-space origin of the terrain.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// The full valid sample rectangle.
    pub fn map_rect(&self) -> MapRect {
        MapRect::new(IVec2::ZERO, self.map_size)
    }

    /// Every terrain quad, addressed by its minimum sample.
    ///
    /// A grid of `n` samples has `n - 1` quads per axis; a single-sample axis
    /// keeps one quad.
    pub fn quad_rect(&self) -> MapRect {
        MapRect::new(IVec2::ZERO, (self.map_size - IVec2::ONE).max(IVec2::ONE))
    }

    #[inline]
    fn clamp_to_map(&self, p: IVec2) -> IVec2 {
        p.clamp(IVec2::ZERO, self.map_size - IVec2::ONE)
    }

    #[inline]
    fn index(&self, p: IVec2) -> usize {
        let p = self.clamp_to_map(p);
        (p.x + p.y * self.map_size.x) as usize
    }

    /// Vertex position at map coordinates (clamped to the grid).
    pub fn vertex_position(&self, p: IVec2) -> Vec3 {
        self.vertices[self.index(p)]
    }

    /// Vertex normal at map coordinates (clamped to the grid).
    pub fn vertex_normal(&self, p: IVec2) -> Vec3 {
        self.normals[self.index(p)]
    }

    // ------------------------------------------------------------------
    // World -> map
    // ------------------------------------------------------------------

    /// World position to fractional map coordinates (uses x and z).
    pub fn to_map_f(&self, point: Vec3) -> Vec2 {
        self.to_map_f_xz(Vec2::new(point.x, point.z))
    }

    /// World (x, z) to fractional map coordinates.
    pub fn to_map_f_xz(&self, point: Vec2) -> Vec2 {
        (point - Vec2::new(self.offset.x, self.offset.z)) * self.to_map_factor
    }

    /// World size (x, z) to fractional map size.
    pub fn to_map_size_f(&self, size: Vec2) -> Vec2 {
        size * self.to_map_factor
    }

    /// World position to the containing map cell (floor).
    pub fn to_map(&self, point: Vec3) -> IVec2 {
        self.to_map_f(point).floor().as_ivec2()
    }

    /// World (x, z) to the containing map cell (floor).
    pub fn to_map_xz(&self, point: Vec2) -> IVec2 {
        self.to_map_f_xz(point).floor().as_ivec2()
    }

    /// World size to map size, rounded up.
    pub fn to_map_size(&self, size: Vec2) -> IVec2 {
        self.to_map_size_f(size).ceil().as_ivec2()
    }

    /// World rectangle to the smallest map rectangle covering it.
    ///
    /// The origin is floored and the far corner ceiled, so every cell the
    /// world rectangle touches is included. Corners beyond the grid are
    /// pinned one sample outside it, so far-away rectangles still convert
    /// without overflowing; the result is otherwise not clamped.
    pub fn to_map_rect(&self, rect: &WorldRect) -> MapRect {
        let low = Vec2::splat(-1.0);
        let high = self.map_size.as_vec2();
        let origin = self.to_map_f_xz(rect.min).floor().clamp(low, high).as_ivec2();
        let end = self.to_map_f_xz(rect.max()).ceil().clamp(low, high).as_ivec2();
        MapRect::new(origin, (end - origin).max(IVec2::ONE))
    }

    /// World rectangle to the terrain quads it covers.
    ///
    /// Clamped to [`quad_rect`](Self::quad_rect), so no cell lies past the
    /// terrain edge. Rectangles entirely outside the terrain yield
    /// [`MapRect::EMPTY`].
    pub fn patch_rect(&self, rect: &WorldRect) -> MapRect {
        if rect.size.x < 0.0 || rect.size.y < 0.0 || !rect.min.is_finite() || !rect.size.is_finite() {
            return MapRect::EMPTY;
        }
        self.to_map_rect(rect).intersect(&self.quad_rect())
    }

    // ------------------------------------------------------------------
    // Map -> world
    // ------------------------------------------------------------------

    /// Fractional map coordinates to world (x, z).
    pub fn to_world_f(&self, point: Vec2) -> Vec2 {
        point / self.to_map_factor + Vec2::new(self.offset.x, self.offset.z)
    }

    /// Map cell to world (x, z) of its minimum corner.
    pub fn to_world(&self, point: IVec2) -> Vec2 {
        self.to_world_f(point.as_vec2())
    }

    /// Map size to world size.
    pub fn to_world_size(&self, size: IVec2) -> Vec2 {
        size.as_vec2() / self.to_map_factor
    }

    /// Map rectangle to the world rectangle it spans.
    pub fn to_world_rect(&self, rect: &MapRect) -> WorldRect {
        WorldRect::new(self.to_world(rect.origin), self.to_world_size(rect.size))
    }

    /// Size of one grid cell in world units (x, z).
    pub fn cell_size(&self) -> Vec2 {
        Vec2::ONE / self.to_map_factor
    }

    // ------------------------------------------------------------------
    // Height queries
    // ------------------------------------------------------------------

    /// Terrain height at world `(x, z)`.
    ///
    /// Bilinearly interpolates the four surrounding samples. Coordinates
    /// outside the terrain are clamped to the nearest border sample.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let max = (self.map_size - IVec2::ONE).as_vec2();
        let map = self.to_map_f_xz(Vec2::new(x, z));
        let map = Vec2::new(
            if map.x.is_nan() { 0.0 } else { map.x.clamp(0.0, max.x) },
            if map.y.is_nan() { 0.0 } else { map.y.clamp(0.0, max.y) },
        );

        let cell = map.floor().as_ivec2();
        let t = map - cell.as_vec2();

        let h00 = self.vertex_position(cell).y;
        let h10 = self.vertex_position(cell + IVec2::X).y;
        let h01 = self.vertex_position(cell + IVec2::Y).y;
        let h11 = self.vertex_position(cell + IVec2::ONE).y;

        let near = h00 + (h10 - h00) * t.x;
        let far = h01 + (h11 - h01) * t.x;
        near + (far - near) * t.y
    }

    /// Signed height of `position` above the terrain; negative below ground.
    pub fn height_above_ground(&self, position: Vec3) -> f32 {
        position.y - self.height_at(position.x, position.z)
    }

    // ------------------------------------------------------------------
    // Ray queries
    // ------------------------------------------------------------------

    /// Intersect a ray with the two triangles of the quad at `cell`.
    ///
    /// Distances are measured in multiples of `direction`; pass a normalized
    /// direction to get world units. `length` is the current best distance on
    /// input and is shortened on a closer hit. Returns `true` only if this quad
    /// produced a hit closer than the incoming `length`.
    pub fn ray_quad_intersection(
        &self,
        origin: Vec3,
        direction: Vec3,
        cell: IVec2,
        length: &mut f32,
    ) -> bool {
        let quads = self.map_size - IVec2::ONE;
        if cell.x < 0 || cell.y < 0 || cell.x >= quads.x || cell.y >= quads.y {
            return false;
        }

        let v00 = self.vertex_position(cell);
        let v10 = self.vertex_position(cell + IVec2::X);
        let v01 = self.vertex_position(cell + IVec2::Y);
        let v11 = self.vertex_position(cell + IVec2::ONE);

        let mut hit = false;
        for (a, b, c) in [(v00, v10, v01), (v10, v11, v01)] {
            match ray_triangle(origin, direction, a, b, c) {
                Some(t) if t < *length => {
                    *length = t;
                    hit = true;
                }
                _ => {}
            }
        }
        hit
    }

    /// Intersect a ray with the whole terrain.
    ///
    /// Walks the grid cells under the ray's X/Z footprint in order of distance,
    /// up to `length`, and keeps the closest hit. Vertical rays test a single
    /// cell; rays that never cross the terrain report no hit.
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3, length: &mut f32) -> bool {
        let quads = self.map_size - IVec2::ONE;
        if quads.x < 1 || quads.y < 1 || !(*length > 0.0) {
            return false;
        }

        let start = self.to_map_f(origin);
        let step = Vec2::new(direction.x, direction.z) * self.to_map_factor;
        let bounds = quads.as_vec2();

        // Clip the parameter range to the quad domain [0, quads].
        let mut t_enter = 0.0_f32;
        let mut t_exit = *length;
        for axis in 0..2 {
            if step[axis].abs() < WALK_EPSILON {
                if start[axis] < 0.0 || start[axis] > bounds[axis] {
                    return false;
                }
            } else {
                let t0 = (0.0 - start[axis]) / step[axis];
                let t1 = (bounds[axis] - start[axis]) / step[axis];
                t_enter = t_enter.max(t0.min(t1));
                t_exit = t_exit.min(t0.max(t1));
            }
        }
        if t_enter > t_exit {
            return false;
        }

        let entry = start + step * t_enter;
        let mut cell = entry.floor().as_ivec2().clamp(IVec2::ZERO, quads - IVec2::ONE);

        if step.x.abs() < WALK_EPSILON && step.y.abs() < WALK_EPSILON {
            return self.ray_quad_intersection(origin, direction, cell, length);
        }

        let dir_step = IVec2::new(
            if step.x > 0.0 { 1 } else { -1 },
            if step.y > 0.0 { 1 } else { -1 },
        );
        let mut t_next = Vec2::ZERO;
        let mut t_delta = Vec2::ZERO;
        for axis in 0..2 {
            if step[axis].abs() < WALK_EPSILON {
                t_next[axis] = f32::INFINITY;
                t_delta[axis] = f32::INFINITY;
            } else {
                let boundary = cell[axis] as f32 + if step[axis] > 0.0 { 1.0 } else { 0.0 };
                t_next[axis] = (boundary - start[axis]) / step[axis];
                t_delta[axis] = 1.0 / step[axis].abs();
            }
        }

        // A straight line crosses at most quads.x + quads.y cells.
        let max_steps = (quads.x + quads.y + 2) as usize;
        let mut hit = false;
        for _ in 0..max_steps {
            hit |= self.ray_quad_intersection(origin, direction, cell, length);

            let cell_exit = t_next.x.min(t_next.y);
            // Later cells only hold hits further along the ray.
            if cell_exit >= t_exit.min(*length) {
                break;
            }

            if t_next.x < t_next.y {
                cell.x += dir_step.x;
                t_next.x += t_delta.x;
            } else {
                cell.y += dir_step.y;
                t_next.y += t_delta.y;
            }
            if cell.x < 0 || cell.y < 0 || cell.x >= quads.x || cell.y >= quads.y {
                break;
            }
        }
        hit
    }
}

/// Möller–Trumbore ray/triangle test. Returns the ray parameter of the hit.
fn ray_triangle(origin: Vec3, direction: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < RAY_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}
