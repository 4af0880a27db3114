//! Host-facing render and collision surfaces.
//!
//! A patch never talks to a renderer or physics engine directly. It pushes
//! buffers into a [`SurfaceSink`] (render mesh) and a [`CollisionSink`]
//! (collision mesh) supplied by the host when the patch is created. Updates
//! come in two granularities:
//!
//! - **Full replace**: topology, UVs, normals and tangents changed
//!   (generation, shading recalculation)
//! - **Position patch**: only vertex positions moved (brush ticks, sewing)

use glam::{Vec2, Vec3, Vec4};

use crate::shading::Aabb;

/// The renderable surface as last committed by a patch.
#[derive(Debug, Clone, Default)]
pub struct SurfaceData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub triangles: Vec<u32>,
    pub bounds: Aabb,
}

/// Interleaved vertex layout for direct GPU upload.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 4],
}

impl SurfaceData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Build the interleaved vertex buffer.
    ///
    /// Missing attributes (e.g. before shading is computed) are zero-filled.
    pub fn interleaved(&self) -> Vec<SurfaceVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| SurfaceVertex {
                position: p.to_array(),
                normal: self.normals.get(i).copied().unwrap_or(Vec3::ZERO).to_array(),
                uv: self.uvs.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
                tangent: self.tangents.get(i).copied().unwrap_or(Vec4::ZERO).to_array(),
            })
            .collect()
    }

    /// Interleaved vertex buffer as raw bytes.
    pub fn interleaved_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleaved()).to_vec()
    }
}

/// Receives the render surface of a patch.
pub trait SurfaceSink {
    /// Replace every buffer of the render mesh.
    fn replace_surface(&mut self, surface: &SurfaceData);

    /// Overwrite vertex positions; topology and other attributes are unchanged.
    fn update_positions(&mut self, positions: &[Vec3]);
}

/// Receives the collision surface of a patch.
pub trait CollisionSink {
    /// Rebuild the collision mesh from a finalized surface.
    fn rebuild_collision(&mut self, positions: &[Vec3], triangles: &[u32]);
}

impl<T: SurfaceSink + ?Sized> SurfaceSink for Box<T> {
    fn replace_surface(&mut self, surface: &SurfaceData) {
        (**self).replace_surface(surface);
    }

    fn update_positions(&mut self, positions: &[Vec3]) {
        (**self).update_positions(positions);
    }
}

impl<T: CollisionSink + ?Sized> CollisionSink for Box<T> {
    fn rebuild_collision(&mut self, positions: &[Vec3], triangles: &[u32]) {
        (**self).rebuild_collision(positions, triangles);
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SurfaceSink for NullSink {
    fn replace_surface(&mut self, _surface: &SurfaceData) {}
    fn update_positions(&mut self, _positions: &[Vec3]) {}
}

impl CollisionSink for NullSink {
    fn rebuild_collision(&mut self, _positions: &[Vec3], _triangles: &[u32]) {}
}

/// In-memory render surface that keeps the latest buffers.
#[derive(Debug, Default, Clone)]
pub struct RecordedSurface {
    pub surface: SurfaceData,
    /// Number of full replacements received
    pub replacements: usize,
    /// Number of position-only updates received
    pub position_updates: usize,
}

impl SurfaceSink for RecordedSurface {
    fn replace_surface(&mut self, surface: &SurfaceData) {
        self.surface = surface.clone();
        self.replacements += 1;
    }

    fn update_positions(&mut self, positions: &[Vec3]) {
        self.surface.positions.clear();
        self.surface.positions.extend_from_slice(positions);
        self.position_updates += 1;
    }
}

/// In-memory collision mesh that keeps the latest buffers.
#[derive(Debug, Default, Clone)]
pub struct RecordedCollision {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<u32>,
    /// Number of rebuilds received
    pub rebuilds: usize,
}

impl CollisionSink for RecordedCollision {
    fn rebuild_collision(&mut self, positions: &[Vec3], triangles: &[u32]) {
        self.positions = positions.to_vec();
        self.triangles = triangles.to_vec();
        self.rebuilds += 1;
    }
}
