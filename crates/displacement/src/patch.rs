//! A single displacement patch: a live vertex grid plus its host surfaces.
//!
//! Topology is fixed at generation time. Sculpting only moves the entries of
//! `vertices`; the triangle list and UVs stay as generated until the next
//! [`DisplacementPatch::generate`].
//!
//! Edits go through three stages, each cheaper than the next to call often:
//!
//! 1. `apply_delta` / `set_height` mutate the live buffer
//! 2. `commit_geometry` pushes positions to the render surface (per brush tick)
//! 3. `recalculate_shading` / `sync_collision_surface` rebuild derived data
//!    (per stroke)

use glam::{Affine3A, Vec3};
use tracing::debug;

use crate::grid::{self, GridDims, GridMesh};
use crate::shading::{compute_normals, compute_tangents, Aabb};
use crate::sink::{CollisionSink, NullSink, SurfaceData, SurfaceSink};
use crate::types::{DisplacementError, GenerationParams};

#[derive(Debug)]
pub struct DisplacementPatch<S = NullSink, C = NullSink> {
    params: GenerationParams,
    dims: GridDims,
    /// Live local-space positions, row-major by `dims.index(x, z)`
    vertices: Vec<Vec3>,
    /// Render surface as of the last commit
    surface: SurfaceData,
    /// Local-to-world mapping, kept in sync by the host scene
    transform: Affine3A,
    surface_sink: S,
    collision_sink: C,
}

impl DisplacementPatch<NullSink, NullSink> {
    /// Create a patch with no host surfaces attached.
    pub fn headless(params: GenerationParams) -> Result<Self, DisplacementError> {
        Self::new(params, NullSink, NullSink)
    }
}

impl<S: SurfaceSink, C: CollisionSink> DisplacementPatch<S, C> {
    /// Generate a new flat patch and push it to both sinks.
    pub fn new(
        params: GenerationParams,
        surface_sink: S,
        collision_sink: C,
    ) -> Result<Self, DisplacementError> {
        let mesh = grid::generate(params.width, params.depth, params.subdivision)?;
        let mut patch = Self {
            params,
            dims: mesh.dims,
            vertices: Vec::new(),
            surface: SurfaceData::default(),
            transform: Affine3A::IDENTITY,
            surface_sink,
            collision_sink,
        };
        patch.install(params, mesh);
        Ok(patch)
    }

    /// Replace the patch with a freshly generated flat grid.
    ///
    /// On error nothing changes. On success every previous edit is lost.
    pub fn generate(
        &mut self,
        width: i32,
        depth: i32,
        subdivision: u32,
    ) -> Result<(), DisplacementError> {
        let mesh = grid::generate(width, depth, subdivision)?;
        self.install(GenerationParams::new(width, depth, subdivision), mesh);
        Ok(())
    }

    /// Regenerate from the stored parameters, discarding all sculpting.
    pub fn reset_to_original(&mut self) -> Result<(), DisplacementError> {
        let params = self.params;
        debug!("reset_to_original: {:?}", params);
        self.generate(params.width, params.depth, params.subdivision)
    }

    fn install(&mut self, params: GenerationParams, mesh: GridMesh) {
        let GridMesh {
            dims,
            positions,
            triangles,
            uvs,
            tangents,
            normals,
        } = mesh;

        self.params = params;
        self.dims = dims;
        self.vertices = positions.clone();
        self.surface = SurfaceData {
            bounds: Aabb::from_points(&positions),
            positions,
            normals,
            tangents,
            uvs,
            triangles,
        };

        self.surface_sink.replace_surface(&self.surface);
        self.sync_collision_surface();
    }

    /// Push the live vertex buffer to the render surface.
    pub fn commit_geometry(&mut self) {
        self.surface.positions.copy_from_slice(&self.vertices);
        self.surface_sink.update_positions(&self.surface.positions);
    }

    /// Recompute bounds, normals and tangents from the committed surface.
    pub fn recalculate_shading(&mut self) {
        let surface = &mut self.surface;
        surface.bounds = Aabb::from_points(&surface.positions);
        surface.normals = compute_normals(&surface.positions, &surface.triangles);
        surface.tangents = compute_tangents(
            &surface.positions,
            &surface.normals,
            &surface.uvs,
            &surface.triangles,
        );
        self.surface_sink.replace_surface(&self.surface);
    }

    /// Rebuild the collision mesh from the committed surface.
    pub fn sync_collision_surface(&mut self) {
        self.collision_sink
            .rebuild_collision(&self.surface.positions, &self.surface.triangles);
    }
}

impl<S, C> DisplacementPatch<S, C> {
    /// Add `delta` to the local position of vertex `index`.
    pub fn apply_delta(&mut self, index: usize, delta: Vec3) -> Result<(), DisplacementError> {
        let len = self.vertices.len();
        let vertex = self
            .vertices
            .get_mut(index)
            .ok_or(DisplacementError::IndexOutOfRange { index, len })?;
        *vertex += delta;
        Ok(())
    }

    /// Overwrite the local Y of vertex `index`.
    pub fn set_height(&mut self, index: usize, y: f32) -> Result<(), DisplacementError> {
        let len = self.vertices.len();
        let vertex = self
            .vertices
            .get_mut(index)
            .ok_or(DisplacementError::IndexOutOfRange { index, len })?;
        vertex.y = y;
        Ok(())
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Live local-space vertex positions.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Triangle indices into [`Self::vertices`].
    pub fn triangles(&self) -> &[u32] {
        &self.surface.triangles
    }

    /// The render surface as of the last commit.
    pub fn surface(&self) -> &SurfaceData {
        &self.surface
    }

    /// Whether live positions differ from the committed surface.
    pub fn is_dirty(&self) -> bool {
        self.vertices != self.surface.positions
    }

    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    /// Update the local-to-world mapping (the host owns placement).
    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
    }

    /// World-space position of vertex `index`.
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        self.vertices
            .get(index)
            .map(|&p| self.transform.transform_point3(p))
    }

    /// World-space positions of every vertex, in index order.
    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .iter()
            .map(move |&p| self.transform.transform_point3(p))
    }

    /// Express a world-space point in this patch's local frame.
    pub fn local_from_world(&self, point: Vec3) -> Vec3 {
        self.transform.inverse().transform_point3(point)
    }

    pub fn surface_sink(&self) -> &S {
        &self.surface_sink
    }

    pub fn collision_sink(&self) -> &C {
        &self.collision_sink
    }
}
