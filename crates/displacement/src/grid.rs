//! Regular grid mesh generation.
//!
//! A patch is a flat `(gw + 1) × (gd + 1)` lattice of vertices stored
//! row-major: row `z` holds the `gw + 1` vertices of that row in increasing
//! `x`. Every algorithm that needs adjacency goes through [`GridDims::index`]
//! instead of assuming a loop order.

use glam::{Vec2, Vec3, Vec4};
use tracing::{debug, warn};

use crate::shading::compute_normals;
use crate::types::{DisplacementError, GenerationParams};

/// Tangent authored on every generated vertex (flat grid, uniform tangent space).
pub const GRID_TANGENT: Vec4 = Vec4::new(1.0, 0.0, 0.0, -1.0);

/// Grid resolution in cells along X (`gw`) and Z (`gd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    pub gw: u32,
    pub gd: u32,
}

impl GridDims {
    /// Resolution of a grid generated from `params`.
    ///
    /// Fails for the same inputs as [`GenerationParams::validate`].
    pub fn from_params(params: &GenerationParams) -> Result<Self, DisplacementError> {
        params.validate()?;
        let (gw, gd) = params.resolution()?;
        Ok(Self { gw, gd })
    }

    /// Vertices per row.
    pub fn columns(&self) -> usize {
        self.gw as usize + 1
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.gd as usize + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.columns() * self.rows()
    }

    pub fn cell_count(&self) -> usize {
        self.gw as usize * self.gd as usize
    }

    /// Triangle index count (two triangles per cell).
    pub fn index_count(&self) -> usize {
        self.cell_count() * 6
    }

    /// Row-major vertex index of grid coordinate `(x, z)`.
    #[inline]
    pub fn index(&self, x: u32, z: u32) -> usize {
        z as usize * self.columns() + x as usize
    }

    /// Grid coordinate of a vertex index, or `None` past the end of the grid.
    pub fn coords(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.vertex_count() {
            return None;
        }
        let columns = self.columns();
        Some(((index % columns) as u32, (index / columns) as u32))
    }
}

/// Buffers produced by [`generate`].
#[derive(Debug, Clone)]
pub struct GridMesh {
    pub dims: GridDims,
    pub positions: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub uvs: Vec<Vec2>,
    pub tangents: Vec<Vec4>,
    pub normals: Vec<Vec3>,
}

/// Generate a flat grid centred on the origin.
///
/// Rejects non-positive sizes and subdivisions outside the supported range
/// without producing anything.
pub fn generate(width: i32, depth: i32, subdivision: u32) -> Result<GridMesh, DisplacementError> {
    let params = GenerationParams::new(width, depth, subdivision);
    let dims = GridDims::from_params(&params).inspect_err(|e| {
        warn!("generate: rejected {:?}: {}", params, e);
    })?;
    let step = subdivision as f32;
    // Integer halves: odd resolutions sit half a cell off centre.
    let half_w = (dims.gw / 2) as i64;
    let half_d = (dims.gd / 2) as i64;

    let count = dims.vertex_count();
    let mut positions = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);

    for z in 0..=dims.gd {
        for x in 0..=dims.gw {
            positions.push(Vec3::new(
                (x as i64 - half_w) as f32 / step,
                0.0,
                (z as i64 - half_d) as f32 / step,
            ));
            uvs.push(Vec2::new(x as f32 / dims.gw as f32, z as f32 / dims.gd as f32));
        }
    }

    let mut triangles = Vec::with_capacity(dims.index_count());
    for z in 0..dims.gd {
        for x in 0..dims.gw {
            let a = dims.index(x, z) as u32;
            let b = dims.index(x + 1, z) as u32;
            let c = dims.index(x, z + 1) as u32;
            let d = dims.index(x + 1, z + 1) as u32;
            // Both triangles wind so that cross(c - a, b - a) points +Y.
            triangles.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    let normals = compute_normals(&positions, &triangles);
    let tangents = vec![GRID_TANGENT; count];

    debug!(
        "generate: {}x{} @ {} -> grid {}x{}, {} vertices, {} triangles",
        width,
        depth,
        subdivision,
        dims.gw,
        dims.gd,
        count,
        triangles.len() / 3
    );

    Ok(GridMesh {
        dims,
        positions,
        triangles,
        uvs,
        tangents,
        normals,
    })
}
