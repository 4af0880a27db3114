//! Bevy render mesh as a patch surface.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use crate::sink::{SurfaceData, SurfaceSink};

/// Build a triangle-list mesh from a committed surface.
pub fn surface_to_mesh(surface: &SurfaceData) -> Mesh {
    let positions: Vec<[f32; 3]> = surface.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = surface.normals.iter().map(|n| n.to_array()).collect();
    let uvs: Vec<[f32; 2]> = surface.uvs.iter().map(|uv| uv.to_array()).collect();
    let tangents: Vec<[f32; 4]> = surface.tangents.iter().map(|t| t.to_array()).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    if !tangents.is_empty() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_TANGENT, tangents);
    }
    mesh.insert_indices(Indices::U32(surface.triangles.clone()));
    mesh
}

/// Keeps a Bevy [`Mesh`] in step with a patch.
///
/// The host copies [`Self::mesh`] into `Assets<Mesh>` whenever
/// [`Self::take_changed`] reports an update.
#[derive(Debug, Clone)]
pub struct BevyMeshSink {
    pub mesh: Mesh,
    changed: bool,
}

impl Default for BevyMeshSink {
    fn default() -> Self {
        Self {
            mesh: surface_to_mesh(&SurfaceData::default()),
            changed: false,
        }
    }
}

impl BevyMeshSink {
    /// Whether the mesh changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

impl SurfaceSink for BevyMeshSink {
    fn replace_surface(&mut self, surface: &SurfaceData) {
        self.mesh = surface_to_mesh(surface);
        self.changed = true;
    }

    fn update_positions(&mut self, positions: &[Vec3]) {
        let positions: Vec<[f32; 3]> = positions.iter().map(|p| p.to_array()).collect();
        self.mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        self.changed = true;
    }
}
