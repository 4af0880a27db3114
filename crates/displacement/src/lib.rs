//! Displacement patches for terrain-style sculpting.
//!
//! A patch is a flat, regularly subdivided grid that an artist shapes with
//! brushes and then stitches to its neighbours. This crate provides:
//! - Grid generation with UVs, normals and tangents
//! - Patch state with separate live and committed vertex buffers
//! - Sculpt and smooth brushes with radial falloff
//! - Sewing of seams between adjacent patches
//! - A pointer-driven session that maps input to brush strokes
//!
//! # Architecture
//!
//! Rendering and physics live in the host. Each patch owns a
//! [`SurfaceSink`] and a [`CollisionSink`] and pushes buffers into them at
//! well-defined points:
//!
//! ```text
//! pointer event ──► brush::apply ──► commit_geometry ──► SurfaceSink (positions)
//!                                         │
//!           stroke end ───────────────────┼──► sync_collision_surface ──► CollisionSink
//!                                         └──► recalculate_shading ─────► SurfaceSink (full)
//! ```
//!
//! With the `bevy` feature, [`BevyMeshSink`] keeps a Bevy `Mesh` up to date.

pub mod brush;
pub mod grid;
pub mod patch;
pub mod session;
pub mod sew;
pub mod shading;
pub mod sink;
pub mod types;

#[cfg(feature = "bevy")]
pub mod bevy_mesh;

pub use brush::{BrushMode, BrushReport, BrushSettings, PreviewVertex};
pub use grid::{GridDims, GridMesh};
pub use patch::DisplacementPatch;
pub use session::{
    DirectionAxis, Modifiers, PointerEvent, SculptSession, SessionOutcome, ToolMode,
};
pub use sew::SewReport;
pub use shading::Aabb;
pub use sink::{
    CollisionSink, NullSink, RecordedCollision, RecordedSurface, SurfaceData, SurfaceSink,
    SurfaceVertex,
};
pub use types::{DisplacementError, GenerationParams};

#[cfg(feature = "bevy")]
pub use bevy_mesh::BevyMeshSink;
