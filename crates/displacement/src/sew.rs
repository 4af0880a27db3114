//! Sewing: reconciling vertex heights across neighbouring patches.
//!
//! Adjacent patches that were sculpted separately leave vertical seams where
//! their rims meet. Sewing finds, for every vertex, the nearest vertex on any
//! *other* patch and, when it is within tolerance, copies that vertex's
//! world height into the local frame of the first. Only Y changes, so the
//! in-plane grid layout is preserved.
//!
//! Patches are processed in order and each search reads the current state
//! of the other patches. A vertex sewn early is therefore already matched
//! when its partner patch is visited, and the partner stays put.

use displacement_config::DEFAULT_SEW_TOLERANCE;
use glam::Vec3;
use tracing::{debug, info};

use crate::patch::DisplacementPatch;
use crate::sink::{CollisionSink, SurfaceSink};
use crate::types::DisplacementError;

/// Outcome of a sew.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SewReport {
    /// Vertices whose height was overwritten
    pub vertices_snapped: usize,
    /// Indices (into the input slice) of patches that were modified
    pub patches_touched: Vec<usize>,
}

/// Sew `patches` with the default tolerance.
pub fn sew_default<S: SurfaceSink, C: CollisionSink>(
    patches: &mut [DisplacementPatch<S, C>],
) -> Result<SewReport, DisplacementError> {
    sew(patches, DEFAULT_SEW_TOLERANCE)
}

/// Snap every vertex to the height of its closest neighbour on another patch.
///
/// A neighbour qualifies when its world distance is strictly below
/// `tolerance`; among qualifying neighbours the closest wins, with ties going
/// to the first found. Every modified patch is committed and has its
/// collision rebuilt exactly once. Fewer than two patches is a no-op.
pub fn sew<S: SurfaceSink, C: CollisionSink>(
    patches: &mut [DisplacementPatch<S, C>],
    tolerance: f32,
) -> Result<SewReport, DisplacementError> {
    let mut report = SewReport::default();
    if patches.len() < 2 {
        return Ok(report);
    }

    for i in 0..patches.len() {
        let heights = snap_heights(patches, i, tolerance);
        if heights.is_empty() {
            continue;
        }

        let patch = &mut patches[i];
        for &(index, y) in &heights {
            patch.set_height(index, y)?;
        }

        debug!("sew: patch {} snapped {} vertices", i, heights.len());
        report.vertices_snapped += heights.len();
        report.patches_touched.push(i);
    }

    for &i in &report.patches_touched {
        let patch = &mut patches[i];
        patch.commit_geometry();
        patch.sync_collision_surface();
    }

    info!(
        "sew: {} patches, tolerance {} -> {} vertices snapped across {} patches",
        patches.len(),
        tolerance,
        report.vertices_snapped,
        report.patches_touched.len()
    );
    Ok(report)
}

/// Local target heights for the vertices of `patches[target]` that have a
/// neighbour within `tolerance` on another patch.
fn snap_heights<S, C>(
    patches: &[DisplacementPatch<S, C>],
    target: usize,
    tolerance: f32,
) -> Vec<(usize, f32)> {
    let patch = &patches[target];
    let inverse = patch.transform().inverse();

    patch
        .world_positions()
        .enumerate()
        .filter_map(|(index, world)| {
            let nearest = closest_on_others(patches, target, world, tolerance)?;
            Some((index, inverse.transform_point3(nearest).y))
        })
        .collect()
}

/// World position of the closest vertex to `point` on any patch but `skip`.
fn closest_on_others<S, C>(
    patches: &[DisplacementPatch<S, C>],
    skip: usize,
    point: Vec3,
    tolerance: f32,
) -> Option<Vec3> {
    let mut best: Option<(f32, Vec3)> = None;

    for (j, other) in patches.iter().enumerate() {
        if j == skip {
            continue;
        }
        for candidate in other.world_positions() {
            let distance = point.distance(candidate);
            if distance >= tolerance {
                continue;
            }
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, candidate));
            }
        }
    }

    best.map(|(_, position)| position)
}
