//! Brush engine for displacement sculpting.
//!
//! A brush application walks every vertex of a patch, measures its world
//! distance to the cursor and displaces the ones inside the radius. The
//! engine is direction-agnostic: axis selection and sign flipping happen in
//! the caller (see [`crate::session`]). It never commits geometry or
//! recomputes shading; that is done once per tick or per stroke by the
//! caller.

use displacement_config::BrushDefaults;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::patch::DisplacementPatch;
use crate::types::DisplacementError;

/// Per-vertex displacement behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BrushMode {
    /// Push vertices along the brush direction
    #[default]
    Sculpt = 0,
    /// Pull vertices toward the cursor, restricted to the direction's axes
    Smooth = 1,
}

/// Brush shape and magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Radius of influence in world units
    pub radius: f32,
    /// Signed displacement at full falloff
    pub strength: f32,
    /// Falloff exponent: 0 = uniform, 1 = linear to zero at the rim
    pub falloff: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        BrushDefaults::default().into()
    }
}

impl From<BrushDefaults> for BrushSettings {
    fn from(defaults: BrushDefaults) -> Self {
        Self {
            radius: defaults.size,
            strength: defaults.strength,
            falloff: defaults.falloff,
        }
    }
}

impl BrushSettings {
    pub fn new(radius: f32, strength: f32, falloff: f32) -> Self {
        Self {
            radius,
            strength,
            falloff,
        }
    }

    /// Whether the radius can select any vertex at all.
    pub fn is_usable(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0
    }
}

/// Outcome of one brush application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrushReport {
    /// Vertices inside the radius that received a delta
    pub vertices_affected: usize,
}

/// Falloff weight at `distance` from the brush centre.
///
/// `1 - (distance / radius) * exponent`, unclamped: exponents other than 1
/// overshoot above 1 or dip below 0 near the rim.
#[inline]
pub fn falloff_weight(distance: f32, radius: f32, exponent: f32) -> f32 {
    1.0 - (distance / radius) * exponent
}

/// Displacement for a sculpt brush at the given falloff.
#[inline]
pub fn sculpt_delta(direction: Vec3, falloff: f32, strength: f32) -> Vec3 {
    direction * falloff * strength
}

/// Displacement for a smooth brush: toward the cursor, masked by `direction`.
#[inline]
pub fn smooth_delta(cursor: Vec3, world: Vec3, direction: Vec3, falloff: f32, strength: f32) -> Vec3 {
    (cursor - world).normalize_or_zero() * direction * falloff * strength
}

/// Apply one brush tick to `patch`.
///
/// Every vertex whose world position lies within `settings.radius` of
/// `cursor` gets its delta added in place. Vertices beyond the radius are not
/// touched. A non-positive radius or a non-finite cursor or direction affects
/// nothing.
pub fn apply<S, C>(
    patch: &mut DisplacementPatch<S, C>,
    cursor: Vec3,
    direction: Vec3,
    settings: &BrushSettings,
    mode: BrushMode,
) -> Result<BrushReport, DisplacementError> {
    let mut report = BrushReport::default();
    if !settings.is_usable() || !cursor.is_finite() || !direction.is_finite() {
        return Ok(report);
    }

    let transform = patch.transform();
    for index in 0..patch.vertex_count() {
        let world = transform.transform_point3(patch.vertices()[index]);
        let distance = cursor.distance(world);
        if distance > settings.radius {
            continue;
        }

        let falloff = falloff_weight(distance, settings.radius, settings.falloff);
        let delta = match mode {
            BrushMode::Sculpt => sculpt_delta(direction, falloff, settings.strength),
            BrushMode::Smooth => {
                smooth_delta(cursor, world, direction, falloff, settings.strength)
            }
        };

        patch.apply_delta(index, delta)?;
        report.vertices_affected += 1;
    }

    trace!(
        "brush {:?}: cursor={:?} radius={} -> {} vertices",
        mode,
        cursor,
        settings.radius,
        report.vertices_affected
    );
    Ok(report)
}

/// Display data for one vertex under the brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewVertex {
    pub index: usize,
    pub world_position: Vec3,
    /// Falloff clamped to [0, 1], for colour blending
    pub display_weight: f32,
    /// Marker sphere radius, falloff clamped to [0.1, 0.15]
    pub marker_radius: f32,
}

/// Vertices a brush at `cursor` would highlight.
///
/// Distances are measured in the patch's local frame and the rim is
/// exclusive. The clamped weights are for display only and never feed back
/// into [`apply`].
pub fn preview<S, C>(
    patch: &DisplacementPatch<S, C>,
    cursor: Vec3,
    settings: &BrushSettings,
) -> Vec<PreviewVertex> {
    if !settings.is_usable() || !cursor.is_finite() {
        return Vec::new();
    }

    let local_cursor = patch.local_from_world(cursor);
    let transform = patch.transform();

    patch
        .vertices()
        .iter()
        .enumerate()
        .filter_map(|(index, &v)| {
            let distance = local_cursor.distance(v);
            if distance >= settings.radius {
                return None;
            }
            let falloff = falloff_weight(distance, settings.radius, settings.falloff);
            Some(PreviewVertex {
                index,
                world_position: transform.transform_point3(v),
                display_weight: falloff.clamp(0.0, 1.0),
                marker_radius: falloff.clamp(0.1, 0.15),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationParams;
    use glam::{Affine3A, Quat};

    fn flat(w: i32, d: i32, s: u32) -> DisplacementPatch {
        DisplacementPatch::headless(GenerationParams::new(w, d, s)).unwrap()
    }

    #[test]
    fn test_falloff_endpoints() {
        assert_eq!(falloff_weight(0.0, 2.0, 1.0), 1.0);
        assert_eq!(falloff_weight(2.0, 2.0, 1.0), 0.0);
        assert!((falloff_weight(1.0, 2.0, 1.0) - 0.5).abs() < 1e-6);
        // Exponent 0 is uniform.
        assert_eq!(falloff_weight(1.9, 2.0, 0.0), 1.0);
    }

    #[test]
    fn test_falloff_is_unclamped() {
        assert!(falloff_weight(2.0, 2.0, 1.5) < 0.0);
        assert!(falloff_weight(1.0, 2.0, -1.0) > 1.0);
    }

    #[test]
    fn test_sculpt_single_vertex_exact_delta() {
        let mut patch = flat(2, 2, 1);
        let centre = patch.dims().index(1, 1);
        let cursor = patch.world_position(centre).unwrap();

        let settings = BrushSettings::new(0.5, 0.1, 1.0);
        let report = apply(&mut patch, cursor, Vec3::Y, &settings, BrushMode::Sculpt).unwrap();

        assert_eq!(report.vertices_affected, 1);
        assert_eq!(patch.vertices()[centre], cursor + Vec3::new(0.0, 0.1, 0.0));
    }

    #[test]
    fn test_sculpt_linear_falloff() {
        let mut patch = flat(2, 2, 1);
        let dims = patch.dims();
        let cursor = Vec3::ZERO; // vertex (1, 1)

        let settings = BrushSettings::new(1.0, 1.0, 1.0);
        let report = apply(&mut patch, cursor, Vec3::Y, &settings, BrushMode::Sculpt).unwrap();

        // Centre plus four neighbours at exactly the radius.
        assert_eq!(report.vertices_affected, 5);
        assert_eq!(patch.vertices()[dims.index(1, 1)].y, 1.0);
        assert_eq!(patch.vertices()[dims.index(0, 1)].y, 0.0);
        assert_eq!(patch.vertices()[dims.index(1, 2)].y, 0.0);
        // Diagonals are sqrt(2) away and untouched.
        assert_eq!(patch.vertices()[dims.index(0, 0)], Vec3::new(-1.0, 0.0, -1.0));
    }

    #[test]
    fn test_outside_radius_untouched() {
        let mut patch = flat(4, 4, 1);
        let before = patch.vertices().to_vec();
        let settings = BrushSettings::new(1.5, 0.5, 0.0);
        apply(&mut patch, Vec3::new(-2.0, 0.0, -2.0), Vec3::Y, &settings, BrushMode::Sculpt)
            .unwrap();

        let cursor = Vec3::new(-2.0, 0.0, -2.0);
        for (i, (&b, &a)) in before.iter().zip(patch.vertices()).enumerate() {
            if b.distance(cursor) > 1.5 {
                assert_eq!(a, b, "vertex {} moved", i);
            } else {
                assert_eq!(a.y, 0.5, "vertex {} not raised uniformly", i);
            }
        }
    }

    #[test]
    fn test_non_positive_radius_is_noop() {
        let mut patch = flat(2, 2, 1);
        let before = patch.vertices().to_vec();
        for radius in [0.0, -1.0, f32::NAN] {
            let settings = BrushSettings::new(radius, 1.0, 1.0);
            let report = apply(&mut patch, Vec3::ZERO, Vec3::Y, &settings, BrushMode::Sculpt).unwrap();
            assert_eq!(report.vertices_affected, 0);
        }
        assert_eq!(patch.vertices(), before.as_slice());
    }

    #[test]
    fn test_non_finite_input_is_noop() {
        let mut patch = flat(2, 2, 1);
        let before = patch.vertices().to_vec();
        let settings = BrushSettings::new(10.0, 1.0, 1.0);

        for mode in [BrushMode::Sculpt, BrushMode::Smooth] {
            let report = apply(&mut patch, Vec3::NAN, Vec3::Y, &settings, mode).unwrap();
            assert_eq!(report.vertices_affected, 0);
            let report = apply(&mut patch, Vec3::ZERO, Vec3::INFINITY, &settings, mode).unwrap();
            assert_eq!(report.vertices_affected, 0);
        }

        assert_eq!(patch.vertices(), before.as_slice());
        assert!(preview(&patch, Vec3::new(0.0, f32::NAN, 0.0), &settings).is_empty());
    }

    #[test]
    fn test_negative_direction_lowers() {
        let mut patch = flat(2, 2, 1);
        let settings = BrushSettings::new(0.5, 0.25, 1.0);
        apply(&mut patch, Vec3::ZERO, -Vec3::Y, &settings, BrushMode::Sculpt).unwrap();
        assert_eq!(patch.vertices()[patch.dims().index(1, 1)].y, -0.25);
    }

    #[test]
    fn test_smooth_pulls_along_masked_axes() {
        let mut patch = flat(2, 2, 1);
        let dims = patch.dims();
        let cursor = Vec3::new(0.0, 1.0, 0.0);
        let settings = BrushSettings::new(2.0, 0.5, 0.0);

        apply(&mut patch, cursor, Vec3::Y, &settings, BrushMode::Smooth).unwrap();

        // Centre vertex is straight below the cursor: pulled fully up.
        assert!((patch.vertices()[dims.index(1, 1)].y - 0.5).abs() < 1e-6);

        // Side vertex: pull toward cursor, but only its Y component survives.
        let side = patch.vertices()[dims.index(2, 1)];
        let expected_y = 0.5 * (1.0 / 2.0_f32.sqrt());
        assert!((side.y - expected_y).abs() < 1e-6);
        assert_eq!(side.x, 1.0);
        assert_eq!(side.z, 0.0);
    }

    #[test]
    fn test_smooth_at_cursor_is_zero() {
        let mut patch = flat(2, 2, 1);
        let settings = BrushSettings::new(0.5, 1.0, 0.0);
        let report = apply(&mut patch, Vec3::ZERO, Vec3::ONE, &settings, BrushMode::Smooth).unwrap();
        assert_eq!(report.vertices_affected, 1);
        assert_eq!(patch.vertices()[patch.dims().index(1, 1)], Vec3::ZERO);
    }

    #[test]
    fn test_brush_uses_world_space() {
        let mut patch = flat(2, 2, 1);
        patch.set_transform(Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0)));

        let settings = BrushSettings::new(0.5, 1.0, 0.0);
        let miss = apply(&mut patch, Vec3::ZERO, Vec3::Y, &settings, BrushMode::Sculpt).unwrap();
        assert_eq!(miss.vertices_affected, 0);

        let hit =
            apply(&mut patch, Vec3::new(10.0, 0.0, 0.0), Vec3::Y, &settings, BrushMode::Sculpt).unwrap();
        assert_eq!(hit.vertices_affected, 1);
    }

    #[test]
    fn test_brush_does_not_commit() {
        let mut patch = flat(2, 2, 1);
        let settings = BrushSettings::new(1.0, 1.0, 1.0);
        apply(&mut patch, Vec3::ZERO, Vec3::Y, &settings, BrushMode::Sculpt).unwrap();
        assert!(patch.is_dirty());
    }

    #[test]
    fn test_preview_clamps_for_display() {
        let mut patch = flat(2, 2, 1);
        patch.set_transform(Affine3A::from_rotation_translation(
            Quat::from_rotation_y(1.0),
            Vec3::new(0.0, 5.0, 0.0),
        ));
        let settings = BrushSettings::new(1.5, 1.0, 2.0);
        let cursor = patch.world_position(patch.dims().index(1, 1)).unwrap();
        let before = patch.vertices().to_vec();

        let preview = preview(&patch, cursor, &settings);

        // Diagonals sit at ~1.414, still inside the radius.
        assert_eq!(preview.len(), 9);
        let centre = preview.iter().find(|p| p.index == 4).unwrap();
        assert!((centre.display_weight - 1.0).abs() < 1e-5);
        assert_eq!(centre.marker_radius, 0.15);
        assert!((centre.world_position - cursor).length() < 1e-5);

        let side = preview.iter().find(|p| p.index == 1).unwrap();
        // Raw falloff is 1 - (1 / 1.5) * 2 < 0.
        assert_eq!(side.display_weight, 0.0);
        assert_eq!(side.marker_radius, 0.1);

        assert_eq!(patch.vertices(), before.as_slice());
    }

    #[test]
    fn test_settings_from_defaults() {
        let settings = BrushSettings::default();
        assert_eq!(settings.radius, 3.0);
        assert!((settings.strength - 0.1).abs() < 1e-6);
        assert_eq!(settings.falloff, 1.0);
    }
}
