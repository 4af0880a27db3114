//! Derived shading data: normals, tangents and bounds.
//!
//! These are recomputed from vertex positions whenever a patch is generated
//! or a stroke ends; topology never changes, so only positions feed in.

use glam::{Vec2, Vec3, Vec4};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// Tight bounds around `points`, or [`Aabb::empty`] if there are none.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for &p in points {
            aabb.include_point(p);
        }
        aabb
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// Smooth vertex normals from area-weighted face normals.
///
/// Vertices not referenced by any non-degenerate triangle get +Y.
pub fn compute_normals(positions: &[Vec3], triangles: &[u32]) -> Vec<Vec3> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in triangles.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(&p0), Some(&p1), Some(&p2)) =
            (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };

        // Unnormalized cross product: length is twice the triangle area.
        let face = (p1 - p0).cross(p2 - p0);
        accum[i0] += face;
        accum[i1] += face;
        accum[i2] += face;
    }

    accum
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO { Vec3::Y } else { n }
        })
        .collect()
}

/// Per-vertex tangents with handedness in `w`.
///
/// Accumulates per-triangle UV derivatives, then Gram-Schmidt orthogonalizes
/// against the vertex normal. Vertices without usable UV gradients keep
/// `(1, 0, 0, -1)`.
pub fn compute_tangents(
    positions: &[Vec3],
    normals: &[Vec3],
    uvs: &[Vec2],
    triangles: &[u32],
) -> Vec<Vec4> {
    let n_verts = positions.len();
    let fallback = Vec4::new(1.0, 0.0, 0.0, -1.0);

    if uvs.len() != n_verts || normals.len() != n_verts || triangles.len() % 3 != 0 {
        return vec![fallback; n_verts];
    }

    let mut tan1 = vec![Vec3::ZERO; n_verts];
    let mut tan2 = vec![Vec3::ZERO; n_verts];

    for tri in triangles.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if i0 >= n_verts || i1 >= n_verts || i2 >= n_verts {
            continue;
        }

        let e1 = positions[i1] - positions[i0];
        let e2 = positions[i2] - positions[i0];
        let d1 = uvs[i1] - uvs[i0];
        let d2 = uvs[i2] - uvs[i0];

        let denom = d1.x * d2.y - d2.x * d1.y;
        if denom.abs() < 1e-12 {
            continue; // degenerate UV mapping
        }
        let r = 1.0 / denom;
        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;

        for idx in [i0, i1, i2] {
            tan1[idx] += sdir;
            tan2[idx] += tdir;
        }
    }

    (0..n_verts)
        .map(|i| {
            let n = normals[i];
            let t = tan1[i] - n * n.dot(tan1[i]);
            let Some(t) = t.try_normalize() else {
                return fallback;
            };
            let w = if n.cross(t).dot(tan2[i]) < 0.0 { -1.0 } else { 1.0 };
            t.extend(w)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::generate;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(&[
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, -2.0, 0.0),
            Vec3::new(0.0, 1.0, 1.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 1.0, 2.0));
    }

    #[test]
    fn test_empty_aabb() {
        assert!(Aabb::from_points(&[]).is_empty());
        assert!(!Aabb::from_points(&[Vec3::ONE]).is_empty());
    }

    #[test]
    fn test_normals_tilt_with_raised_vertex() {
        let mut mesh = generate(2, 2, 1).unwrap();
        let dims = mesh.dims;
        // Raise the right column; normals on the slope lean toward -X.
        for z in 0..=dims.gd {
            mesh.positions[dims.index(2, z)].y = 1.0;
        }
        let normals = compute_normals(&mesh.positions, &mesh.triangles);
        let n = normals[dims.index(2, 1)];
        assert!(n.x < 0.0);
        assert!(n.y > 0.0);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unreferenced_vertex_gets_up() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::ONE];
        let normals = compute_normals(&positions, &[0, 2, 1]);
        assert_eq!(normals[3], Vec3::Y);
        assert!((normals[0] - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_flat_grid_tangents_match_authored() {
        let mesh = generate(3, 3, 1).unwrap();
        let tangents = compute_tangents(&mesh.positions, &mesh.normals, &mesh.uvs, &mesh.triangles);
        for t in tangents {
            assert!((t - Vec4::new(1.0, 0.0, 0.0, -1.0)).length() < 1e-5, "{:?}", t);
        }
    }

    #[test]
    fn test_tangents_fallback_without_uvs() {
        let mesh = generate(1, 1, 1).unwrap();
        let tangents = compute_tangents(&mesh.positions, &mesh.normals, &[], &mesh.triangles);
        assert_eq!(tangents.len(), 4);
        assert!(tangents.iter().all(|&t| t == Vec4::new(1.0, 0.0, 0.0, -1.0)));
    }
}
