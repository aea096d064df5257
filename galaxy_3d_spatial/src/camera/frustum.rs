/// Frustum - six clipping planes for visibility queries.
///
/// Each plane is a Vec4 (A, B, C, D) where (A, B, C) is the inward-pointing
/// unit normal and D the signed offset. A point P is inside the frustum if
/// `dot(plane.xyz, P) + plane.w >= 0` for all six planes.
///
/// Used as one of the `QueryVolume` kinds: `World::visit_visible` culls
/// whole partitions and tree subtrees against it.

use glam::{Mat4, Vec3, Vec4};
use crate::spatial::AABB;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes: left, right, bottom, top, near, far.
///
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes, indexed by the PLANE_* constants
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb & Hartmann: each plane is a sum/difference of matrix rows,
    /// normalized so that (A, B, C) has unit length.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Build a frustum from explicit planes (normals pointing inward).
    pub fn from_planes(planes: [Vec4; 6]) -> Self {
        Self { planes }
    }

    /// Test if a point lies inside (or on) all six planes.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// "Positive vertex" test: for each plane, take the box corner furthest
    /// along the plane normal; if that corner is outside, the whole box is.
    /// Conservative: may report boxes near frustum corners as visible,
    /// never misses a visible one. Empty boxes never intersect.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_empty() {
            return false;
        }

        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let p_vertex = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            // 0 * inf terms (unbounded boxes) contribute nothing
            let terms = Vec3::select(normal.cmpeq(Vec3::ZERO), Vec3::ZERO, normal * p_vertex);
            terms.element_sum() + plane.w >= 0.0
        })
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
