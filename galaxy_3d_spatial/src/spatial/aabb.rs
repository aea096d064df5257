/// Axis-aligned bounding boxes and the volume abstraction the BVH is built on.
///
/// `AABB` (f32) is the engine-wide box used by partitions, the World and the
/// query volumes. `DAABB` (f64) exists for large-coordinate worlds that
/// keep their own `BoundingVolumeTree<T, DAABB>`.
///
/// Two sentinels matter:
/// - `EMPTY` (min = +inf, max = -inf): identity of `merge`, intersects nothing
/// - `INFINITE` (min = -inf, max = +inf): bounds of unbounded objects

use glam::{DMat4, DVec3, Mat4, Vec3};

/// Volume type stored in a `BoundingVolumeTree`.
pub trait BoundingVolume: Copy + PartialEq + std::fmt::Debug {
    /// Component type (f32 or f64)
    type Scalar: Copy + PartialOrd;

    /// The empty sentinel (identity element of `merge`).
    fn empty() -> Self;

    /// Smallest volume enclosing both.
    fn merge(&self, other: &Self) -> Self;

    /// `other` lies entirely within `self` (inclusive).
    fn contains(&self, other: &Self) -> bool;

    /// Inclusive overlap test; never true for an empty volume.
    fn intersects(&self, other: &Self) -> bool;

    /// Manhattan distance between centers, used to pick insertion siblings.
    fn proximity(&self, other: &Self) -> Self::Scalar;

    /// Grow by `margin` on every side.
    fn inflate(&self, margin: Self::Scalar) -> Self;
}

macro_rules! define_aabb {
    ($(#[$doc:meta])* $name:ident, $vec:ty, $mat:ty, $scalar:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            /// Minimum corner (x, y, z)
            pub min: $vec,
            /// Maximum corner (x, y, z)
            pub max: $vec,
        }

        impl $name {
            /// Inverted box: merge identity, intersects nothing.
            pub const EMPTY: $name = $name { min: <$vec>::INFINITY, max: <$vec>::NEG_INFINITY };

            /// Unbounded box, marks objects that are visited by every query.
            pub const INFINITE: $name = $name { min: <$vec>::NEG_INFINITY, max: <$vec>::INFINITY };

            pub fn new(min: $vec, max: $vec) -> Self {
                Self { min, max }
            }

            /// Box of half-size `half_extents` around `center`.
            pub fn from_center_half_extents(center: $vec, half_extents: $vec) -> Self {
                Self { min: center - half_extents, max: center + half_extents }
            }

            /// Whether any axis is inverted (min > max).
            pub fn is_empty(&self) -> bool {
                self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
            }

            pub fn center(&self) -> $vec {
                (self.min + self.max) * 0.5
            }

            pub fn extents(&self) -> $vec {
                self.max - self.min
            }

            /// Smallest box enclosing both. `EMPTY.merge(b) == b`.
            pub fn merge(&self, other: &$name) -> $name {
                $name { min: self.min.min(other.min), max: self.max.max(other.max) }
            }

            /// Test if this box fully contains another one.
            pub fn contains(&self, other: &$name) -> bool {
                self.min.x <= other.min.x && self.max.x >= other.max.x
                && self.min.y <= other.min.y && self.max.y >= other.max.y
                && self.min.z <= other.min.z && self.max.z >= other.max.z
            }

            /// Test if the two boxes overlap or touch.
            pub fn intersects(&self, other: &$name) -> bool {
                !self.is_empty() && !other.is_empty()
                && self.min.x <= other.max.x && self.max.x >= other.min.x
                && self.min.y <= other.max.y && self.max.y >= other.min.y
                && self.min.z <= other.max.z && self.max.z >= other.min.z
            }

            /// Sum of absolute per-axis differences between the two centers.
            pub fn proximity(&self, other: &$name) -> $scalar {
                (self.center() - other.center()).abs().element_sum()
            }

            pub fn inflate(&self, margin: $scalar) -> $name {
                $name { min: self.min - <$vec>::splat(margin), max: self.max + <$vec>::splat(margin) }
            }

            /// Transform this box by an affine matrix, returning the enclosing box.
            ///
            /// Arvo's method: projects each matrix axis onto the box extents
            /// for a tight result without transforming all 8 corners.
            pub fn transformed(&self, matrix: &$mat) -> $name {
                let translation = matrix.col(3).truncate();
                let mut new_min = translation;
                let mut new_max = translation;

                for i in 0..3 {
                    let axis = matrix.col(i).truncate();
                    let a = axis * self.min[i];
                    let b = axis * self.max[i];
                    new_min += a.min(b);
                    new_max += a.max(b);
                }

                $name { min: new_min, max: new_max }
            }
        }

        impl BoundingVolume for $name {
            type Scalar = $scalar;

            fn empty() -> Self {
                $name::EMPTY
            }

            fn merge(&self, other: &Self) -> Self {
                $name::merge(self, other)
            }

            fn contains(&self, other: &Self) -> bool {
                $name::contains(self, other)
            }

            fn intersects(&self, other: &Self) -> bool {
                $name::intersects(self, other)
            }

            fn proximity(&self, other: &Self) -> $scalar {
                $name::proximity(self, other)
            }

            fn inflate(&self, margin: $scalar) -> Self {
                $name::inflate(self, margin)
            }
        }
    };
}

define_aabb!(
    /// Axis-Aligned Bounding Box, single precision (world space)
    AABB, Vec3, Mat4, f32
);

define_aabb!(
    /// Axis-Aligned Bounding Box, double precision
    DAABB, DVec3, DMat4, f64
);

impl From<AABB> for DAABB {
    fn from(aabb: AABB) -> Self {
        DAABB { min: aabb.min.as_dvec3(), max: aabb.max.as_dvec3() }
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
