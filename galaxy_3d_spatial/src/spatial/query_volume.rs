//! Query volumes accepted by `SpatialPartition::visit` and `World::visit`.
//!
//! `QueryVolume` is a closed set; a single `match` picks the box test used
//! at every tree node and partition.

use glam::Vec3;
use crate::camera::Frustum;
use super::aabb::AABB;

/// Half-line (or segment when `max_distance` is finite) for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Not required to be normalized; `max_distance` is in units of its length.
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Unbounded ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction, max_distance: f32::INFINITY }
    }

    /// Segment from `start` to `end`.
    pub fn segment(start: Vec3, end: Vec3) -> Self {
        Self { origin: start, direction: end - start, max_distance: 1.0 }
    }

    /// Entry parameter of the ray into `aabb`, if it hits within `max_distance`.
    ///
    /// Slab test. Axes with a zero direction component only check that the
    /// origin lies within the slab.
    pub fn hit_distance(&self, aabb: &AABB) -> Option<f32> {
        if aabb.is_empty() {
            return None;
        }

        let mut t_enter = 0.0_f32;
        let mut t_exit = self.max_distance;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (min, max) = (aabb.min[axis], aabb.max[axis]);

            if direction == 0.0 {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let mut t0 = (min - origin) * inv;
            let mut t1 = (max - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some(t_enter)
    }

    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.hit_distance(aabb).is_some()
    }
}

/// Solid sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Closest-point test: the point of `aabb` nearest to the center must lie within the radius.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_empty() {
            return false;
        }
        let closest = self.center.clamp(aabb.min, aabb.max);
        closest.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// Shape of a spatial query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryVolume {
    Ray(Ray),
    Sphere(Sphere),
    Aabb(AABB),
    Frustum(Frustum),
}

impl QueryVolume {
    /// Whether a node or partition with bounds `aabb` may contain matches.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        match self {
            QueryVolume::Ray(ray) => ray.intersects_aabb(aabb),
            QueryVolume::Sphere(sphere) => sphere.intersects_aabb(aabb),
            QueryVolume::Aabb(query) => query.intersects(aabb),
            QueryVolume::Frustum(frustum) => frustum.intersects_aabb(aabb),
        }
    }
}

impl From<Ray> for QueryVolume {
    fn from(ray: Ray) -> Self {
        QueryVolume::Ray(ray)
    }
}

impl From<Sphere> for QueryVolume {
    fn from(sphere: Sphere) -> Self {
        QueryVolume::Sphere(sphere)
    }
}

impl From<AABB> for QueryVolume {
    fn from(aabb: AABB) -> Self {
        QueryVolume::Aabb(aabb)
    }
}

impl From<Frustum> for QueryVolume {
    fn from(frustum: Frustum) -> Self {
        QueryVolume::Frustum(frustum)
    }
}

#[cfg(test)]
#[path = "query_volume_tests.rs"]
mod tests;
