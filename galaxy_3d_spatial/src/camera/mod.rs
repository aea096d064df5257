//! Camera module - culling volumes derived from a camera.
//!
//! The spatial subsystem does not own cameras; callers build a `Frustum`
//! from their view-projection matrix and hand it to `World::visit_visible`.

mod frustum;

pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
