/// Mock scene object for testing the spatial index without a scene graph.
///
/// Holds local-space bounds and a world transform; `refit` recomputes the
/// world bounds from them the way a scene-graph node would. Every event it
/// receives is recorded together with whether the object was placed in a
/// partition at that moment.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use glam::{Mat4, Vec3};
use super::aabb::AABB;
use super::spatial_object::{LocationCell, SpatialEvent, SpatialObject};

/// Recorded event: (event, object had a placement when it arrived)
pub type RecordedEvent = (SpatialEvent, bool);

pub struct MockSpatialObject {
    name: String,
    dynamic: bool,
    local_bounds: AABB,
    transform: Mutex<Mat4>,
    world_bounds: Mutex<AABB>,
    refit_count: AtomicUsize,
    location: LocationCell,
    children: Vec<Arc<dyn SpatialObject>>,
    events: Mutex<Vec<RecordedEvent>>,
}

impl MockSpatialObject {
    /// Object whose world bounds are `bounds` (identity transform).
    pub fn new(name: &str, bounds: AABB, dynamic: bool) -> Self {
        Self {
            name: name.to_string(),
            dynamic,
            local_bounds: bounds,
            transform: Mutex::new(Mat4::IDENTITY),
            world_bounds: Mutex::new(bounds),
            refit_count: AtomicUsize::new(0),
            location: LocationCell::new(),
            children: Vec::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Unit cube with its min corner at `min`.
    pub fn unit_cube(name: &str, min: Vec3, dynamic: bool) -> Self {
        Self::new(name, AABB::new(min, min + Vec3::ONE), dynamic)
    }

    /// Unbounded object (sky, global light, ...).
    pub fn infinite(name: &str) -> Self {
        Self::new(name, AABB::INFINITE, false)
    }

    pub fn with_children(mut self, children: Vec<Arc<dyn SpatialObject>>) -> Self {
        self.children = children;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the world transform; takes effect at the next `refit`.
    pub fn set_transform(&self, transform: Mat4) {
        *self.transform.lock().unwrap_or_else(PoisonError::into_inner) = transform;
    }

    /// Shortcut for a pure translation.
    pub fn move_to(&self, translation: Vec3) {
        self.set_transform(Mat4::from_translation(translation));
    }

    /// Overwrite the world bounds directly, bypassing `refit`.
    pub fn set_bounds(&self, bounds: AABB) {
        *self.world_bounds.lock().unwrap_or_else(PoisonError::into_inner) = bounds;
    }

    pub fn refit_count(&self) -> usize {
        self.refit_count.load(Ordering::Relaxed)
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl SpatialObject for MockSpatialObject {
    fn bounds(&self) -> AABB {
        *self.world_bounds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    fn refit(&self) {
        self.refit_count.fetch_add(1, Ordering::Relaxed);
        if self.local_bounds == AABB::INFINITE {
            return;
        }
        let transform = *self.transform.lock().unwrap_or_else(PoisonError::into_inner);
        *self.world_bounds.lock().unwrap_or_else(PoisonError::into_inner) =
            self.local_bounds.transformed(&transform);
    }

    fn location(&self) -> &LocationCell {
        &self.location
    }

    fn children(&self) -> &[Arc<dyn SpatialObject>] {
        &self.children
    }

    fn on_spatial_event(&self, event: &SpatialEvent) {
        let placed = self.location.get().is_some();
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((*event, placed));
    }
}
