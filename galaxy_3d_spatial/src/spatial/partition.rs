/// SpatialPartition - one region of space indexed by two AABB trees.
///
/// Objects that move often go to the dynamic tree, the rest to the static
/// tree, so frame-to-frame refits never disturb the static hierarchy.
/// The partition keeps the merge of both roots as its cached bounds; the
/// World uses them to route new objects and to skip whole partitions
/// during queries.

use std::ops::ControlFlow;
use std::sync::Arc;
use super::aabb::AABB;
use super::bounding_volume_tree::BoundingVolumeTree;
use super::query_volume::QueryVolume;
use super::spatial_object::{
    deliver_event, PartitionId, Placement, SpatialEvent, SpatialObject,
};

/// Tuning for a SpatialPartition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionConfig {
    /// Inflation applied to dynamic leaves. With a margin, `update` only
    /// reinserts an object once its bounds escape the inflated leaf.
    /// 0.0 (default) reinserts on every update.
    pub dynamic_margin: f32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self { dynamic_margin: 0.0 }
    }
}

/// A bounded region of the world with a static and a dynamic tree.
pub struct SpatialPartition {
    id: PartitionId,
    name: String,
    config: PartitionConfig,
    static_tree: BoundingVolumeTree<Arc<dyn SpatialObject>>,
    dynamic_tree: BoundingVolumeTree<Arc<dyn SpatialObject>>,
    /// Merge of both tree bounds (EMPTY when both are empty)
    bounds: AABB,
}

impl SpatialPartition {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, PartitionConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: PartitionConfig) -> Self {
        Self {
            id: PartitionId::next(),
            name: name.into(),
            config,
            static_tree: BoundingVolumeTree::new(),
            dynamic_tree: BoundingVolumeTree::new(),
            bounds: AABB::EMPTY,
        }
    }

    pub fn id(&self) -> PartitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Cached aggregate of both trees.
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    /// Number of objects in both trees.
    pub fn len(&self) -> usize {
        self.static_tree.len() + self.dynamic_tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.static_tree.is_empty() && self.dynamic_tree.is_empty()
    }

    /// Whether `object` is currently placed in this partition.
    pub fn contains(&self, object: &dyn SpatialObject) -> bool {
        object.location().partition() == Some(self.id)
    }

    /// Index `object` in the static or dynamic tree.
    ///
    /// The object must not be placed anywhere else. `EnteredPartition` is
    /// delivered once the object is queryable.
    pub fn add(&mut self, object: Arc<dyn SpatialObject>, dynamic: bool) {
        debug_assert!(
            object.location().get().is_none(),
            "object is already placed in {:?}",
            object.location().partition()
        );

        let leaf = if dynamic {
            let volume = object.bounds().inflate(self.config.dynamic_margin);
            self.dynamic_tree.insert(volume, Arc::clone(&object))
        } else {
            self.static_tree.insert(object.bounds(), Arc::clone(&object))
        };
        object.location().set(Placement::new(self.id, leaf, dynamic));
        self.refresh_bounds();

        crate::engine_trace!(
            "galaxy3d::SpatialPartition",
            "'{}' added {} object ({} total)",
            self.name,
            if dynamic { "dynamic" } else { "static" },
            self.len()
        );

        deliver_event(object.as_ref(), &SpatialEvent::EnteredPartition(self.id));
    }

    /// Remove `object` if it lives here.
    ///
    /// Returns `false` when the object is placed elsewhere or nowhere.
    /// `LeftPartition` is delivered after the object left the tree.
    pub fn remove(&mut self, object: &dyn SpatialObject) -> bool {
        let Some(placement) = self.placement_of(object) else {
            return false;
        };

        let removed = self.tree_mut(placement.is_dynamic()).remove(placement.leaf());
        debug_assert!(removed.is_some(), "placement points at a missing leaf");
        object.location().take();
        self.refresh_bounds();

        crate::engine_trace!(
            "galaxy3d::SpatialPartition",
            "'{}' removed object ({} left)",
            self.name,
            self.len()
        );

        deliver_event(object, &SpatialEvent::LeftPartition(self.id));
        true
    }

    /// Refit `object` after it moved.
    ///
    /// Asks the object to recompute its bounds, then moves its leaf.
    /// Returns `false` if the object does not live here.
    pub fn update(&mut self, object: &dyn SpatialObject) -> bool {
        let Some(placement) = self.placement_of(object) else {
            return false;
        };

        object.refit();
        let volume = object.bounds();
        let margin = self.config.dynamic_margin;

        if placement.is_dynamic() && margin > 0.0 {
            self.dynamic_tree.refit(placement.leaf(), volume, margin);
        } else {
            self.tree_mut(placement.is_dynamic()).update(placement.leaf(), volume);
        }
        self.refresh_bounds();
        true
    }

    /// Visit every object whose leaf intersects `query`, static tree first.
    pub fn visit<F>(&self, query: &QueryVolume, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(&Arc<dyn SpatialObject>) -> ControlFlow<()>,
    {
        let test = |volume: &AABB| query.intersects_aabb(volume);

        if self.static_tree.for_each_leaf_where(test, &mut visitor).is_break() {
            return ControlFlow::Break(());
        }
        self.dynamic_tree.for_each_leaf_where(test, &mut visitor)
    }

    /// All objects, static tree first.
    pub fn objects(&self) -> impl Iterator<Item = &Arc<dyn SpatialObject>> + '_ {
        self.static_tree
            .leaves()
            .chain(self.dynamic_tree.leaves())
            .map(|(_, _, object)| object)
    }

    /// Detach every object, delivering `LeftPartition` to each.
    pub fn clear(&mut self) {
        let objects: Vec<Arc<dyn SpatialObject>> = self.objects().cloned().collect();
        self.static_tree.clear();
        self.dynamic_tree.clear();
        self.bounds = AABB::EMPTY;

        for object in &objects {
            object.location().take();
        }
        for object in &objects {
            deliver_event(object.as_ref(), &SpatialEvent::LeftPartition(self.id));
        }

        crate::engine_debug!(
            "galaxy3d::SpatialPartition",
            "'{}' cleared ({} objects detached)",
            self.name,
            objects.len()
        );
    }

    // ===== INTERNAL =====

    fn placement_of(&self, object: &dyn SpatialObject) -> Option<Placement> {
        object
            .location()
            .get()
            .filter(|placement| placement.partition() == self.id)
    }

    fn tree_mut(&mut self, dynamic: bool) -> &mut BoundingVolumeTree<Arc<dyn SpatialObject>> {
        if dynamic { &mut self.dynamic_tree } else { &mut self.static_tree }
    }

    fn refresh_bounds(&mut self) {
        self.bounds = self.static_tree.bounds().merge(&self.dynamic_tree.bounds());
    }
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
