/// Contract between the spatial index and scene-graph objects.
///
/// The scene graph is opaque to this crate: anything that can report a
/// world-space box, recompute it on demand and carry a `LocationCell` can
/// be indexed. Objects are shared (`Arc<dyn SpatialObject>`) because the
/// renderer, physics and the trees all alias them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use super::aabb::AABB;
use super::bounding_volume_tree::VolumeNodeKey;

// ===== PARTITION ID =====

/// Process-unique identity of a `SpatialPartition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(u64);

impl PartitionId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        PartitionId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition#{}", self.0)
    }
}

// ===== PLACEMENT =====

/// Where an object currently lives: partition, tree leaf, and which tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    partition: PartitionId,
    leaf: VolumeNodeKey,
    dynamic: bool,
}

impl Placement {
    pub(crate) fn new(partition: PartitionId, leaf: VolumeNodeKey, dynamic: bool) -> Self {
        Self { partition, leaf, dynamic }
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    pub fn leaf(&self) -> VolumeNodeKey {
        self.leaf
    }

    /// Whether the leaf lives in the dynamic tree.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

/// Per-object slot holding its `Placement`.
///
/// Written only by `SpatialPartition` (under the World's write lock when
/// used through a World); readable by anyone.
#[derive(Debug, Default)]
pub struct LocationCell {
    placement: Mutex<Option<Placement>>,
}

impl LocationCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Placement> {
        *self.placement.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Partition currently holding the object, if any.
    pub fn partition(&self) -> Option<PartitionId> {
        self.get().map(|placement| placement.partition)
    }

    pub(crate) fn set(&self, placement: Placement) {
        *self.placement.lock().unwrap_or_else(PoisonError::into_inner) = Some(placement);
    }

    pub(crate) fn take(&self) -> Option<Placement> {
        self.placement.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

// ===== EVENTS =====

/// Notification delivered to an object and its whole sub-hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialEvent {
    /// Inserted into the partition's tree; already queryable.
    EnteredPartition(PartitionId),
    /// Removed from the partition's tree; no longer queryable.
    LeftPartition(PartitionId),
    /// Now tracked by a World (in a partition or as an infinite object).
    EnteredWorld,
    /// No longer tracked by the World.
    LeftWorld,
}

// ===== SPATIAL OBJECT =====

/// An object that can be indexed by partitions and worlds.
pub trait SpatialObject: Send + Sync {
    /// Current world-space bounds. `AABB::INFINITE` marks an unbounded object.
    fn bounds(&self) -> AABB;

    /// Expected to move often (goes to the dynamic tree).
    fn is_dynamic(&self) -> bool;

    /// Recompute transforms and bounds before the index reads `bounds()`.
    fn refit(&self) {}

    /// Slot for the index's back-reference.
    fn location(&self) -> &LocationCell;

    /// Sub-hierarchy that receives events along with this object.
    fn children(&self) -> &[Arc<dyn SpatialObject>] {
        &[]
    }

    /// Event hook (attach physics, notify listeners, ...).
    fn on_spatial_event(&self, _event: &SpatialEvent) {}
}

/// Whether the object bypasses the trees and is visited by every query.
pub fn is_infinite(object: &dyn SpatialObject) -> bool {
    object.bounds() == AABB::INFINITE
}

/// Deliver `event` to `object`, then depth-first to its descendants.
pub(crate) fn deliver_event(object: &dyn SpatialObject, event: &SpatialEvent) {
    object.on_spatial_event(event);
    for child in object.children() {
        deliver_event(child.as_ref(), event);
    }
}
