/// World - every spatial partition of a scene plus its unbounded objects.
///
/// Bounded objects are routed to the partition whose bounds center is
/// nearest to theirs. Objects with `AABB::INFINITE` bounds (sky, global
/// lights) bypass the trees and are reported by every query.
///
/// The whole state sits behind one reader/writer lock: queries take the
/// read side, structural changes the write side.

use std::ops::ControlFlow;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use crate::camera::Frustum;
use crate::error::{log_and_return_error, Error, Result};
use super::aabb::AABB;
use super::partition::SpatialPartition;
use super::query_volume::QueryVolume;
use super::spatial_object::{deliver_event, is_infinite, PartitionId, SpatialEvent, SpatialObject};

const LOG_SOURCE: &str = "galaxy3d::World";

// ===== WORLD =====

/// Thread-safe handle around a `WorldState`.
///
/// Share it as `Arc<World>`; hold a guard only for the duration of one
/// query or one batch of edits.
#[derive(Default)]
pub struct World {
    state: RwLock<WorldState>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the shared side of the world lock.
    ///
    /// # Errors
    ///
    /// Returns `Error::LockPoisoned` if a writer panicked while holding it.
    pub fn lock_for_reading(&self) -> Result<RwLockReadGuard<'_, WorldState>> {
        self.state.read().map_err(|_| {
            log_and_return_error(LOG_SOURCE, Error::LockPoisoned("World lock poisoned".to_string()))
        })
    }

    /// Acquire the exclusive side of the world lock.
    ///
    /// # Errors
    ///
    /// Returns `Error::LockPoisoned` if a writer panicked while holding it.
    pub fn lock_for_writing(&self) -> Result<RwLockWriteGuard<'_, WorldState>> {
        self.state.write().map_err(|_| {
            log_and_return_error(LOG_SOURCE, Error::LockPoisoned("World lock poisoned".to_string()))
        })
    }
}

// ===== WORLD STATE =====

/// Partitions and infinite objects, reached through a `World` guard.
#[derive(Default)]
pub struct WorldState {
    partitions: Vec<SpatialPartition>,
    /// Reverse lookup: partition id → index in `partitions`
    partition_index: FxHashMap<PartitionId, usize>,
    infinite_objects: Vec<Arc<dyn SpatialObject>>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- partitions -----

    /// Take ownership of `partition`; returns its id.
    pub fn add_partition(&mut self, partition: SpatialPartition) -> PartitionId {
        let id = partition.id();
        debug_assert!(!self.partition_index.contains_key(&id), "{} added twice", id);

        crate::engine_debug!(
            LOG_SOURCE,
            "Added partition '{}' ({}, {} objects)",
            partition.name(),
            id,
            partition.len()
        );

        self.partition_index.insert(id, self.partitions.len());
        self.partitions.push(partition);
        id
    }

    /// Detach a partition (swap-and-pop) and hand it back with its objects.
    ///
    /// The last partition takes the removed one's slot, so storage order is
    /// not preserved.
    pub fn remove_partition(&mut self, id: PartitionId) -> Option<SpatialPartition> {
        let index = self.partition_index.remove(&id)?;
        let partition = self.partitions.swap_remove(index);
        if let Some(moved) = self.partitions.get(index) {
            self.partition_index.insert(moved.id(), index);
        }

        crate::engine_debug!(
            LOG_SOURCE,
            "Removed partition '{}' ({})",
            partition.name(),
            id
        );
        Some(partition)
    }

    pub fn has_partition(&self, id: PartitionId) -> bool {
        self.partition_index.contains_key(&id)
    }

    pub fn partition(&self, id: PartitionId) -> Option<&SpatialPartition> {
        self.partition_index.get(&id).map(|&index| &self.partitions[index])
    }

    pub fn partition_mut(&mut self, id: PartitionId) -> Option<&mut SpatialPartition> {
        self.partition_index.get(&id).map(|&index| &mut self.partitions[index])
    }

    /// Partitions in storage order.
    pub fn partitions(&self) -> &[SpatialPartition] {
        &self.partitions
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    // ----- infinite objects -----

    /// Append to the unbounded list. No events; `add` is the usual entry.
    pub fn add_infinite_object(&mut self, object: Arc<dyn SpatialObject>) {
        debug_assert!(
            !self.has_infinite_object(object.as_ref()),
            "infinite object added twice"
        );
        self.infinite_objects.push(object);
    }

    /// Swap-and-pop `object` out of the unbounded list.
    pub fn remove_infinite_object(&mut self, object: &dyn SpatialObject) -> bool {
        match self.infinite_position(object) {
            Some(index) => {
                self.infinite_objects.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_infinite_object(&self, object: &dyn SpatialObject) -> bool {
        self.infinite_position(object).is_some()
    }

    pub fn infinite_objects(&self) -> &[Arc<dyn SpatialObject>] {
        &self.infinite_objects
    }

    // ----- objects -----

    /// Track `object`: unbounded objects join the infinite list, bounded
    /// ones the nearest partition's static or dynamic tree.
    ///
    /// A bounded object needs at least one partition.
    pub fn add(&mut self, object: Arc<dyn SpatialObject>) {
        if is_infinite(object.as_ref()) {
            self.add_infinite_object(Arc::clone(&object));
        } else {
            let bounds = object.bounds();
            debug_assert!(
                !self.partitions.is_empty(),
                "World::add: no partition can hold an object bounded by {:?}",
                bounds
            );
            let Some(index) = self.nearest_partition(&bounds) else {
                crate::engine_error!(
                    LOG_SOURCE,
                    "No partition to hold object bounded by {:?}; object left untracked",
                    bounds
                );
                return;
            };
            let dynamic = object.is_dynamic();
            self.partitions[index].add(Arc::clone(&object), dynamic);
        }

        deliver_event(object.as_ref(), &SpatialEvent::EnteredWorld);
    }

    /// Refit `object` in its partition after it moved.
    ///
    /// Objects whose bounds are `AABB::INFINITE` are never refit and report
    /// `true`, even while still placed in a partition; objects this world
    /// does not track report `false`.
    pub fn update(&mut self, object: &dyn SpatialObject) -> bool {
        if is_infinite(object) {
            return true;
        }
        match self.owning_partition(object) {
            Some(index) => self.partitions[index].update(object),
            None => false,
        }
    }

    /// Stop tracking `object`. Returns `false` if this world did not track it.
    pub fn remove(&mut self, object: &dyn SpatialObject) -> bool {
        let removed = match self.owning_partition(object) {
            Some(index) => self.partitions[index].remove(object),
            None => self.remove_infinite_object(object),
        };
        if removed {
            deliver_event(object, &SpatialEvent::LeftWorld);
        }
        removed
    }

    // ----- queries -----

    /// Visit every object intersecting `query`.
    ///
    /// Infinite objects come first, then partitions in storage order.
    /// Partitions whose bounds miss the query are skipped as a whole.
    pub fn visit<F>(&self, query: &QueryVolume, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(&Arc<dyn SpatialObject>) -> ControlFlow<()>,
    {
        for object in &self.infinite_objects {
            if visitor(object).is_break() {
                return ControlFlow::Break(());
            }
        }

        for partition in &self.partitions {
            if !query.intersects_aabb(&partition.bounds()) {
                continue;
            }
            if partition.visit(query, &mut visitor).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Frustum culling shortcut for `visit`.
    pub fn visit_visible<F>(&self, frustum: &Frustum, visitor: F) -> ControlFlow<()>
    where
        F: FnMut(&Arc<dyn SpatialObject>) -> ControlFlow<()>,
    {
        self.visit(&QueryVolume::Frustum(*frustum), visitor)
    }

    /// Merge of all partition bounds. Infinite objects are not included.
    pub fn bounds(&self) -> AABB {
        self.partitions
            .iter()
            .fold(AABB::EMPTY, |acc, partition| acc.merge(&partition.bounds()))
    }

    /// Objects in all partitions plus infinite objects.
    pub fn object_count(&self) -> usize {
        self.partitions.iter().map(SpatialPartition::len).sum::<usize>() + self.infinite_objects.len()
    }

    /// Detach every object; partitions stay registered.
    pub fn clear(&mut self) {
        let mut detached: Vec<Arc<dyn SpatialObject>> = Vec::with_capacity(self.object_count());

        for partition in &mut self.partitions {
            detached.extend(partition.objects().cloned());
            partition.clear();
        }
        detached.append(&mut self.infinite_objects);

        for object in &detached {
            deliver_event(object.as_ref(), &SpatialEvent::LeftWorld);
        }

        crate::engine_debug!(
            LOG_SOURCE,
            "World cleared ({} objects detached, {} partitions kept)",
            detached.len(),
            self.partitions.len()
        );
    }

    // ===== INTERNAL =====

    /// Partition with the smallest center distance to `bounds`.
    /// Empty partitions are infinitely far; ties go to the first one.
    fn nearest_partition(&self, bounds: &AABB) -> Option<usize> {
        self.partitions
            .iter()
            .map(|partition| {
                let partition_bounds = partition.bounds();
                if partition_bounds.is_empty() {
                    f32::INFINITY
                } else {
                    partition_bounds.proximity(bounds)
                }
            })
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
    }

    fn owning_partition(&self, object: &dyn SpatialObject) -> Option<usize> {
        let id = object.location().partition()?;
        self.partition_index.get(&id).copied()
    }

    fn infinite_position(&self, object: &dyn SpatialObject) -> Option<usize> {
        self.infinite_objects
            .iter()
            .position(|candidate| {
                std::ptr::addr_eq(Arc::as_ptr(candidate), object as *const dyn SpatialObject)
            })
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
