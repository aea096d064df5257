//! Spatial partitioning module
//!
//! Dynamic AABB trees, spatial partitions (static + dynamic tree per
//! region) and the World that routes objects between partitions and fans
//! queries out to them.

mod aabb;
mod bounding_volume_tree;
mod query_volume;
mod spatial_object;
mod partition;
mod world;
mod mock_spatial_object;

pub use aabb::{BoundingVolume, AABB, DAABB};
pub use bounding_volume_tree::{BoundingVolumeTree, TreeSnapshot, VolumeNodeKey};
pub use query_volume::{QueryVolume, Ray, Sphere};
pub use spatial_object::{
    is_infinite, LocationCell, PartitionId, Placement, SpatialEvent, SpatialObject,
};
pub use partition::{PartitionConfig, SpatialPartition};
pub use world::{World, WorldState};
pub use mock_spatial_object::{MockSpatialObject, RecordedEvent};
