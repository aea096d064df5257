/*!
# Galaxy 3D Spatial

Spatial partitioning for the Galaxy 3D engine.

Scene objects are indexed by their world-space bounding boxes in dynamic
AABB trees so that rendering and physics can run broad-phase queries
(ray casts, box, sphere and frustum culling) every frame.

## Architecture

- **BoundingVolumeTree**: dynamic binary AABB tree with stable leaf handles
- **SpatialPartition**: one region of space, with a static and a dynamic tree
- **World**: all partitions plus unbounded objects, behind one reader/writer lock
- **Engine**: context object owning the World, handed to subsystems explicitly

Scene-graph nodes plug in through the `SpatialObject` trait.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod spatial;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine context
    pub use crate::engine::{Engine, EngineConfig};

    // Logging sub-module (types and logger control, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, set_min_severity, min_severity,
        };
    }

    // Camera sub-module (culling volumes)
    pub mod camera {
        pub use crate::camera::*;
    }

    // Spatial sub-module
    pub mod spatial {
        pub use crate::spatial::*;
    }
}

// Re-export math library at crate root
pub use glam;

