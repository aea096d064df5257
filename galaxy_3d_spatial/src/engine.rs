/// Galaxy3D Engine - context object owning the spatial World
///
/// There is no global world: the Engine is created once by the application
/// and hands `Arc<World>` to every subsystem that needs spatial queries
/// (renderer culling, physics broad-phase, gameplay picking).

use std::sync::Arc;
use crate::error::{log_and_return_error, Error, Result};
use crate::log::{self, LogSeverity};
use crate::spatial::{PartitionConfig, SpatialPartition, World};

const LOG_SOURCE: &str = "galaxy3d::Engine";

// ===== CONFIG =====

/// Engine-wide settings, validated by `Engine::new`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Minimum severity forwarded to the active logger.
    ///
    /// Process-wide: every `Engine::new` overwrites it, so the most recently
    /// created engine's level applies to all of them.
    pub log_level: LogSeverity,
    /// Fat margin applied to dynamic leaves of partitions created through
    /// `Engine::create_partition` (0.0 = reinsert on every update)
    pub dynamic_margin: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: LogSeverity::Info,
            dynamic_margin: 0.0,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if !self.dynamic_margin.is_finite() || self.dynamic_margin < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "dynamic_margin must be finite and >= 0 (got {})",
                self.dynamic_margin
            )));
        }
        Ok(())
    }
}

// ===== ENGINE =====

/// Engine context
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use galaxy_3d_spatial::galaxy3d::{Engine, EngineConfig};
/// use galaxy_3d_spatial::galaxy3d::spatial::MockSpatialObject;
/// use galaxy_3d_spatial::glam::Vec3;
///
/// let engine = Engine::new(EngineConfig::default())?;
/// let world = engine.world();
/// {
///     let mut state = world.lock_for_writing()?;
///     state.add_partition(engine.create_partition("level"));
///     state.add(Arc::new(MockSpatialObject::unit_cube("crate", Vec3::ZERO, false)));
/// }
/// engine.shutdown()?;
/// # Ok::<(), galaxy_3d_spatial::galaxy3d::Error>(())
/// ```
pub struct Engine {
    config: EngineConfig,
    world: Arc<World>,
}

impl Engine {
    /// Validate `config`, apply its log level and create an empty World.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for a negative or non-finite margin.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|error| log_and_return_error(LOG_SOURCE, error))?;

        log::set_min_severity(config.log_level);
        crate::engine_info!(
            LOG_SOURCE,
            "Engine created (log level {:?}, dynamic margin {})",
            config.log_level,
            config.dynamic_margin
        );

        Ok(Self {
            config,
            world: Arc::new(World::new()),
        })
    }

    /// Shared handle to the World.
    pub fn world(&self) -> Arc<World> {
        Arc::clone(&self.world)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// New partition using the engine's dynamic margin. Register it with
    /// `WorldState::add_partition`.
    pub fn create_partition(&self, name: impl Into<String>) -> SpatialPartition {
        SpatialPartition::with_config(
            name,
            PartitionConfig {
                dynamic_margin: self.config.dynamic_margin,
            },
        )
    }

    /// Detach every object from the World.
    ///
    /// Other `Arc<World>` holders keep a valid, empty world.
    ///
    /// # Errors
    ///
    /// Returns `Error::LockPoisoned` if the world lock is poisoned.
    pub fn shutdown(self) -> Result<()> {
        let mut state = self.world.lock_for_writing()?;
        let detached = state.object_count();
        state.clear();
        drop(state);

        crate::engine_info!(
            LOG_SOURCE,
            "Engine shut down ({} objects detached)",
            detached
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
