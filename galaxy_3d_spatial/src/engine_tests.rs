//! Unit tests for the Engine context
//!
//! Engine::new writes the global log level, so every test here is #[serial].

use crate::galaxy3d::{Engine, EngineConfig, Error};
use crate::galaxy3d::log::{self, Logger, LogEntry, LogSeverity};
use crate::spatial::{MockSpatialObject, SpatialEvent, SpatialObject};
use glam::Vec3;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that keeps Engine entries only
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == "galaxy3d::Engine" {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

fn teardown() {
    log::reset_logger();
    log::set_min_severity(LogSeverity::Info);
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_default_config() {
    let config = EngineConfig::default();
    assert_eq!(config.log_level, LogSeverity::Info);
    assert_eq!(config.dynamic_margin, 0.0);
}

#[test]
#[serial]
fn test_engine_new_with_default_config() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    assert_eq!(engine.config(), &EngineConfig::default());

    let world = engine.world();
    let state = world.lock_for_reading().unwrap();
    assert_eq!(state.partition_count(), 0);
    assert_eq!(state.object_count(), 0);
    teardown();
}

#[test]
#[serial]
fn test_engine_rejects_invalid_margins() {
    for margin in [-0.5, f32::NAN, f32::INFINITY] {
        let config = EngineConfig { dynamic_margin: margin, ..EngineConfig::default() };
        match Engine::new(config) {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("dynamic_margin")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("margin {} should be rejected", margin),
        }
    }
    teardown();
}

#[test]
#[serial]
fn test_engine_logs_config_errors() {
    let (logger, entries) = TestLogger::new();
    log::set_logger(logger);

    let config = EngineConfig { dynamic_margin: -1.0, ..EngineConfig::default() };
    assert!(Engine::new(config).is_err());

    let entries = entries.lock().unwrap();
    let errors: Vec<&LogEntry> = entries.iter().filter(|e| e.severity == LogSeverity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Invalid configuration"));
    assert!(errors[0].file.is_some());
    drop(entries);
    teardown();
}

#[test]
#[serial]
fn test_engine_applies_log_level() {
    let (logger, entries) = TestLogger::new();
    log::set_logger(logger);

    let engine = Engine::new(EngineConfig { log_level: LogSeverity::Warn, ..EngineConfig::default() }).unwrap();
    assert_eq!(log::min_severity(), LogSeverity::Warn);

    // The "Engine created" info line is filtered out at Warn
    assert!(entries.lock().unwrap().is_empty());

    engine.shutdown().unwrap();
    assert!(entries.lock().unwrap().is_empty());
    teardown();
}

#[test]
#[serial]
fn test_log_level_is_shared_by_all_engines() {
    let first = Engine::new(EngineConfig { log_level: LogSeverity::Error, ..EngineConfig::default() }).unwrap();
    assert_eq!(log::min_severity(), LogSeverity::Error);

    let second = Engine::new(EngineConfig { log_level: LogSeverity::Debug, ..EngineConfig::default() }).unwrap();
    assert_eq!(log::min_severity(), LogSeverity::Debug);
    assert_eq!(first.config().log_level, LogSeverity::Error);

    first.shutdown().unwrap();
    second.shutdown().unwrap();
    teardown();
}

#[test]
#[serial]
fn test_engine_logs_lifecycle_at_info() {
    let (logger, entries) = TestLogger::new();
    log::set_logger(logger);

    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.shutdown().unwrap();

    let messages: Vec<String> = entries.lock().unwrap().iter().map(|e| e.message.clone()).collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("Engine created"));
    assert!(messages[1].starts_with("Engine shut down"));
    teardown();
}

// ============================================================================
// WORLD AND PARTITIONS
// ============================================================================

#[test]
#[serial]
fn test_world_handle_is_shared() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let a = engine.world();
    let b = engine.world();
    assert!(Arc::ptr_eq(&a, &b));

    a.lock_for_writing().unwrap().add_partition(engine.create_partition("level"));
    assert_eq!(b.lock_for_reading().unwrap().partition_count(), 1);
    teardown();
}

#[test]
#[serial]
fn test_create_partition_uses_engine_margin() {
    let engine = Engine::new(EngineConfig { dynamic_margin: 0.25, ..EngineConfig::default() }).unwrap();
    let partition = engine.create_partition("fat");

    assert_eq!(partition.name(), "fat");
    assert_eq!(partition.config().dynamic_margin, 0.25);
    teardown();
}

#[test]
#[serial]
fn test_shutdown_detaches_objects_for_other_holders() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let world = engine.world();
    let object = Arc::new(MockSpatialObject::unit_cube("crate", Vec3::ZERO, true));
    let sky = Arc::new(MockSpatialObject::infinite("sky"));
    {
        let mut state = world.lock_for_writing().unwrap();
        state.add_partition(engine.create_partition("level"));
        state.add(object.clone());
        state.add(sky.clone());
    }

    engine.shutdown().unwrap();

    let state = world.lock_for_reading().unwrap();
    assert_eq!(state.object_count(), 0);
    assert_eq!(state.partition_count(), 1);
    assert!(object.location().get().is_none());
    assert_eq!(object.events().last(), Some(&(SpatialEvent::LeftWorld, false)));
    assert_eq!(sky.events().last(), Some(&(SpatialEvent::LeftWorld, false)));
    teardown();
}

#[test]
#[serial]
fn test_shutdown_with_poisoned_world_fails() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let world = engine.world();
    let _ = std::thread::spawn(move || {
        let _guard = world.lock_for_writing().unwrap();
        panic!("poison the world lock");
    })
    .join();

    assert!(matches!(engine.shutdown(), Err(Error::LockPoisoned(_))));
    teardown();
}
