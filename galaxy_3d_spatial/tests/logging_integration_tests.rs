//! Integration tests for the logging system
//!
//! The logger and the minimum severity are process-wide, so every test is
//! #[serial] and restores the defaults before returning.
//!
//! Run with: cargo test --test logging_integration_tests

use std::sync::{Arc, Mutex};
use galaxy_3d_spatial::galaxy3d::{Engine, EngineConfig};
use galaxy_3d_spatial::galaxy3d::log::{self, Logger, LogEntry, LogSeverity};
use galaxy_3d_spatial::galaxy3d::spatial::{MockSpatialObject, SpatialPartition, World};
use galaxy_3d_spatial::glam::Vec3;
use galaxy_3d_spatial::{engine_error, engine_info, engine_trace, engine_warn};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
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
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn restore_defaults() {
    log::reset_logger();
    log::set_min_severity(LogSeverity::Info);
}

fn sources(entries: &Arc<Mutex<Vec<LogEntry>>>) -> Vec<String> {
    entries.lock().unwrap().iter().map(|e| e.source.clone()).collect()
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger_receives_macros() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    engine_info!("test::module", "Test info message {}", 1);
    engine_warn!("test::module", "Test warning message");
    engine_error!("test::module", "Test error message");

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 3);

        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].message, "Test info message 1");
        assert_eq!(captured[0].file, None);

        assert_eq!(captured[1].severity, LogSeverity::Warn);

        assert_eq!(captured[2].severity, LogSeverity::Error);
        assert_eq!(captured[2].source, "test::module");
        assert!(captured[2].file.unwrap().ends_with("logging_integration_tests.rs"));
        assert!(captured[2].line.is_some());
    }

    restore_defaults();
}

#[test]
#[serial]
fn test_integration_trace_level_reports_tree_activity() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);
    log::set_min_severity(LogSeverity::Trace);

    let mut partition = SpatialPartition::new("traced");
    let object = Arc::new(MockSpatialObject::unit_cube("a", Vec3::ZERO, false));
    partition.add(object.clone(), false);
    partition.remove(object.as_ref());
    engine_trace!("test::module", "done");

    let seen = sources(&entries);
    assert_eq!(
        seen,
        vec![
            "galaxy3d::SpatialPartition".to_string(),
            "galaxy3d::SpatialPartition".to_string(),
            "test::module".to_string(),
        ]
    );

    restore_defaults();
}

#[test]
#[serial]
fn test_integration_info_level_hides_tree_activity() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);
    log::set_min_severity(LogSeverity::Info);

    let mut partition = SpatialPartition::new("quiet");
    let object = Arc::new(MockSpatialObject::unit_cube("a", Vec3::ZERO, true));
    partition.add(object.clone(), true);
    partition.update(object.as_ref());
    partition.clear();

    assert!(entries.lock().unwrap().is_empty());

    restore_defaults();
}

#[test]
#[serial]
fn test_integration_engine_config_sets_level() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    let engine = Engine::new(EngineConfig { log_level: LogSeverity::Debug, ..EngineConfig::default() }).unwrap();
    let world = engine.world();
    world.lock_for_writing().unwrap().add_partition(engine.create_partition("level"));

    let seen = sources(&entries);
    assert_eq!(seen, vec!["galaxy3d::Engine".to_string(), "galaxy3d::World".to_string()]);

    let captured = entries.lock().unwrap();
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[1].severity, LogSeverity::Debug);
    assert!(captured[1].message.contains("level"));
    drop(captured);

    restore_defaults();
}

#[test]
#[serial]
fn test_integration_poisoned_world_logs_error() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    let world = Arc::new(World::new());
    let writer = Arc::clone(&world);
    let _ = std::thread::spawn(move || {
        let _guard = writer.lock_for_writing().unwrap();
        panic!("poison");
    })
    .join();

    assert!(world.lock_for_reading().is_err());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert_eq!(captured[0].source, "galaxy3d::World");
    assert!(captured[0].message.contains("World lock poisoned"));
    drop(captured);

    restore_defaults();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    engine_info!("test", "Message 1");
    assert_eq!(entries.lock().unwrap().len(), 1);

    log::reset_logger();
    engine_info!("test", "Message 2");

    assert_eq!(entries.lock().unwrap().len(), 1);
    restore_defaults();
}
