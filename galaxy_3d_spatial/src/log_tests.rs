//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, the severity filter and logger replacement.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Captures entries coming from a single source, ignoring concurrent tests.
struct CaptureLogger {
    source: &'static str,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn new(source: &'static str) -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { source, entries: entries.clone() }, entries)
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == self.source {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_round_trips_through_u8() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(LogSeverity::from_u8(severity as u8), severity);
    }
    assert_eq!(LogSeverity::from_u8(200), LogSeverity::Error);
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_without_location() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "galaxy3d::World".to_string(),
        message: "partition added".to_string(),
        file: None,
        line: None,
    };

    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.source, "galaxy3d::World");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());
}

#[test]
fn test_default_logger_handles_both_formats() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: "plain".to_string(),
        file: None,
        line: None,
    });
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: "detailed".to_string(),
        file: Some("log_tests.rs"),
        line: Some(42),
    });
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_min_severity_filters_messages() {
    let (capture, entries) = CaptureLogger::new("galaxy3d::log_tests::filter");
    log::set_logger(capture);
    log::set_min_severity(LogSeverity::Warn);

    crate::engine_debug!("galaxy3d::log_tests::filter", "dropped {}", 1);
    crate::engine_info!("galaxy3d::log_tests::filter", "dropped {}", 2);
    crate::engine_warn!("galaxy3d::log_tests::filter", "kept {}", 3);

    log::set_min_severity(LogSeverity::Info);
    log::reset_logger();

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Warn);
    assert_eq!(captured[0].message, "kept 3");
}

#[test]
#[serial]
fn test_error_macro_carries_location() {
    let (capture, entries) = CaptureLogger::new("galaxy3d::log_tests::error");
    log::set_logger(capture);

    crate::engine_error!("galaxy3d::log_tests::error", "boom");

    log::reset_logger();

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.unwrap().ends_with("log_tests.rs"));
    assert!(captured[0].line.is_some());
}

#[test]
#[serial]
fn test_enabled_follows_min_severity() {
    log::set_min_severity(LogSeverity::Trace);
    assert!(log::enabled(LogSeverity::Trace));
    assert_eq!(log::min_severity(), LogSeverity::Trace);

    log::set_min_severity(LogSeverity::Error);
    assert!(!log::enabled(LogSeverity::Warn));
    assert!(log::enabled(LogSeverity::Error));

    log::set_min_severity(LogSeverity::Info);
}
