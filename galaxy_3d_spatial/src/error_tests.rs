//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_lock_poisoned_display() {
    let err = Error::LockPoisoned("World lock poisoned".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Lock poisoned"));
    assert!(display.contains("World lock poisoned"));
}

#[test]
fn test_invalid_config_display() {
    let err = Error::InvalidConfig("dynamic_margin must be finite".to_string());
    assert_eq!(
        format!("{}", err),
        "Invalid configuration: dynamic_margin must be finite"
    );
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::InvalidConfig("x".to_string());
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug_and_clone() {
    let err = Error::LockPoisoned("test".to_string());
    let cloned = err.clone();
    assert_eq!(err, cloned);
    assert!(format!("{:?}", cloned).contains("LockPoisoned"));
}

// ============================================================================
// RESULT ALIAS
// ============================================================================

fn fails() -> Result<u32> {
    Err(Error::InvalidConfig("nope".to_string()))
}

fn propagates() -> Result<u32> {
    let value = fails()?;
    Ok(value + 1)
}

#[test]
fn test_result_propagation() {
    match propagates() {
        Err(Error::InvalidConfig(msg)) => assert_eq!(msg, "nope"),
        other => panic!("unexpected result: {:?}", other),
    }
}
