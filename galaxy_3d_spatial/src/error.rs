//! Error types for the Galaxy3D spatial subsystem
//!
//! Spatial queries and tree maintenance never fail: negative outcomes
//! (removing an untracked object, etc.) are reported as `bool`/`Option`.
//! This module only covers the surrounding machinery: engine configuration
//! and the World's reader/writer lock.

use std::fmt;

/// Result type for Galaxy3D spatial operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D spatial errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A lock was poisoned by a panicking holder (World, logger, ...)
    LockPoisoned(String),

    /// Engine or partition configuration rejected at construction
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LockPoisoned(msg) => write!(f, "Lock poisoned: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error at ERROR severity and hand it back, for use in `map_err`/`ok_or_else`.
pub(crate) fn log_and_return_error(source: &str, error: Error) -> Error {
    crate::engine_error!(source, "{}", error);
    error
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
