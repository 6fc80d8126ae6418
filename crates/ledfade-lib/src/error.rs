//! Unified error type for the ledfade-lib crate.
//!
//! [`LedfadeError`] wraps module-specific errors (`LockError`, `StripError`)
//! and domain-specific error kinds (`Color`, `Plan`). `From` impls allow `?`
//! to propagate across module boundaries seamlessly.

use std::fmt;

use crate::lock::LockError;
use crate::strip::StripError;

/// Unified error type for ledfade-lib operations.
#[derive(Debug)]
pub enum LedfadeError {
    /// Exclusive access error (marker create, poll timeout, release).
    Lock(LockError),
    /// Strip hardware error (init, render).
    Strip(StripError),
    /// Standard I/O error (config file read).
    Io(std::io::Error),
    /// Color parsing error.
    Color(String),
    /// Fade plan validation error.
    Plan(String),
}

impl fmt::Display for LedfadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedfadeError::Lock(e) => write!(f, "{e}"),
            LedfadeError::Strip(e) => write!(f, "{e}"),
            LedfadeError::Io(e) => write!(f, "I/O error: {e}"),
            LedfadeError::Color(e) => write!(f, "Color error: {e}"),
            LedfadeError::Plan(e) => write!(f, "Plan error: {e}"),
        }
    }
}

impl std::error::Error for LedfadeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedfadeError::Lock(e) => Some(e),
            LedfadeError::Strip(e) => Some(e),
            LedfadeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LockError> for LedfadeError {
    fn from(e: LockError) -> Self {
        LedfadeError::Lock(e)
    }
}

impl From<StripError> for LedfadeError {
    fn from(e: StripError) -> Self {
        LedfadeError::Strip(e)
    }
}

impl From<std::io::Error> for LedfadeError {
    fn from(e: std::io::Error) -> Self {
        LedfadeError::Io(e)
    }
}

/// Crate-level Result alias using [`LedfadeError`].
pub type Result<T> = std::result::Result<T, LedfadeError>;
