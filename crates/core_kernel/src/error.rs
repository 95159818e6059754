//! Core error types used across the system

use thiserror::Error;

/// Core error type for the kernel
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        CoreError::Invariant(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
