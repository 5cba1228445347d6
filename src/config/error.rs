//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Trial length must be between 1 and 30 days")]
    InvalidTrialDays,

    #[error("Free question quota must be at most 100")]
    InvalidFreeQuota,

    #[error("Session history cap must be at least 1")]
    InvalidHistoryCap,

    #[error("Memory limits must be positive")]
    InvalidMemoryLimits,

    #[error("Readiness minimum must be between 3 and 7 fields")]
    InvalidReadinessMinimum,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
