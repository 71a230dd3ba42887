//! Core error types for restgate-core.
//!
//! The session state machine has no I/O of its own, so most of this
//! hierarchy covers invariant violations (an operation issued from the
//! wrong phase) and the configuration layer. Collaborator failures are
//! modelled too, but they are swallowed at the notifier boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::Phase;

/// Core error type for restgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A session operation was issued from a phase that does not accept it
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Notification or audio collaborator failures
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Invariant violations raised by the session clock.
///
/// These are programming errors on the caller's side. The clock leaves its
/// state untouched when it returns one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Operation is not valid from the current phase
    #[error("'{operation}' is not valid while {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },
}

/// Failures reported by the external notification service or audio device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The notification service refused the request
    #[error("notification rejected: {0}")]
    Rejected(String),

    /// Audio output is not available
    #[error("audio device unavailable: {0}")]
    AudioUnavailable(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
