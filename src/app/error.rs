//! Error types for the application core
//!
//! Invocation outcomes are never errors: they are reported as a
//! [`Disposition`](super::invocation::Disposition). The types here cover the
//! infrastructure around the dispatcher: configuration, trigger delivery and
//! request construction.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid invocation request
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    /// A trigger line could not be parsed
    #[error("Unrecognized trigger '{0}'")]
    UnknownTrigger(String),

    /// A deferred task could not be joined
    #[error("Deferred task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Atomic write failed
    #[error("Atomic write failed for {path}: {detail}")]
    AtomicWriteFailed {
        /// Path where write failed
        path: PathBuf,
        /// Error details
        detail: String,
    },

    /// A field holds a value the app cannot use
    #[error("Invalid value for '{field}': {detail}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Error details
        detail: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors building an invocation request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Target identifier was empty
    #[error("target must not be empty")]
    EmptyTarget,

    /// Action identifier was empty
    #[error("action must not be empty")]
    EmptyAction,
}

/// Result type using AppError
pub type Result<T> = std::result::Result<T, AppError>;
