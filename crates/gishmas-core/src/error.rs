//! Core error types for gishmas-core.
//!
//! One enum per concern, folded into [`CoreError`] with `#[from]`. Most of
//! these never reach the end user: the guest book and the quiz page catch
//! store and identity failures at their boundary and log them instead.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gishmas-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider errors
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Local key-value storage errors
    #[error("Local storage error: {0}")]
    LocalStorage(#[from] LocalStorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remote document store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Request never reached the store or the connection dropped
    #[error("store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Store answered with a non-success status
    #[error("store rejected request with {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Store answered with a body we could not read
    #[error("store response decode error: {0}")]
    Decode(String),

    /// The collection path could not be turned into a URL
    #[error("invalid collection url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Identity provider errors.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Bootstrap token was refused
    #[error("token sign-in rejected: {0}")]
    TokenRejected(String),

    /// Anonymous sign-in was refused
    #[error("anonymous sign-in failed: {0}")]
    AnonymousFailed(String),

    /// Provider could not be reached
    #[error("identity transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Local key-value storage errors.
#[derive(Error, Debug)]
pub enum LocalStorageError {
    /// Failed to open the backing database
    #[error("Failed to open local storage at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// Stored value could not be encoded
    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
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

    /// Key does not exist in the configuration
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Guest name is empty after trimming
    #[error("guest name must not be empty")]
    EmptyName,

    /// Answer index does not exist on the current question
    #[error("answer {index} out of range for question {question} ({len} options)")]
    AnswerOutOfRange {
        question: u8,
        index: usize,
        len: usize,
    },

    /// Action is not available in the current state
    #[error("'{action}' is not available while {state}")]
    Unavailable { action: String, state: String },

    /// Unknown quiz variant name
    #[error("unknown quiz variant '{0}' (expected v1 or v2)")]
    UnknownVariant(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
