//! Error types for the vital_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vital_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A service key was resolved before anything was registered under it
    #[error("Service not registered: {0}")]
    ServiceNotRegistered(String),

    /// `try_register` was called for a key that already has a factory
    #[error("Service already registered: {0}")]
    ServiceAlreadyRegistered(String),

    /// The registered service is not of the requested type
    #[error("Service {key} is not of type {expected}")]
    ServiceTypeMismatch { key: String, expected: &'static str },

    /// A factory (transitively) resolved its own key
    #[error("Circular dependency: {0}")]
    CircularDependency(String),

    /// The container was used before the app initializer ran
    #[error("Application has not been initialized")]
    NotInitialized,

    /// Secure storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encryption or key handling error
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// A value could not be parsed into a domain type
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}
