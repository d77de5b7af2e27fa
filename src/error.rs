//! Error types for the valuation client.

use thiserror::Error;

use crate::domain::property::ValidationError;

/// Result type alias using the homeval error type.
pub type Result<T> = std::result::Result<T, HomevalError>;

/// Main error type for the valuation client.
///
/// Remote-call failures are not represented here: they resolve to a
/// [`FailureReason`](crate::transport::FailureReason) and a `Failed`
/// lifecycle state instead of propagating as errors.
#[derive(Error, Debug)]
pub enum HomevalError {
    /// A field value was rejected by its validator
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded or is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP client error
    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// General error from anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
