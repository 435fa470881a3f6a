//! Error types for the Gemini image MCP server.
//!
//! This module provides a unified error hierarchy using `thiserror` for consistent
//! error handling and reporting across the server.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing or invalid configuration (fatal at startup)
//! - `Error::Api`: Gemini API errors (includes endpoint and HTTP status)
//! - `Error::Validation`: Input validation failures
//! - `Error::Io`: File system operations
//!
//! An empty generation result is deliberately not an error; see
//! [`crate::handler::GenerateImageResult::Empty`].

use thiserror::Error;

/// Unified error type for the server.
///
/// This enum provides a single error type that can represent all error conditions
/// in the server, enabling consistent error handling and reporting. Every variant
/// renders a message that names an identifiable cause, so a caller reading the
/// error text can tell a rejected input from a vendor failure from a disk failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// API errors with endpoint and HTTP status context
    ///
    /// Includes the API endpoint that failed, HTTP status code, and error message
    /// for debugging and user feedback. A status code of 0 marks a transport-level
    /// failure where no HTTP response was received.
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The API endpoint that was called
    /// * `status_code` - The HTTP status code returned (0 for transport failures)
    /// * `message` - A description of the error
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_image_mcp::error::Error;
    ///
    /// let err = Error::api(
    ///     "https://generativelanguage.googleapis.com/v1beta/models/x:generateContent",
    ///     500,
    ///     "Internal server error"
    /// );
    /// assert!(err.to_string().contains("generativelanguage.googleapis.com"));
    /// assert!(err.to_string().contains("500"));
    /// ```
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_image_mcp::error::Error;
    ///
    /// let err = Error::validation("prompt cannot be empty");
    /// assert!(err.to_string().contains("prompt cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables. They are fatal: the server refuses to start
/// rather than failing later on the first tool call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
