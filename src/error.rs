//! Error types for the homeprice service.
//!
//! This module provides a unified error type [`PriceError`] for every
//! operation in the crate, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Configuration**: missing connection settings or invalid values
//! - **Storage**: blob downloads, authentication and transport failures
//! - **Model**: artifacts that cannot be decoded into a usable model
//! - **Request**: form input that fails validation
//!
//! # Example
//!
//! ```rust
//! use homeprice::error::{PriceError, Result};
//!
//! fn parse_sqft(raw: &str) -> Result<f64> {
//!     raw.trim()
//!         .parse::<f64>()
//!         .map_err(|_| PriceError::Validation("Error: Invalid numeric input".into()))
//! }
//!
//! let err = parse_sqft("lots").unwrap_err();
//! assert_eq!(err.status_code(), 400);
//! ```

use std::io;
use thiserror::Error;

/// Main error type for homeprice operations.
#[derive(Error, Debug)]
pub enum PriceError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // Storage errors
    #[error("Blob not found: {container}/{blob}")]
    BlobNotFound { container: String, blob: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    // Model errors
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Model mismatch: {0}")]
    ModelMismatch(String),

    // Request errors
    #[error("{0}")]
    Validation(String),

    #[error("Error: Unknown location '{0}'")]
    UnknownLocation(String),

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PriceError {
    /// HTTP status code a handler should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            PriceError::Validation(_) | PriceError::UnknownLocation(_) => 400,
            _ => 500,
        }
    }

    /// Check if the error is a client-side input problem.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Check if error is transient and a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PriceError::Network(_) | PriceError::Timeout(_))
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PriceError::Config(_) | PriceError::InvalidConfig { .. } => "config",
            PriceError::BlobNotFound { .. } => "blob_not_found",
            PriceError::PermissionDenied(_) => "permission_denied",
            PriceError::Network(_) => "network",
            PriceError::Timeout(_) => "timeout",
            PriceError::Deserialization(_) | PriceError::ModelMismatch(_) => "model",
            PriceError::Validation(_) => "validation",
            PriceError::UnknownLocation(_) => "unknown_location",
            PriceError::Io(_) => "io",
            PriceError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for PriceError {
    fn from(e: serde_json::Error) -> Self {
        PriceError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for PriceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PriceError::Timeout(e.to_string())
        } else {
            PriceError::Network(e.to_string())
        }
    }
}

/// Result type alias for homeprice operations.
pub type Result<T> = std::result::Result<T, PriceError>;
