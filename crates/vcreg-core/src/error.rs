//! Error types for the vcreg-core crate.
//!
//! Every failure is raised before any part of the loss is computed; a call
//! either returns the full scalar or one of these errors.

use std::path::PathBuf;

use thiserror::Error;
use vcreg_tensor::TensorError;

/// Error type for regularizer operations.
#[derive(Debug, Error)]
pub enum RegularizerError {
    /// The input batch (or an intermediate matrix) has the wrong rank or size.
    #[error("Shape error: {message}")]
    Shape {
        /// Description of the shape problem
        message: String,
    },

    /// The configuration cannot be applied to this input, or is malformed.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the configuration problem
        message: String,
    },

    /// Reading a configuration file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid JSON for [`crate::VCRegConfig`].
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl RegularizerError {
    /// Creates a [`RegularizerError::Shape`] error.
    pub fn shape(message: impl Into<String>) -> Self {
        RegularizerError::Shape {
            message: message.into(),
        }
    }

    /// Creates a [`RegularizerError::InvalidConfiguration`] error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        RegularizerError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl From<TensorError> for RegularizerError {
    fn from(err: TensorError) -> Self {
        RegularizerError::shape(err.to_string())
    }
}

/// Result type alias for regularizer operations.
pub type RegularizerResult<T> = Result<T, RegularizerError>;
