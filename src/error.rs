//! Error types and handling for geotrim.

use std::path::PathBuf;

/// Result type alias for geotrim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for geotrim operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No API key in the environment or the key file
    #[error("Missing credential: {message}")]
    MissingCredential {
        /// Error message naming the sources that were checked
        message: String,
    },

    /// Input file does not exist
    #[error("Input file not found: {}", path.display())]
    InputNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// Transport failure or non-success HTTP status from the geocoding service
    #[error("HTTP error: {message}")]
    HttpError {
        /// Error message
        message: String,
        /// HTTP status code, when the server answered
        status: Option<u16>,
    },

    /// Geocoding response could not be decoded
    #[error("Decode error: {message}")]
    DecodeError {
        /// Error message
        message: String,
    },

    /// I/O errors
    #[error("I/O error: {source}")]
    IoError {
        /// Source error
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new missing credential error
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::MissingCredential {
            message: message.into(),
        }
    }

    /// Create a new input-not-found error
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new HTTP error
    pub fn http_error(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Create a new decode error
    pub fn decode_error(message: impl Into<String>) -> Self {
        Self::DecodeError {
            message: message.into(),
        }
    }

    /// Whether the run must stop before any record is processed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::InputNotFound { .. } | Self::ConfigError { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        if err.is_decode() {
            Self::decode_error(err.to_string())
        } else {
            Self::http_error(err.to_string(), status)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decode_error(err.to_string())
    }
}
