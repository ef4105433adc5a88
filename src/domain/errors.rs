//! Domain error types
//!
//! This module defines the error hierarchy for design-export.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main design-export error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum DesignExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Design API errors
    #[error("Design API error: {0}")]
    Api(#[from] DesignApiError),

    /// Image cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A task scheduled through a rate limiter exceeded its time budget
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A rate limiter dropped a task before it produced a result
    #[error("Rate limiter error: {0}")]
    RateLimiter(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Design API errors
///
/// Errors that occur when talking to the remote design-file API.
/// Status codes and response bodies are carried verbatim so they can be
/// looked up against the provider's API documentation.
#[derive(Debug, Error)]
pub enum DesignApiError {
    /// Failed to connect to the API
    #[error("Failed to connect to design API: {0}")]
    ConnectionFailed(String),

    /// Token missing, expired or lacking access to the file (401/403)
    #[error("Authentication failed: {status} - {message}")]
    AuthenticationFailed { status: u16, message: String },

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded, retry after: {retry_after_secs:?}s - {message}")]
    RateLimitExceeded {
        retry_after_secs: Option<u64>,
        message: String,
    },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// The image export endpoint reported a top-level error
    #[error("Image export failed: {0}")]
    ExportFailed(String),

    /// Response body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Document decoded but violates structural expectations
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl DesignApiError {
    /// Whether the failed request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DesignApiError::ConnectionFailed(_)
                | DesignApiError::RateLimitExceeded { .. }
                | DesignApiError::ServerError { .. }
                | DesignApiError::Timeout(_)
        )
    }
}

/// Image cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// The download request could not be sent or its body not read
    #[error("Failed to download {url}: {message}")]
    Connection { url: String, message: String },

    /// The download returned a non-success status
    #[error("Download of {url} failed with status {status}")]
    DownloadFailed { url: String, status: u16 },

    /// Writing the cached file failed
    #[error("Failed to write cache file {path}: {message}")]
    WriteFailed { path: String, message: String },

    /// Removing the cache directory failed
    #[error("Failed to clear cache directory {path}: {message}")]
    ClearFailed { path: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for DesignExportError {
    fn from(err: std::io::Error) -> Self {
        DesignExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DesignExportError {
    fn from(err: serde_json::Error) -> Self {
        DesignExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DesignExportError {
    fn from(err: toml::de::Error) -> Self {
        DesignExportError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DesignExportError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_api_error_conversion() {
        let api_err = DesignApiError::ExportFailed("Render timeout".to_string());
        let err: DesignExportError = api_err.into();
        assert!(matches!(
            err,
            DesignExportError::Api(DesignApiError::ExportFailed(_))
        ));
        assert_eq!(
            err.to_string(),
            "Design API error: Image export failed: Render timeout"
        );
    }

    #[test]
    fn test_cache_error_conversion() {
        let cache_err = CacheError::DownloadFailed {
            url: "https://x/a.png".to_string(),
            status: 403,
        };
        let err: DesignExportError = cache_err.into();
        assert!(matches!(err, DesignExportError::Cache(_)));
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_status_carried_verbatim() {
        let err = DesignApiError::ClientError {
            status: 404,
            message: "{\"status\":404,\"err\":\"Not found\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Client error: 404 - {\"status\":404,\"err\":\"Not found\"}"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DesignApiError::ServerError {
            status: 502,
            message: String::new()
        }
        .is_retryable());
        assert!(DesignApiError::RateLimitExceeded {
            retry_after_secs: Some(3),
            message: String::new()
        }
        .is_retryable());
        assert!(!DesignApiError::ClientError {
            status: 404,
            message: String::new()
        }
        .is_retryable());
        assert!(!DesignApiError::ExportFailed("boom".to_string()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: DesignExportError = io_err.into();
        assert!(matches!(err, DesignExportError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: DesignExportError = json_err.into();
        assert!(matches!(err, DesignExportError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: DesignExportError = toml_err.into();
        assert!(matches!(err, DesignExportError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = DesignExportError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
