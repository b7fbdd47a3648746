//! Error types for the Lens analysis client.
//!
//! Every failure of the outbound analysis call is converted into a
//! [`LensError`] at the service boundary. The coordinator then turns it into
//! the user-facing message shown in the failed workflow state.

use thiserror::Error;

/// Message surfaced when the service gave no usable `detail`.
pub const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed";

/// Main error type for Lens.
#[derive(Debug, Error)]
pub enum LensError {
    /// The request never produced an HTTP response (DNS, connect, TLS, timeout).
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The analysis service answered with a non-2xx status.
    #[error("Service error ({status}): {}", .detail.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Service {
        /// HTTP status code.
        status: u16,
        /// The `detail` string from the error body, when one was present.
        detail: Option<String>,
    },

    /// A success status arrived with a body that does not match the result contract.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Local I/O failure (reading a query file, creating the log directory).
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LensError {
    // ========== Constructors ==========

    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into(), source: None }
    }

    /// Create a new transport error with source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new service error from a status code and optional detail.
    pub fn service(status: u16, detail: Option<String>) -> Self {
        Self::Service { status, detail }
    }

    /// Create a new malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse { message: message.into(), source: None }
    }

    /// Create a new malformed-response error with source.
    pub fn malformed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::MalformedResponse { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new I/O error with source.
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    // ========== Methods ==========

    /// Message stored in the failed workflow state.
    ///
    /// Only a service error carrying a `detail` string surfaces its own text;
    /// everything else collapses to [`GENERIC_FAILURE_MESSAGE`].
    pub fn failure_message(&self) -> String {
        match self {
            Self::Service { detail: Some(detail), .. } => detail.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Check if the request reached the service and got an answer.
    pub fn is_service_response(&self) -> bool {
        matches!(self, Self::Service { .. } | Self::MalformedResponse { .. })
    }

    /// HTTP status code, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "Transport",
            Self::Service { .. } => "Service",
            Self::MalformedResponse { .. } => "Response",
            Self::Config { .. } => "Config",
            Self::Io { .. } => "I/O",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Transport { .. } => Some("Check that the analysis service is running"),
            Self::Service { status, .. } if *status >= 500 => {
                Some("The analysis service hit an internal error; try again")
            }
            Self::Service { .. } => Some("Check the query and selected dialect"),
            Self::MalformedResponse { .. } => {
                Some("The service returned an unexpected response; check its version")
            }
            Self::Config { .. } => Some("Check LENS_API_URL and command-line flags"),
            Self::Io { .. } => Some("Check file paths and permissions"),
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let error_type = format!("{} Error", self.category());
        let message = self.to_string();
        let hint = self.hint().map(String::from);

        let technical_detail = match self {
            Self::Service { status, .. } => Some(format!("HTTP status: {status}")),
            Self::Transport { source: Some(source), .. }
            | Self::MalformedResponse { source: Some(source), .. }
            | Self::Io { source: Some(source), .. } => Some(source.to_string()),
            _ => None,
        };

        ErrorInfo { error_type, message, hint, technical_detail }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Category name (e.g., "Transport Error").
    pub error_type: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for verbose output.
    pub technical_detail: Option<String>,
}

// ========== Error Conversions ==========

/// Convert from reqwest::Error to LensError.
impl From<reqwest::Error> for LensError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return LensError::MalformedResponse {
                message: err.to_string(),
                source: Some(Box::new(err)),
            };
        }

        if let Some(status) = err.status() {
            return LensError::Service { status: status.as_u16(), detail: None };
        }

        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not connect to the analysis service".to_string()
        } else {
            err.to_string()
        };

        LensError::Transport { message, source: Some(Box::new(err)) }
    }
}

/// Convert from serde_json::Error to LensError.
impl From<serde_json::Error> for LensError {
    fn from(err: serde_json::Error) -> Self {
        LensError::MalformedResponse {
            message: format!("JSON error: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from std::io::Error to LensError.
impl From<std::io::Error> for LensError {
    fn from(err: std::io::Error) -> Self {
        LensError::Io { message: err.to_string(), source: Some(Box::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_uses_detail() {
        let err = LensError::service(500, Some("syntax error".to_string()));
        assert_eq!(err.failure_message(), "syntax error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_failure_message_falls_back_to_generic() {
        assert_eq!(LensError::service(502, None).failure_message(), "Analysis failed");
        assert_eq!(LensError::transport("refused").failure_message(), "Analysis failed");
        assert_eq!(LensError::malformed("missing field").failure_message(), "Analysis failed");
    }

    #[test]
    fn test_service_error_display() {
        let err = LensError::service(400, Some("Query too short".to_string()));
        assert_eq!(err.to_string(), "Service error (400): Query too short");

        let err = LensError::service(503, None);
        assert_eq!(err.to_string(), "Service error (503): Analysis failed");
    }

    #[test]
    fn test_hints_depend_on_status() {
        assert_eq!(
            LensError::service(500, None).hint(),
            Some("The analysis service hit an internal error; try again")
        );
        assert_eq!(
            LensError::service(422, None).hint(),
            Some("Check the query and selected dialect")
        );
    }

    #[test]
    fn test_error_info() {
        let info = LensError::service(500, Some("boom".to_string())).to_error_info();
        assert_eq!(info.error_type, "Service Error");
        assert_eq!(info.technical_detail.as_deref(), Some("HTTP status: 500"));

        let info = LensError::config("bad url").to_error_info();
        assert_eq!(info.error_type, "Config Error");
        assert_eq!(info.message, "Config error: bad url");
        assert!(info.technical_detail.is_none());
    }

    #[test]
    fn test_json_error_is_malformed() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LensError::from(json_err);
        assert!(matches!(err, LensError::MalformedResponse { .. }));
        assert!(err.is_service_response());
    }
}
