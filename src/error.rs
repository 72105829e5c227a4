//! Error types for the CodeWhisper client.
//!
//! This module defines the error type covering every failure mode of the
//! streaming chat pipeline, along with the classification of HTTP statuses
//! and stream-level error frames into user-facing messages.

use std::error;
use std::fmt;
use std::str::Utf8Error;
use std::sync::Arc;

/// Message shown for an HTTP 413 response.
const MSG_CONTENT_TOO_LARGE: &str =
    "Selected content is too large for the model. Please reduce the number of files.";

/// Message shown for an HTTP 401 response.
const MSG_AUTHENTICATION: &str = "Authentication failed. Please check your credentials.";

/// Message shown for an HTTP 503 response.
const MSG_SERVICE_UNAVAILABLE: &str =
    "Service is temporarily unavailable. Please try again in a moment.";

/// Message shown for any other non-success HTTP status.
const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Fallback message for an error frame that carries no detail.
const MSG_STREAM_FALLBACK: &str = "An error occurred";

/// Message shown when a success response has no readable body.
const MSG_EMPTY_BODY: &str = "No body in response";

/// The main error type for the CodeWhisper client.
#[derive(Clone, Debug)]
pub enum Error {
    /// The server rejected the request as too large (HTTP 413).
    ContentTooLarge {
        /// Detail reported by the server, if any.
        message: String,
    },

    /// Authentication failed (HTTP 401).
    Authentication {
        /// Detail reported by the server, if any.
        message: String,
    },

    /// The server is overloaded or down (HTTP 503).
    ServiceUnavailable {
        /// Detail reported by the server, if any.
        message: String,
    },

    /// Any other non-success HTTP status.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Detail reported by the server, if any.
        message: String,
    },

    /// The stream body carried an explicit error frame.
    Stream {
        /// The frame's detail, or a generic fallback.
        message: String,
    },

    /// Success status but no readable body.
    EmptyBody,

    /// The request timed out.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Encoding/decoding error.
    Encoding {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new content-too-large error.
    pub fn content_too_large(message: impl Into<String>) -> Self {
        Error::ContentTooLarge {
            message: message.into(),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Error::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new API error for an unclassified status code.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new stream error from an error frame's detail.
    ///
    /// A missing or blank detail falls back to a generic message.
    pub fn stream(detail: Option<String>) -> Self {
        let message = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| MSG_STREAM_FALLBACK.to_string());
        Error::Stream { message }
    }

    /// Creates a new empty-body error.
    pub fn empty_body() -> Self {
        Error::EmptyBody
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new encoding error.
    pub fn encoding(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Encoding {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Classifies a non-success HTTP status into an error.
    ///
    /// `detail` is the server's best-effort error detail; it is retained for
    /// diagnostics but the user-facing message depends only on the status.
    pub fn from_status(status_code: u16, detail: Option<String>) -> Self {
        let message = detail.unwrap_or_else(|| "An unknown error occurred".to_string());
        match status_code {
            413 => Error::content_too_large(message),
            401 => Error::authentication(message),
            503 => Error::service_unavailable(message),
            _ => Error::api(status_code, message),
        }
    }

    /// The message to surface to the user for this error.
    ///
    /// Status-classified errors map to one fixed message each; stream errors
    /// surface the frame's detail; everything else surfaces its own message.
    pub fn user_message(&self) -> String {
        match self {
            Error::ContentTooLarge { .. } => MSG_CONTENT_TOO_LARGE.to_string(),
            Error::Authentication { .. } => MSG_AUTHENTICATION.to_string(),
            Error::ServiceUnavailable { .. } => MSG_SERVICE_UNAVAILABLE.to_string(),
            Error::Api { .. } => MSG_UNEXPECTED.to_string(),
            Error::Stream { message } => message.clone(),
            Error::EmptyBody => MSG_EMPTY_BODY.to_string(),
            Error::Timeout { .. } => "Request timed out. Please try again.".to_string(),
            Error::Connection { message, .. } => message.clone(),
            Error::HttpClient { message, .. } => message.clone(),
            Error::Serialization { message, .. } => message.clone(),
            Error::Encoding { message, .. } => message.clone(),
        }
    }

    /// Returns true if this error is related to authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if this error is a content-too-large rejection.
    pub fn is_content_too_large(&self) -> bool {
        matches!(self, Error::ContentTooLarge { .. })
    }

    /// Returns true if this error came from a stream error frame.
    pub fn is_stream(&self) -> bool {
        matches!(self, Error::Stream { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::ContentTooLarge { .. } => Some(413),
            Error::Authentication { .. } => Some(401),
            Error::ServiceUnavailable { .. } => Some(503),
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContentTooLarge { message } => {
                write!(f, "Content too large: {message}")
            }
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {message}")
            }
            Error::Api {
                status_code,
                message,
            } => {
                write!(f, "API error (status {status_code}): {message}")
            }
            Error::Stream { message } => {
                write!(f, "Stream error: {message}")
            }
            Error::EmptyBody => {
                write!(f, "{MSG_EMPTY_BODY}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Encoding { message, .. } => {
                write!(f, "Encoding error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Encoding { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::encoding(format!("UTF-8 error: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for CodeWhisper client operations.
pub type Result<T> = std::result::Result<T, Error>;
