//! Error types for homework-bot
//!
//! Every failure the bot can run into is a variant of [`Error`]. The poll loop
//! never matches on variants directly; it asks for the [`ErrorKind`] and decides
//! from that whether to log, notify, or halt:
//! - [`ErrorKind::Config`] is fatal and only raised before the loop starts
//! - [`ErrorKind::Fetch`] additionally triggers a "service unavailable" notice
//! - everything else is logged and the loop carries on after its sleep

use serde::Serialize;
use thiserror::Error;

/// Result type alias for homework-bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for homework-bot
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment key that caused the error (e.g., "TELEGRAM_CHAT_ID")
        key: Option<String>,
    },

    /// The review API could not be reached
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The review API answered with a non-success status
    #[error("review API returned HTTP {status}")]
    Fetch {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// The response body was not a JSON object
    #[error("response is not a JSON object")]
    Shape,

    /// A required field was absent from the response or a homework record
    #[error("missing field `{field}`")]
    MissingField {
        /// Name of the absent field
        field: &'static str,
    },

    /// A field was present but had the wrong JSON type
    #[error("field `{field}` is not {expected}")]
    FieldType {
        /// Name of the offending field
        field: &'static str,
        /// Expected JSON type ("array", "string", ...)
        expected: &'static str,
    },

    /// Homework status outside the known set
    #[error("unknown homework status: {0}")]
    UnknownStatus(String),

    /// The messaging provider rejected or failed to accept a message
    #[error("message delivery failed: {0}")]
    Delivery(String),

    /// Response body was not valid JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of [`Error`] used by the poll loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed configuration
    Config,
    /// Network failure talking to the review API
    Transport,
    /// Non-success HTTP status from the review API
    Fetch,
    /// Malformed response payload
    Response,
    /// Status code not in the verdict table
    UnknownStatus,
    /// Messaging provider failure
    Delivery,
}

impl Error {
    /// Shorthand for a configuration error tied to an environment key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// The taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Config,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Fetch { .. } => ErrorKind::Fetch,
            Error::Shape
            | Error::MissingField { .. }
            | Error::FieldType { .. }
            | Error::Serialization(_) => ErrorKind::Response,
            Error::UnknownStatus(_) => ErrorKind::UnknownStatus,
            Error::Delivery(_) => ErrorKind::Delivery,
        }
    }

    /// Whether the process must stop instead of retrying on the next tick
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Config
    }

    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Transport(_) => "transport_error",
            Error::Fetch { .. } => "fetch_error",
            Error::Shape => "response_shape",
            Error::MissingField { .. } => "missing_field",
            Error::FieldType { .. } => "field_type",
            Error::UnknownStatus(_) => "unknown_status",
            Error::Delivery(_) => "delivery_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}
