//! Application error types with MCP protocol conversion.

use rmcp::model::ErrorCode;
use thiserror::Error;

/// Why a call to the upstream CWE API did not produce usable data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Upstream answered with a non-success status.
    Status(u16),
    /// The request never completed (connection refused, DNS, timeout).
    Transport(String),
    /// The body was not valid JSON.
    MalformedBody(String),
    /// Valid JSON, but not in a shape this operation understands.
    UnexpectedShape(String),
}

impl std::fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamFailure::Status(status) => write!(f, "upstream returned HTTP {}", status),
            UpstreamFailure::Transport(detail) => write!(f, "transport error: {}", detail),
            UpstreamFailure::MalformedBody(detail) => write!(f, "malformed JSON body: {}", detail),
            UpstreamFailure::UnexpectedShape(detail) => {
                write!(f, "unexpected response shape: {}", detail)
            }
        }
    }
}

impl UpstreamFailure {
    /// Upstream status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamFailure::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// Application-level errors for the CWE tool server.
#[derive(Error, Debug)]
pub enum AppError {
    // Caller input errors
    #[error("Invalid CWE identifier: '{raw}'")]
    InvalidIdentifier { raw: String },

    #[error("{operation} accepts exactly one identifier, got {requested}")]
    UnsupportedCardinality { operation: String, requested: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Upstream errors
    #[error("{operation} failed for [{identifiers}]: {failure}")]
    UpstreamRequest {
        operation: String,
        identifiers: String,
        failure: UpstreamFailure,
    },

    #[error("Failed to build HTTP client: {0}")]
    Transport(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Shorthand for an invalid identifier error.
    pub fn invalid_identifier(raw: impl Into<String>) -> Self {
        AppError::InvalidIdentifier { raw: raw.into() }
    }

    /// Shorthand for an upstream failure on `operation`.
    pub fn upstream(
        operation: impl Into<String>,
        identifiers: impl Into<String>,
        failure: UpstreamFailure,
    ) -> Self {
        AppError::UpstreamRequest {
            operation: operation.into(),
            identifiers: identifiers.into(),
            failure,
        }
    }

    /// Stable error kind reported to tool callers.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidIdentifier { .. } => "InvalidIdentifierError",
            AppError::UnsupportedCardinality { .. } => "UnsupportedCardinalityError",
            AppError::InvalidArgument(_) => "InvalidArgumentError",
            AppError::UpstreamRequest { .. } => "UpstreamRequestError",
            AppError::Transport(_) | AppError::Config(_) => "ConfigurationError",
            AppError::Serialization(_) => "InternalError",
        }
    }

    /// Application error code, also used as the bracketed prefix in MCP errors.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            AppError::UnsupportedCardinality { .. } => "UNSUPPORTED_CARDINALITY",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::UpstreamRequest { .. } => "UPSTREAM_REQUEST_FAILED",
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<AppError> for rmcp::model::ErrorData {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::InvalidIdentifier { .. }
            | AppError::UnsupportedCardinality { .. }
            | AppError::InvalidArgument(_) => ErrorCode::INVALID_PARAMS,
            AppError::UpstreamRequest { .. }
            | AppError::Transport(_)
            | AppError::Config(_)
            | AppError::Serialization(_) => ErrorCode::INTERNAL_ERROR,
        };

        rmcp::model::ErrorData::new(code, format!("[{}] {}", err.code(), err), None)
    }
}
