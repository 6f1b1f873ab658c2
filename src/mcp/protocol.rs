//! MCP protocol response helpers.
//!
//! Every tool answers with a JSON object carrying exactly one of:
//!
//! - `{"result": …}` on success
//! - `{"error": {"kind": …, "code": …, "message": …}}` on failure, with the
//!   tool result flagged `isError`
//!
//! Application errors never escape as protocol errors; the caller decides
//! whether to retry.

use rmcp::model::{CallToolResult, Content};
use rmcp::schemars::{self, JsonSchema};
use rmcp::ErrorData as McpError;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// JSON format (default).
    #[default]
    Json,
    /// TOON (Token-Oriented Object Notation) - 40-60% fewer tokens.
    Toon,
}

/// Successful tool payload, wrapped as `{"result": …}`.
///
/// # Example
///
/// ```ignore
/// Response(listing, params.format).into()
/// ```
pub struct Response<T>(pub T, pub Option<OutputFormat>);

impl<T> Response<T> {
    /// Create a response with default (JSON) format.
    pub fn json(data: T) -> Self {
        Response(data, None)
    }

    /// Create a response with TOON format.
    pub fn toon(data: T) -> Self {
        Response(data, Some(OutputFormat::Toon))
    }
}

/// Outcome of a tool call: the payload or the application error it hit.
pub struct ToolOutcome<T>(pub Result<T, AppError>, pub Option<OutputFormat>);

#[derive(Serialize)]
struct ResultEnvelope<'a, T> {
    result: &'a T,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

/// Structured error returned to tool callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub kind: &'a str,
    pub code: &'a str,
    pub message: String,
}

impl<'a> From<&'a AppError> for ErrorBody<'a> {
    fn from(err: &'a AppError) -> Self {
        Self {
            kind: err.kind(),
            code: err.code(),
            message: err.to_string(),
        }
    }
}

fn render<T: Serialize>(value: &T, format: Option<OutputFormat>) -> Result<Content, McpError> {
    match format.unwrap_or_default() {
        OutputFormat::Json => {
            let json = serde_json::to_value(value).map_err(AppError::from)?;
            Content::json(json)
        }
        OutputFormat::Toon => serde_toon::to_string(value)
            .map(Content::text)
            .map_err(|e| McpError::internal_error(format!("TOON serialization error: {}", e), None)),
    }
}

impl<T: Serialize> From<Response<T>> for Result<CallToolResult, McpError> {
    fn from(response: Response<T>) -> Self {
        let content = render(&ResultEnvelope { result: &response.0 }, response.1)?;
        Ok(CallToolResult::success(vec![content]))
    }
}

impl<T: Serialize> From<ToolOutcome<T>> for Result<CallToolResult, McpError> {
    fn from(outcome: ToolOutcome<T>) -> Self {
        match outcome.0 {
            Ok(data) => Response(data, outcome.1).into(),
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "Tool call failed");
                let body = ErrorEnvelope {
                    error: ErrorBody::from(&err),
                };
                let content = render(&body, outcome.1)?;
                Ok(CallToolResult::error(vec![content]))
            }
        }
    }
}
