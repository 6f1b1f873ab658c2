//! Keyword search tool.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::mcp::protocol::{OutputFormat, ToolOutcome};
use crate::mcp::server::McpServer;
use crate::mcp::tools::{integer_or, required};
use crate::models::SearchResult;
use crate::services::SearchService;

/// Results returned when the caller does not say.
pub const DEFAULT_MAX_RESULTS: i64 = 10;

/// Parameters for search_cwe tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Keyword or phrase, matched case-insensitively against weakness
    /// names and descriptions (e.g. "SQL injection"). Required.
    #[serde(default)]
    #[schemars(with = "String")]
    pub keyword: Option<String>,
    /// Maximum number of results (default: 10). Must be a positive integer.
    #[serde(default)]
    #[schemars(with = "Option<i64>")]
    pub max_results: Option<Value>,
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

impl SearchParams {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            max_results: None,
            format: None,
        }
    }

    pub fn max_results(mut self, max_results: impl Into<Value>) -> Self {
        self.max_results = Some(max_results.into());
        self
    }
}

#[tool_router(router = search_tools, vis = "pub(crate)")]
impl McpServer {
    /// Keyword search over the full weakness listing.
    #[tool(
        description = "Search CWE weaknesses by keyword (case-insensitive substring of name or description). Returns at most max_results (default 10) matches in catalogue order."
    )]
    pub async fn search_cwe(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            keyword = ?params.keyword,
            max_results = ?params.max_results,
            "Running search_cwe tool"
        );

        let outcome = search(&self.search_service(), &params).await;
        ToolOutcome(outcome, params.format).into()
    }
}

async fn search(service: &SearchService, params: &SearchParams) -> Result<SearchResult, AppError> {
    let keyword = required(params.keyword.as_deref(), "keyword")?;
    let max_results = integer_or(
        params.max_results.as_ref(),
        "max_results",
        DEFAULT_MAX_RESULTS,
    )?;
    service.search(keyword, max_results).await
}
