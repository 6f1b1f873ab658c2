//! Catalog tools: content version plus weakness, category and view lookups.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;

use crate::client::CweClient;
use crate::error::AppError;
use crate::mcp::protocol::{OutputFormat, ToolOutcome};
use crate::mcp::server::McpServer;
use crate::mcp::tools::required;
use crate::models::{normalize_list, Collection, CweInfo, EntryListing};

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for get_cwe_content_version tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct VersionParams {
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

/// Parameters for the id-list lookup tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IdsParams {
    /// Comma-separated CWE ids, with or without the "CWE-" prefix
    /// (e.g. "79", "CWE-89,125"), or "all" for the complete listing. Required.
    #[serde(default)]
    #[schemars(with = "String")]
    pub ids: Option<String>,
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

impl IdsParams {
    pub fn new(ids: impl Into<String>) -> Self {
        Self {
            ids: Some(ids.into()),
            format: None,
        }
    }
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = catalog_tools, vis = "pub(crate)")]
impl McpServer {
    /// Current CWE content version.
    #[tool(description = "Get the CWE content version and release date.")]
    pub async fn get_cwe_content_version(
        &self,
        Parameters(params): Parameters<VersionParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Running get_cwe_content_version tool");

        ToolOutcome(self.client().version().await, params.format).into()
    }

    /// Summary metadata for each requested identifier.
    #[tool(
        description = "Get summary metadata for CWE id(s). Accepts comma-separated ids with or without 'CWE-' prefix, e.g. \"79\" or \"79,89,CWE-22\". Result is keyed by id; unknown ids map to []."
    )]
    pub async fn get_cwe_info(
        &self,
        Parameters(params): Parameters<IdsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(ids = ?params.ids, "Running get_cwe_info tool");

        let outcome = info(self.client(), params.ids.as_deref()).await;
        ToolOutcome(outcome, params.format).into()
    }

    /// Full weakness records.
    #[tool(
        description = "Get CWE weaknesses by id(s) or \"all\". Examples: \"79\", \"CWE-89,125\", \"all\". Returns {\"Weaknesses\": [...]}."
    )]
    pub async fn get_cwe_weakness(
        &self,
        Parameters(params): Parameters<IdsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(ids = ?params.ids, "Running get_cwe_weakness tool");

        let outcome = listing(
            self.client(),
            Collection::Weaknesses,
            params.ids.as_deref(),
        )
        .await;
        ToolOutcome(outcome, params.format).into()
    }

    /// Category records.
    #[tool(
        description = "Get CWE categories by id(s) or \"all\". Examples: \"1009\", \"CWE-1009,1010\", \"all\". Returns {\"Categories\": [...]}."
    )]
    pub async fn get_cwe_category(
        &self,
        Parameters(params): Parameters<IdsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(ids = ?params.ids, "Running get_cwe_category tool");

        let outcome = listing(
            self.client(),
            Collection::Categories,
            params.ids.as_deref(),
        )
        .await;
        ToolOutcome(outcome, params.format).into()
    }

    /// View records.
    #[tool(
        description = "Get CWE views by id(s) or \"all\". Examples: \"1000\", \"CWE-699,1003\", \"all\". Returns {\"Views\": [...]}."
    )]
    pub async fn get_cwe_view(
        &self,
        Parameters(params): Parameters<IdsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(ids = ?params.ids, "Running get_cwe_view tool");

        let outcome = listing(
            self.client(),
            Collection::Views,
            params.ids.as_deref(),
        )
        .await;
        ToolOutcome(outcome, params.format).into()
    }
}

async fn info(client: &CweClient, raw_ids: Option<&str>) -> Result<CweInfo, AppError> {
    let ids = normalize_list(required(raw_ids, "ids")?)?;
    client.cwe_info(&ids).await
}

async fn listing(
    client: &CweClient,
    collection: Collection,
    raw_ids: Option<&str>,
) -> Result<EntryListing, AppError> {
    let ids = normalize_list(required(raw_ids, "ids")?)?;
    match collection {
        Collection::Weaknesses => client.weaknesses(&ids).await,
        Collection::Categories => client.categories(&ids).await,
        Collection::Views => client.views(&ids).await,
    }
}
