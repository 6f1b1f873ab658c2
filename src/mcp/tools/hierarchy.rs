//! Hierarchy navigation tools for a single weakness.

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
use crate::models::{normalize_list, Hierarchy, Relation, ViewFilter};

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for get_cwe_parents, get_cwe_children and get_cwe_descendants.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HierarchyParams {
    /// A single CWE id, with or without the "CWE-" prefix. Required.
    #[serde(default)]
    #[schemars(with = "String")]
    pub cwe_id: Option<String>,
    /// Optional view id restricting relationships (e.g. "1000").
    #[serde(default)]
    pub view: Option<String>,
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

impl HierarchyParams {
    pub fn new(cwe_id: impl Into<String>) -> Self {
        Self {
            cwe_id: Some(cwe_id.into()),
            view: None,
            format: None,
        }
    }
}

/// Parameters for get_cwe_ancestors.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AncestorsParams {
    /// A single CWE id, with or without the "CWE-" prefix. Required.
    #[serde(default)]
    #[schemars(with = "String")]
    pub cwe_id: Option<String>,
    /// Optional view id restricting relationships (e.g. "1000").
    #[serde(default)]
    pub view: Option<String>,
    /// Only follow primary parents.
    #[serde(default)]
    pub primary: Option<bool>,
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = hierarchy_tools, vis = "pub(crate)")]
impl McpServer {
    #[tool(
        description = "Get the direct parents of one CWE weakness, optionally filtered by view. Returns {\"cwe_id\", \"view\"?, \"Parents\": [...]}."
    )]
    pub async fn get_cwe_parents(
        &self,
        Parameters(params): Parameters<HierarchyParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            cwe_id = ?params.cwe_id,
            view = ?params.view,
            "Running get_cwe_parents tool"
        );

        let outcome = navigate(
            self.client(),
            Relation::Parents,
            params.cwe_id.as_deref(),
            params.view.as_deref(),
            None,
        )
        .await;
        ToolOutcome(outcome, params.format).into()
    }

    #[tool(
        description = "Get the direct children of one CWE weakness, optionally filtered by view. Returns {\"cwe_id\", \"view\"?, \"Children\": [...]}."
    )]
    pub async fn get_cwe_children(
        &self,
        Parameters(params): Parameters<HierarchyParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            cwe_id = ?params.cwe_id,
            view = ?params.view,
            "Running get_cwe_children tool"
        );

        let outcome = navigate(
            self.client(),
            Relation::Children,
            params.cwe_id.as_deref(),
            params.view.as_deref(),
            None,
        )
        .await;
        ToolOutcome(outcome, params.format).into()
    }

    /// Ancestor tree; `primary` restricts the walk to primary parents.
    #[tool(
        description = "Get the ancestor tree of one CWE weakness, optionally filtered by view and limited to primary parents. Returns {\"cwe_id\", \"view\"?, \"Ancestors\": [...]}."
    )]
    pub async fn get_cwe_ancestors(
        &self,
        Parameters(params): Parameters<AncestorsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            cwe_id = ?params.cwe_id,
            view = ?params.view,
            primary = ?params.primary,
            "Running get_cwe_ancestors tool"
        );

        let outcome = navigate(
            self.client(),
            Relation::Ancestors,
            params.cwe_id.as_deref(),
            params.view.as_deref(),
            params.primary,
        )
        .await;
        ToolOutcome(outcome, params.format).into()
    }

    #[tool(
        description = "Get the descendant tree of one CWE weakness, optionally filtered by view. Returns {\"cwe_id\", \"view\"?, \"Descendants\": [...]}."
    )]
    pub async fn get_cwe_descendants(
        &self,
        Parameters(params): Parameters<HierarchyParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            cwe_id = ?params.cwe_id,
            view = ?params.view,
            "Running get_cwe_descendants tool"
        );

        let outcome = navigate(
            self.client(),
            Relation::Descendants,
            params.cwe_id.as_deref(),
            params.view.as_deref(),
            None,
        )
        .await;
        ToolOutcome(outcome, params.format).into()
    }
}

async fn navigate(
    client: &CweClient,
    relation: Relation,
    raw_id: Option<&str>,
    raw_view: Option<&str>,
    primary: Option<bool>,
) -> Result<Hierarchy, AppError> {
    let ids = normalize_list(required(raw_id, "cwe_id")?)?;
    let view = ViewFilter::parse(raw_view)?;

    match relation {
        Relation::Parents => client.parents(&ids, view).await,
        Relation::Children => client.children(&ids, view).await,
        Relation::Ancestors => client.ancestors(&ids, view, primary).await,
        Relation::Descendants => client.descendants(&ids, view).await,
    }
}
