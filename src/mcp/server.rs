//! MCP server implementation for CWE lookups.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool_handler,
};

use crate::client::CweClient;
use crate::context::Context;
use crate::services::SearchService;

/// CWE MCP Server.
///
/// Exposes MITRE's CWE REST API as tools:
/// - Content version and summary lookups
/// - Weakness, category and view retrieval (by id or `all`)
/// - Hierarchy navigation (parents, children, ancestors, descendants)
/// - Keyword search over weakness names and descriptions
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
}

impl McpServer {
    /// Create a new CWE MCP server with the given context.
    pub fn new(ctx: Context) -> Self {
        tracing::info!("Initializing CWE MCP server");

        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    /// Build the combined tool router from all tool modules.
    fn tool_router() -> ToolRouter<Self> {
        Self::catalog_tools() + Self::hierarchy_tools() + Self::search_tools()
    }

    /// Upstream client shared by all tools.
    pub fn client(&self) -> &CweClient {
        &self.ctx.client
    }

    /// Keyword search over the shared client.
    pub fn search_service(&self) -> SearchService {
        SearchService::new(self.ctx.client.as_ref().clone())
    }

    /// Names of every registered tool.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"CWE - Common Weakness Enumeration lookup

Queries MITRE's public CWE REST API. Identifiers may be written as "79",
"CWE-79" or "cwe79"; lists are comma-separated; "all" requests a full listing.

Every tool returns {"result": ...} on success or {"error": {"kind", "code", "message"}}.
Unknown identifiers yield empty results, not errors.

## Catalog Tools

- **get_cwe_content_version** - CWE content version and release date
- **get_cwe_info** - Summary metadata for CWE id(s), keyed by id
- **get_cwe_weakness** - Full weakness records by id(s) or "all"
- **get_cwe_category** - Categories by id(s) or "all"
- **get_cwe_view** - Views by id(s) or "all"

## Hierarchy Tools (exactly one id, optional view filter)

- **get_cwe_parents** - Direct parents
- **get_cwe_children** - Direct children
- **get_cwe_ancestors** - Ancestor tree (optionally primary parents only)
- **get_cwe_descendants** - Descendant tree

## Search Tools

- **search_cwe** - Keyword search over weakness names and descriptions
"#
                .to_string(),
            ),
        }
    }
}
