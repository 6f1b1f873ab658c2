//! Stdio transport command handler.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

use crate::config::Config;
use crate::context::Context;
use crate::mcp::McpServer;

use super::App;

impl App {
    /// Serve the CWE tools over stdin/stdout until the client hangs up.
    pub async fn run_mcp(&self) -> Result<()> {
        let config = Config::load()?;
        let server = McpServer::new(Context::from_config(&config.api)?);
        tracing::info!(
            tools = server.tool_names().len(),
            "Serving CWE tools over stdio"
        );

        let session = server.serve(stdio()).await.map_err(|e| {
            tracing::error!(error = %e, "Stdio handshake failed");
            eyre!("Failed to start stdio MCP session: {}", e)
        })?;

        let reason = session.waiting().await.map_err(|e| {
            tracing::error!(error = %e, "Stdio session aborted");
            eyre!("Stdio MCP session failed: {}", e)
        })?;

        tracing::info!(?reason, "Stdio session closed");
        Ok(())
    }
}
