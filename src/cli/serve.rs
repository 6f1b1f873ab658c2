//! HTTP server command handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use color_eyre::Result;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tower::ServiceBuilder;

use crate::config::Config;
use crate::context::Context;
use crate::mcp::McpServer;

use super::App;

/// Authentication middleware state.
#[derive(Clone)]
struct AuthState {
    api_key: Option<Arc<str>>,
}

impl AuthState {
    fn new(api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.map(Arc::from),
        }
    }

    /// Without a configured key every request is allowed.
    fn allows(&self, authorization: Option<&str>) -> bool {
        let Some(expected) = self.api_key.as_deref() else {
            return true;
        };

        authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}

/// Authentication middleware that checks for a Bearer token.
async fn auth_middleware(State(state): State<AuthState>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if state.allows(authorization) {
        next.run(req).await
    } else {
        tracing::debug!(path = %req.uri().path(), "Rejected unauthenticated request");
        StatusCode::UNAUTHORIZED.into_response()
    }
}

/// Streamable HTTP MCP endpoint behind bearer authentication.
fn router(ctx: Context, auth_state: AuthState) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(McpServer::new(ctx.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .fallback_service(ServiceBuilder::new().service(service))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
}

impl App {
    /// Run the MCP server with HTTP transport.
    pub async fn run_serve(&self, host: &str, port: u16) -> Result<()> {
        tracing::info!("Starting CWE HTTP server");

        let config = Config::load()?;

        if config.server.api_key.is_some() {
            tracing::info!("API key authentication enabled");
        } else {
            tracing::warn!("No API key configured - server is unprotected!");
        }

        let auth_state = AuthState::new(config.server.api_key.as_deref());
        let ctx = Context::from_config(&config.api)?;
        let app = router(ctx, auth_state);

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid address {}:{}: {}", host, port, e))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

        tracing::info!("CWE HTTP server listening on http://{}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            color_eyre::eyre::eyre!("HTTP server error: {}", e)
        })?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }
}
