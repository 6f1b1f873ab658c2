//! HTTP transport over `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::transport::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

/// Sends requests to the configured CWE API root.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport from API settings.
    ///
    /// The base URL is treated as a directory so relative paths join under it.
    pub fn new(api: &ApiConfig) -> Result<Self, AppError> {
        let mut base = api.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| AppError::Transport(format!("invalid base URL '{}': {}", base, e)))?;

        let client = Client::builder()
            .timeout(api.timeout())
            .user_agent(api.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError(format!("invalid path '{}': {}", path, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let url = self.build_url(&request.path)?;
        debug!(url = %url, query = ?request.query, "GET request");

        let mut builder = self.client.get(url).query(&request.query);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        debug!(status, bytes = body.len(), "GET response");
        Ok(UpstreamResponse { status, body })
    }
}
