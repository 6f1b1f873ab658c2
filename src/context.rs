//! Application context shared by every tool call.

use std::sync::Arc;

use crate::client::CweClient;
use crate::config::ApiConfig;
use crate::error::AppError;

/// Root application context.
///
/// Built once at startup from explicit configuration; tools borrow the
/// client from here instead of reading process state.
#[derive(Clone)]
pub struct Context {
    /// Upstream CWE API client.
    pub client: Arc<CweClient>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(client: CweClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Builds the HTTP-backed client described by `api`.
    pub fn from_config(api: &ApiConfig) -> Result<Self, AppError> {
        let client = CweClient::from_config(api)?;
        tracing::info!(base_url = %api.base_url, "CWE API client ready");
        Ok(Self::new(client))
    }
}
