//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/cwe-mcp/config.toml` (XDG) or platform config dir
//! 2. Project config: `.cwe-mcp.toml`
//! 3. Environment variables: `CWE_MCP_*`, nested keys separated by `__`
//!
//! Every key has a default, so the server runs without any config file:
//!
//! ```toml
//! [api]
//! base_url = "https://cwe-api.mitre.org/api/v1/"
//! timeout_secs = 15
//! listing_timeout_secs = 60
//!
//! [server]
//! api_key = "secret"   # HTTP transport only; unset disables auth
//! ```
//!
//! Environment example: `CWE_MCP_API__TIMEOUT_SECS=30`.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Public MITRE CWE REST API root.
pub const DEFAULT_BASE_URL: &str = "https://cwe-api.mitre.org/api/v1/";

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = ".cwe-mcp.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CWE_MCP_";

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream CWE API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root; endpoint paths are joined onto it.
    pub base_url: String,
    /// Timeout for ordinary lookups, in seconds.
    pub timeout_secs: u64,
    /// Timeout for full `all` listings, which are much larger.
    pub listing_timeout_secs: u64,
    /// User-Agent header sent upstream.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            listing_timeout_secs: 60,
            user_agent: format!("cwe-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }
}

/// HTTP transport settings for `serve`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bearer token required by the HTTP transport. `None` bypasses auth.
    pub api_key: Option<String>,
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(&Self::user_config_path(), Path::new(PROJECT_CONFIG_FILE))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Layered figment over explicit file locations. Missing files are skipped.
    pub fn figment(user_config: &Path, project_config: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(project_config))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// User config path: ~/.config/cwe-mcp/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("cwe-mcp").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("cwe-mcp").join("config.toml"))
            .unwrap_or_default()
    }
}
