//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the release gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Upstream GitHub API settings (releases and gists).
    pub github: GithubConfig,

    /// Stats aggregation settings.
    pub stats: StatsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// The credential used for every upstream call, if configured.
    pub fn token(&self) -> Option<&str> {
        non_empty(self.github.token.as_deref())
    }

    /// The gist holding the stats document, if configured.
    pub fn gist_id(&self) -> Option<&str> {
        non_empty(self.stats.gist_id.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Upper bound on a single request, standing in for the host's own limit.
    pub request_timeout_secs: u64,

    /// Maximum accepted size of a stats request body.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// GitHub API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GithubConfig {
    /// REST API base URL.
    pub api_base_url: String,

    /// Owner of the repository publishing releases.
    pub owner: String,

    /// Repository publishing releases.
    pub repository: String,

    /// User-Agent sent on every upstream request.
    pub user_agent: String,

    /// Server-side credential. Normally supplied through `GITHUB_TOKEN`.
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            owner: "Persistence-AI".to_string(),
            repository: "Landing".to_string(),
            user_agent: "PersistenceAI-Installer".to_string(),
            token: None,
        }
    }
}

// Hand-written so the credential never lands in logs.
impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_base_url", &self.api_base_url)
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("user_agent", &self.user_agent)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Stats document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Gist holding the stats document. Normally supplied through `GIST_ID`.
    pub gist_id: Option<String>,

    /// File inside the gist. When unset the first file of the gist is used.
    pub file_name: Option<String>,

    /// The single origin allowed to post stats from a browser.
    pub allowed_origin: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            gist_id: None,
            file_name: None,
            allowed_origin: "https://persistence-ai.github.io".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
