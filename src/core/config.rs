//! Configuration management for the MCP server.
//!
//! A single [`Config`] is assembled at startup and passed by value into the
//! server and transport. Sources, lowest precedence first: built-in
//! defaults, a `.env` file, environment variables, then command-line flags
//! (applied by `crate::cli`).

use super::error::Result;
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};

/// Upstream feed of government information security incidents.
pub const DEFAULT_INCIDENTS_URL: &str = "https://www.govcert.gov.hk/en/incidents.json";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream data source configuration.
    pub upstream: UpstreamConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Upstream endpoints queried by the tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// URL of the incidents JSON feed.
    pub incidents_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            incidents_url: DEFAULT_INCIDENTS_URL.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "HK OpenAI tech Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_TRANSPORT`.
    /// A `.env` file in the working directory is read first; it never
    /// overrides variables that are already set.
    ///
    /// Runs before logging is initialized, so problems are returned as
    /// errors rather than logged.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env()?;

        if let Ok(url) = std::env::var("MCP_INCIDENTS_URL") {
            config.upstream.incidents_url = url;
        }

        Ok(config)
    }
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
