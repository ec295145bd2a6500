//! Transport configuration types.

use serde::{Deserialize, Serialize};

use crate::core::Result;

#[cfg(feature = "http")]
use crate::core::Error;

#[cfg(feature = "http")]
use super::{TransportError, TransportResult};

/// Routes the HTTP transport serves next to the JSON-RPC endpoint.
#[cfg(feature = "http")]
const RESERVED_PATHS: &[&str] = &["/health"];

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,

    /// Streamable HTTP transport with JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(feature = "http")]
fn default_port() -> u16 {
    8000
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(all(not(feature = "stdio"), feature = "http"))]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Load HTTP settings from `MCP_HTTP_*` environment variables.
    ///
    /// Unset values fall back to the defaults. An unparsable port or an
    /// unusable endpoint path is a configuration error.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("MCP_HTTP_PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                Error::config(format!("MCP_HTTP_PORT `{}` is not a valid port", raw))
            })?,
            Err(_) => default_port(),
        };
        let host = std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host());
        let rpc_path = std::env::var("MCP_HTTP_PATH")
            .map(|p| normalize_rpc_path(&p))
            .unwrap_or_else(|_| default_rpc_path());
        validate_rpc_path(&rpc_path).map_err(|e| Error::config(e.to_string()))?;
        let enable_cors = std::env::var("MCP_HTTP_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or_else(|_| default_cors());

        Ok(Self {
            port,
            host,
            rpc_path,
            enable_cors,
        })
    }

    /// The `host:port` bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Normalize an endpoint path: surrounding whitespace and slashes are
/// dropped, then a single leading slash is added.
#[cfg(feature = "http")]
pub fn normalize_rpc_path(raw: &str) -> String {
    format!("/{}", raw.trim().trim_matches('/'))
}

/// Check that a normalized endpoint path can be mounted on the router.
#[cfg(feature = "http")]
pub fn validate_rpc_path(path: &str) -> TransportResult<()> {
    if !path.starts_with('/') {
        return Err(TransportError::invalid_config(format!(
            "endpoint path `{}` must start with `/`",
            path
        )));
    }
    if RESERVED_PATHS.contains(&path) {
        return Err(TransportError::invalid_config(format!(
            "endpoint path `{}` is already used by the server",
            path
        )));
    }
    if path.contains(['{', '}', '*']) {
        return Err(TransportError::invalid_config(format!(
            "endpoint path `{}` must not contain route parameters",
            path
        )));
    }
    Ok(())
}

impl TransportConfig {
    /// Load transport config from environment variables.
    ///
    /// `MCP_TRANSPORT` selects the transport: `http` (aliases `sse`,
    /// `streamable-http`) or `stdio`. Anything else means the default.
    pub fn from_env() -> Result<Self> {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "http")]
            "http" | "sse" | "streamable-http" => Ok(Self::Http(HttpConfig::from_env()?)),
            #[cfg(feature = "stdio")]
            _ => Ok(Self::Stdio),
            #[cfg(all(not(feature = "stdio"), feature = "http"))]
            _ => Ok(Self::Http(HttpConfig::from_env()?)),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}{}", cfg.address(), cfg.rpc_path),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }

    /// The HTTP settings, if this is the HTTP transport.
    #[cfg(feature = "http")]
    pub fn as_http(&self) -> Option<&HttpConfig> {
        match self {
            Self::Http(cfg) => Some(cfg),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}
