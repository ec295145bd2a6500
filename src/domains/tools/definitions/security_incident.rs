//! Government information security incidents tool.
//!
//! Returns the yearly incident statistics published by the Digital Policy
//! Office (GovCERT.HK) exactly as the upstream feed serves them. Each record
//! looks like `{"year": 2025, "incident": [{"type": "...", "number": 1}]}`,
//! but the tool never inspects or reshapes it.

use std::sync::Arc;

use rmcp::{handler::server::tool::cached_schema_for_type, model::JsonObject};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::config::Config;
use crate::core::fetch::JsonFetcher;
use crate::domains::tools::{ToolError, ToolHandler, ToolOutput, ToolRegistry};

// ============================================================================
// Tool Parameters
// ============================================================================

/// The tool takes no arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SecurityIncidentsParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// Security incidents tool - passes the GovCERT.HK incidents feed through.
#[derive(Debug, Clone)]
pub struct SecurityIncidentsTool {
    fetcher: JsonFetcher,
}

impl SecurityIncidentsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_security_incidents";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Number of Government information security incidents reported to Digital Policy Office in Hong Kong";

    /// Create the tool around an existing fetcher.
    pub fn new(fetcher: JsonFetcher) -> Self {
        Self { fetcher }
    }

    /// Create the tool for the incidents URL in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(JsonFetcher::new(config.upstream.incidents_url.clone()))
    }

    /// The upstream URL queried on each call.
    pub fn url(&self) -> &str {
        self.fetcher.url()
    }

    /// Fetch the incidents feed.
    ///
    /// Returns the upstream list of yearly records unchanged, or an
    /// `{"error": "..."}` object when the fetch or decode fails.
    #[instrument(skip(self), fields(url = %self.fetcher.url()))]
    pub async fn get_security_incidents(&self) -> serde_json::Value {
        info!("Fetching government security incident statistics");
        self.fetcher.fetch().await
    }

    /// Register this tool in `registry`.
    ///
    /// Returns `false` if a tool with the same name was already registered.
    pub fn register(self, registry: &mut ToolRegistry) -> bool {
        registry.register(Self::NAME, Self::DESCRIPTION, self)
    }
}

#[async_trait::async_trait]
impl ToolHandler for SecurityIncidentsTool {
    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SecurityIncidentsParams>()
    }

    async fn execute(&self, arguments: JsonObject) -> Result<ToolOutput, ToolError> {
        let _params: SecurityIncidentsParams =
            serde_json::from_value(serde_json::Value::Object(arguments))
                .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        Ok(ToolOutput::new(self.get_security_incidents().await))
    }
}
