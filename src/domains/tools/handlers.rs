//! Tool handler seam.
//!
//! Every registered tool implements [`ToolHandler`]. Handlers return a
//! [`ToolOutput`], the JSON value handed back to the client, which both
//! transports render the same way.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::{Deserialize, Serialize};

use super::error::ToolError;

/// Output from a tool execution.
///
/// Wraps the JSON value a tool produced. Error indicators are ordinary
/// outputs here, so success and failure payloads share one wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolOutput {
    data: serde_json::Value,
}

impl ToolOutput {
    /// Wrap a JSON value.
    pub fn new(data: serde_json::Value) -> Self {
        Self { data }
    }

    /// The JSON value produced by the tool.
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Render as an MCP tool result holding one JSON text block.
    pub fn into_call_tool_result(self) -> Result<CallToolResult, ToolError> {
        let text = serde_json::to_string(&self.data)
            .map_err(|e| ToolError::internal(format!("Failed to serialize tool output: {}", e)))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// Trait for implementing tool handlers.
///
/// A handler carries no per-call mutable state; the registry shares one
/// instance across all transports and sessions.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// JSON schema describing the tool's arguments.
    fn input_schema(&self) -> Arc<JsonObject>;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: JsonObject) -> Result<ToolOutput, ToolError>;
}
