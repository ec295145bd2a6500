//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry mapping tool names to descriptors and handlers
//! - Dispatch for tool calls from any transport
//! - Tool metadata for listing
//!
//! The registry is filled once at startup by [`build_registry`] and is
//! read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use tracing::{debug, warn};

use super::definitions::SecurityIncidentsTool;
use super::error::ToolError;
use super::handlers::{ToolHandler, ToolOutput};
use crate::core::config::Config;

// ============================================================================
// Tool Entry
// ============================================================================

/// A registered tool: name, description and handler.
#[derive(Clone)]
pub struct ToolEntry {
    name: String,
    description: String,
    handler: Arc<dyn ToolHandler>,
}

impl ToolEntry {
    /// The tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The handler invoked for calls to this tool.
    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Create a Tool model for this entry (metadata).
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: self.handler.input_schema(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

impl fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolEntry>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`.
    ///
    /// The first registration of a name wins. Later registrations of the
    /// same name are ignored and reported by returning `false`.
    pub fn register<H>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: H,
    ) -> bool
    where
        H: ToolHandler + 'static,
    {
        let name = name.into();
        if self.tools.contains_key(&name) {
            warn!("Tool already registered, ignoring: {}", name);
            return false;
        }

        debug!("Registering tool: {}", name);
        self.tools.insert(
            name.clone(),
            ToolEntry {
                name,
                description: description.into(),
                handler: Arc::new(handler),
            },
        );
        true
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.tools.get(name)
    }

    /// Iterate over registered tools in name order.
    pub fn entries(&self) -> impl Iterator<Item = &ToolEntry> {
        self.tools.values()
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn tools(&self) -> Vec<Tool> {
        self.entries().map(ToolEntry::to_tool).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a tool call to the matching handler.
    pub async fn call(&self, name: &str, arguments: JsonObject) -> Result<ToolOutput, ToolError> {
        let entry = self.get(name).ok_or_else(|| {
            warn!("Unknown tool requested: {}", name);
            ToolError::not_found(name)
        })?;

        entry.handler.execute(arguments).await
    }
}

/// Build the registry with every tool this server exposes.
pub fn build_registry(config: &Config) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    SecurityIncidentsTool::from_config(config).register(&mut registry);
    registry
}
