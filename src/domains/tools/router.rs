//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! rmcp-driven transports (STDIO) dispatch through a `ToolRouter`. Each
//! registry entry becomes one route, so the router and the registry can
//! never disagree about which tools exist.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};

use super::registry::{ToolEntry, ToolRegistry};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: &ToolRegistry) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .entries()
        .fold(ToolRouter::new(), |router, entry| {
            router.with_route(create_route(entry))
        })
}

/// Create a ToolRoute dispatching to the entry's handler.
fn create_route<S>(entry: &ToolEntry) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let handler = entry.handler().clone();

    ToolRoute::new_dyn(entry.to_tool(), move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let handler = handler.clone();
        async move {
            let output = handler.execute(args).await.map_err(McpError::from)?;
            output.into_call_tool_result().map_err(McpError::from)
        }
        .boxed()
    })
}
