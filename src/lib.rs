//! HK Tech MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing one tool,
//! `get_security_incidents`, which returns the Hong Kong Government
//! information security incident statistics published by the Digital Policy
//! Office, passed through verbatim from the GovCERT.HK JSON feed.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, upstream JSON fetching, the MCP server
//!   handler and the transports (STDIO, streamable HTTP)
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: the tool registry, router and tool definitions
//! - **cli**: command-line flags layered over the environment
//!
//! # Example
//!
//! ```rust,no_run
//! use hk_tech_mcp_server::{core::Config, core::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = McpServer::new(config);
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
