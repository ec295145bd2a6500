//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that stop a transport.
///
/// All of these are fatal: the process cannot serve without a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP listener could not bind its address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP settings cannot be turned into a router.
    #[error("Invalid HTTP configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP server failed while accepting or serving connections.
    #[error("HTTP server error: {0}")]
    ServeError(#[from] std::io::Error),

    /// The MCP handshake over stdio failed.
    #[error("STDIO initialization failed: {0}")]
    InitError(String),

    /// The rmcp service task ended abnormally.
    #[error("Service error: {0}")]
    ServiceError(String),
}

impl TransportError {
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::BindError {
            address: address.into(),
            source,
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn init(msg: impl Into<String>) -> Self {
        Self::InitError(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Self::ServiceError(msg.into())
    }

    /// Whether this error happened before the transport started serving.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::BindError { .. } | Self::InvalidConfig(_) | Self::InitError(_)
        )
    }
}
