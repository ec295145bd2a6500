//! Fetch error types and the error indicator payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while fetching a JSON document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the response could not be read.
    #[error("Failed to fetch data from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status.
    #[error("Failed to fetch data from {url}: HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The response body is not valid JSON.
    #[error("Failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Classify a reqwest failure for the given URL.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_decode() {
            Self::Decode { url, source }
        } else {
            Self::Request { url, source }
        }
    }

    /// Create a status error.
    pub fn status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }
}

/// The `{"error": "<message>"}` value returned in place of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorIndicator {
    pub error: String,
}

impl ErrorIndicator {
    /// Create an indicator with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Render as a JSON object.
    pub fn into_value(self) -> Value {
        serde_json::json!({ "error": self.error })
    }
}

impl From<&FetchError> for ErrorIndicator {
    fn from(err: &FetchError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<FetchError> for ErrorIndicator {
    fn from(err: FetchError) -> Self {
        Self::from(&err)
    }
}
