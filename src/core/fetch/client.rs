//! JSON fetcher over HTTP GET.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::{ErrorIndicator, FetchError};

/// Fetches a single JSON document from a fixed URL.
///
/// The client is immutable after construction, so one fetcher can be shared
/// across concurrent invocations. Every call issues a fresh request.
#[derive(Debug, Clone)]
pub struct JsonFetcher {
    client: reqwest::Client,
    url: String,
}

impl JsonFetcher {
    /// Create a fetcher for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// The URL this fetcher targets.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the document, reporting failures as `FetchError`.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn try_fetch(&self) -> Result<Value, FetchError> {
        debug!("Requesting JSON document");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(&self.url, status));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::from_reqwest(&self.url, e))?;

        debug!("Received JSON document");
        Ok(value)
    }

    /// Fetch the document, converting any failure into an error indicator.
    pub async fn fetch(&self) -> Value {
        match self.try_fetch().await {
            Ok(value) => value,
            Err(e) => {
                warn!("JSON fetch failed: {}", e);
                ErrorIndicator::from(e).into_value()
            }
        }
    }
}

/// One-shot fail-soft fetch of `url`.
pub async fn fetch_json_data(url: &str) -> Value {
    JsonFetcher::new(url).fetch().await
}
