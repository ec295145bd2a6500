//! Upstream JSON fetching.
//!
//! The fetcher is fail-soft at its outer edge: `JsonFetcher::try_fetch`
//! returns a tagged `Result`, and `JsonFetcher::fetch` flattens failures into
//! an `{"error": "..."}` value so callers always receive JSON.

mod client;
mod error;

pub use client::{JsonFetcher, fetch_json_data};
pub use error::{ErrorIndicator, FetchError};
