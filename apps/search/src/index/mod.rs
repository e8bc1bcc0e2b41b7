//! Document index seam.
//!
//! [`IndexClient`] is the only I/O boundary of the service. The gateway is
//! generic over it so tests can substitute an in-process implementation.

pub mod elasticsearch;

use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub use elasticsearch::ElasticsearchClient;

/// Executes request bodies against the index.
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Run a search body (`query`, `sort`, `from`, `size`, `aggs`).
    async fn search(&self, body: Value) -> Result<SearchResponse>;

    /// Count documents matching a body holding only `query`.
    async fn count(&self, body: Value) -> Result<u64>;
}

#[async_trait]
impl<T: IndexClient + ?Sized> IndexClient for std::sync::Arc<T> {
    async fn search(&self, body: Value) -> Result<SearchResponse> {
        (**self).search(body).await
    }

    async fn count(&self, body: Value) -> Result<u64> {
        (**self).count(body).await
    }
}

/// Body of a search answer.
///
/// `hits` is optional so aggregation-only answers decode; the gateway
/// rejects a page request whose answer lacks it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Option<Hits>,
    #[serde(default)]
    pub aggregations: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits {
    pub hits: Vec<Hit>,
}

/// One matched document.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Value,
}
