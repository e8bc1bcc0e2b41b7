//! Query executor.
//!
//! Turns composed queries into request bodies and runs them through an
//! [`IndexClient`]. It adds no filtering of its own. The page-size ceiling is
//! checked again here so a bad page never reaches the index, whoever built
//! the query.

use crate::error::{Error, Result};
use crate::index::{Hit, IndexClient};
use serde_json::Value;
use sm_query::{ComposedQuery, Page};

pub struct SearchGateway<C> {
    client: C,
}

impl<C: IndexClient> SearchGateway<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetch one page of hits.
    ///
    /// A response without a `hits` section is malformed, not an empty page.
    pub async fn search(&self, query: &ComposedQuery, page: Page) -> Result<Vec<Hit>> {
        page.validate()?;

        let mut body = query.to_body();
        body["from"] = page.offset.into();
        if let Some(limit) = page.limit {
            body["size"] = limit.into();
        }

        tracing::debug!(from = page.offset, size = ?page.limit, "Dispatching search");
        let response = self.client.search(body).await?;
        response
            .hits
            .map(|hits| hits.hits)
            .ok_or_else(|| Error::MalformedResponse("search response has no hits".to_string()))
    }

    /// Number of documents matching the query.
    pub async fn count(&self, query: &ComposedQuery) -> Result<u64> {
        let body = serde_json::json!({ "query": query.query_json() });
        tracing::debug!("Dispatching count");
        self.client.count(body).await
    }

    /// Run `aggs` over the matching documents and return the raw
    /// `aggregations` section. No hits are fetched.
    pub async fn aggregate(&self, query: &ComposedQuery, aggs: Value) -> Result<Value> {
        let body = serde_json::json!({
            "query": query.query_json(),
            "size": 0,
            "aggs": aggs,
        });

        tracing::debug!("Dispatching aggregation");
        let response = self.client.search(body).await?;
        response.aggregations.ok_or_else(|| {
            Error::MalformedResponse("aggregation response has no aggregations".to_string())
        })
    }
}
