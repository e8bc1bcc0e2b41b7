//! Elasticsearch HTTP client

use super::{IndexClient, SearchResponse};
use crate::config::ElasticsearchConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Longest slice of an error body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Client bound to one index.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: Client,
    search_url: Url,
    count_url: Url,
    credentials: Option<(String, String)>,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

impl ElasticsearchClient {
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut base = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("elasticsearch.url is invalid: {}", e)))?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = |action: &str| {
            base.join(&format!("{}/{}", config.index, action))
                .map_err(|e| Error::Config(format!("cannot build {} url: {}", action, e)))
        };

        let credentials = config.username.clone().zip(config.password.clone());

        Ok(Self {
            search_url: endpoint("_search")?,
            count_url: endpoint("_count")?,
            client,
            credentials,
        })
    }

    async fn post(&self, url: &Url, body: &Value) -> Result<Response> {
        let mut request = self.client.post(url.clone()).json(body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let mut detail = response.text().await.unwrap_or_default();
        if detail.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !detail.is_char_boundary(cut) {
                cut -= 1;
            }
            detail.truncate(cut);
        }
        tracing::warn!(%status, url = %url, "Index request failed");
        Err(Error::UpstreamUnavailable(format!(
            "{} returned {}: {}",
            url.path(),
            status,
            detail
        )))
    }
}

#[async_trait]
impl IndexClient for ElasticsearchClient {
    async fn search(&self, body: Value) -> Result<SearchResponse> {
        let response = self.post(&self.search_url, &body).await?;
        Ok(response.json().await?)
    }

    async fn count(&self, body: Value) -> Result<u64> {
        let response = self.post(&self.count_url, &body).await?;
        let count: CountResponse = response.json().await?;
        Ok(count.count)
    }
}
