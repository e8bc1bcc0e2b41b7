//! Search service over the dataset/annotation index.
//!
//! - [`gateway::SearchGateway`] executes composed queries through an [`index::IndexClient`]
//! - [`roles::RequestContext`] resolves project roles once per request
//! - [`services::SearchService`] is the inbound API: search, counts, lookups
//!
//! Query construction lives in the `sm-query` crate.

pub mod config;
pub mod error;
pub mod gateway;
pub mod index;
pub mod logging;
pub mod roles;
pub mod services;

pub use config::Config;
pub use error::{Error, Result};
pub use gateway::SearchGateway;
pub use index::{ElasticsearchClient, Hit, IndexClient};
pub use roles::{FixedRoles, RequestContext, RoleResolver};
pub use services::SearchService;

use sm_query::QueryComposer;

/// Build the service against the configured Elasticsearch index.
pub fn build_service(config: &Config) -> Result<SearchService<ElasticsearchClient>> {
    let client = ElasticsearchClient::new(&config.elasticsearch)?;
    Ok(SearchService::new(
        SearchGateway::new(client),
        QueryComposer::new(config.search.hidden_adducts.clone()),
        config.search.default_limit,
    ))
}
