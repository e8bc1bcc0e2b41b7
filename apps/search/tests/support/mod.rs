//! Test doubles for the index and the role resolver.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use sm_query::{QueryComposer, RequesterIdentity, RoleMap};
use sm_search::index::{IndexClient, SearchResponse};
use sm_search::{Error, RequestContext, Result, RoleResolver, SearchGateway, SearchService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(Value),
    Count(Value),
}

/// Index client that records every request and replays canned answers.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    search_response: Mutex<Value>,
    count: Mutex<u64>,
    unavailable: Mutex<bool>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        let client = Self::default();
        *client.search_response.lock().unwrap() = json!({ "hits": { "hits": [] } });
        Arc::new(client)
    }

    pub fn respond_with(&self, response: Value) {
        *self.search_response.lock().unwrap() = response;
    }

    pub fn count_with(&self, count: u64) {
        *self.count.lock().unwrap() = count;
    }

    pub fn go_down(&self) {
        *self.unavailable.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Value {
        match self.calls().last().expect("no index call recorded") {
            Call::Search(body) | Call::Count(body) => body.clone(),
        }
    }

    fn check_up(&self) -> Result<()> {
        if *self.unavailable.lock().unwrap() {
            return Err(Error::UpstreamUnavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl IndexClient for RecordingClient {
    async fn search(&self, body: Value) -> Result<SearchResponse> {
        self.calls.lock().unwrap().push(Call::Search(body));
        self.check_up()?;
        let response = self.search_response.lock().unwrap().clone();
        Ok(serde_json::from_value(response).expect("canned response must decode"))
    }

    async fn count(&self, body: Value) -> Result<u64> {
        self.calls.lock().unwrap().push(Call::Count(body));
        self.check_up()?;
        Ok(*self.count.lock().unwrap())
    }
}

/// Role resolver that counts lookups.
#[derive(Default)]
pub struct CountingResolver {
    pub roles: RoleMap,
    lookups: AtomicUsize,
}

impl CountingResolver {
    pub fn new(roles: RoleMap) -> Arc<Self> {
        Arc::new(Self {
            roles,
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleResolver for CountingResolver {
    async fn project_roles(&self, _user_id: &str) -> Result<RoleMap> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.roles.clone())
    }
}

/// Resolver whose backend refuses every lookup.
pub struct RefusingResolver;

#[async_trait]
impl RoleResolver for RefusingResolver {
    async fn project_roles(&self, user_id: &str) -> Result<RoleMap> {
        Err(Error::Unauthorized(format!("role lookup refused for {}", user_id)))
    }
}

pub const DEFAULT_LIMIT: u64 = 20;

pub fn service(client: &Arc<RecordingClient>) -> SearchService<Arc<RecordingClient>> {
    SearchService::new(
        SearchGateway::new(client.clone()),
        QueryComposer::new(vec!["[M]+".to_string(), "[M]-".to_string()]),
        DEFAULT_LIMIT,
    )
}

pub fn context(identity: RequesterIdentity, resolver: Arc<CountingResolver>) -> RequestContext {
    RequestContext::new(identity, resolver)
}

/// The `filter` list of a recorded body.
pub fn filters(body: &Value) -> Vec<Value> {
    body["query"]["bool"]["filter"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}
