//! Project role resolution.
//!
//! Roles come from an external collaborator and are looked up at most once
//! per request. [`RequestContext`] owns that memo: every operation run under
//! the same context sees the same role map.

use crate::Result;
use async_trait::async_trait;
use sm_query::{ProjectRole, Requester, RequesterIdentity, RoleMap};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Looks up a user's roles in every project they relate to.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn project_roles(&self, user_id: &str) -> Result<RoleMap>;
}

/// Resolver backed by a fixed table. Unknown users have no roles.
#[derive(Debug, Clone, Default)]
pub struct FixedRoles {
    by_user: HashMap<String, RoleMap>,
}

impl FixedRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>, roles: RoleMap) -> Self {
        self.by_user.insert(user_id.into(), roles);
        self
    }
}

#[async_trait]
impl RoleResolver for FixedRoles {
    async fn project_roles(&self, user_id: &str) -> Result<RoleMap> {
        Ok(self.by_user.get(user_id).cloned().unwrap_or_default())
    }
}

/// Parse `PROJECT=ROLE`, e.g. `p1=MEMBER`.
pub fn parse_role_assignment(raw: &str) -> std::result::Result<(String, ProjectRole), String> {
    let (project, role) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PROJECT=ROLE, got {}", raw))?;
    if project.is_empty() {
        return Err(format!("missing project id in {}", raw));
    }
    let role: ProjectRole =
        serde_json::from_value(serde_json::Value::String(role.to_ascii_uppercase()))
            .map_err(|_| format!("unknown project role {}", role))?;
    Ok((project.to_string(), role))
}

/// Identity of one request plus its lazily resolved roles.
pub struct RequestContext {
    identity: RequesterIdentity,
    resolver: Arc<dyn RoleResolver>,
    roles: OnceCell<RoleMap>,
}

impl RequestContext {
    pub fn new(identity: RequesterIdentity, resolver: Arc<dyn RoleResolver>) -> Self {
        Self {
            identity,
            resolver,
            roles: OnceCell::new(),
        }
    }

    /// The requester with resolved roles. Anonymous callers, including a
    /// blank user id, get an empty role map without a lookup.
    pub async fn requester(&self) -> Result<Requester> {
        let roles = self
            .roles
            .get_or_try_init(|| async {
                match self.identity.user_id() {
                    Some(user_id) => {
                        tracing::debug!(user_id, "Resolving project roles");
                        self.resolver.project_roles(user_id).await
                    }
                    None => Ok(RoleMap::new()),
                }
            })
            .await?;

        Ok(Requester::new(self.identity.clone(), roles.clone()))
    }
}
