//! Visibility filter.
//!
//! Visibility is enforced by what the composed query can match, never by a
//! runtime check on fetched documents. Every document carries its dataset's
//! visibility attributes, so the filter is evaluated per document.
//!
//! Building the filter never performs I/O: the caller resolves the
//! requester's project roles first and passes them in.

use crate::clause::Clause;
use crate::error::{QueryError, Result};
use crate::fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user's relationship to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectRole {
    Invited,
    Pending,
    Member,
    Manager,
    Reviewer,
}

impl ProjectRole {
    /// Whether this role lets the user see the project's private datasets.
    pub fn grants_visibility(self) -> bool {
        matches!(self, Self::Member | Self::Manager | Self::Reviewer)
    }
}

/// Project id -> the requester's role in that project.
///
/// Projects the requester has no relationship with are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMap(BTreeMap<String, ProjectRole>);

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, project_id: impl Into<String>, role: ProjectRole) {
        self.0.insert(project_id.into(), role);
    }

    pub fn get(&self, project_id: &str) -> Option<ProjectRole> {
        self.0.get(project_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids of projects whose private datasets the requester may see, sorted.
    pub fn visible_project_ids(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, role)| role.grants_visibility())
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, ProjectRole)> for RoleMap {
    fn from_iter<I: IntoIterator<Item = (K, ProjectRole)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Who is asking. A missing or blank `id` is an anonymous caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterIdentity {
    pub id: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub group_ids: Option<Vec<String>>,
}

impl RequesterIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            is_admin: true,
            group_ids: None,
        }
    }

    pub fn with_groups<I, S>(mut self, group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_ids = Some(group_ids.into_iter().map(Into::into).collect());
        self
    }

    /// The caller's id, unless missing or blank.
    pub fn user_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id().is_none()
    }

    /// Admin rights only count for an identified caller.
    pub fn is_effective_admin(&self) -> bool {
        self.is_admin && !self.is_anonymous()
    }
}

/// Project roles as seen by the composer.
///
/// `Pending` is a caller bug, not "no roles": composing against it fails
/// with [`QueryError::RolesUnavailable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleMapState {
    Pending,
    Ready(RoleMap),
}

/// Identity plus resolved project roles for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub identity: RequesterIdentity,
    pub roles: RoleMapState,
}

impl Requester {
    pub fn new(identity: RequesterIdentity, roles: RoleMap) -> Self {
        Self {
            identity,
            roles: RoleMapState::Ready(roles),
        }
    }

    /// A requester whose roles have not been resolved yet.
    pub fn pending(identity: RequesterIdentity) -> Self {
        Self {
            identity,
            roles: RoleMapState::Pending,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(RequesterIdentity::anonymous(), RoleMap::new())
    }

    pub fn roles(&self) -> Result<&RoleMap> {
        match &self.roles {
            RoleMapState::Ready(roles) => Ok(roles),
            RoleMapState::Pending => Err(QueryError::RolesUnavailable),
        }
    }

    /// The clause to AND into every query for this requester.
    pub fn visibility_filter(&self) -> Result<Option<Clause>> {
        Ok(visibility_filter(&self.identity, self.roles()?))
    }
}

/// Build the visibility clause for a requester.
///
/// Returns `None` for admins (no restriction). Otherwise returns a single OR
/// group that always contains "dataset is public", so an anonymous caller or
/// a user without memberships still gets a restricting clause.
pub fn visibility_filter(identity: &RequesterIdentity, roles: &RoleMap) -> Option<Clause> {
    if identity.is_effective_admin() {
        return None;
    }

    let mut should = vec![Clause::term(fields::DS_IS_PUBLIC, true)];

    // Anonymous callers see public datasets only.
    let Some(user_id) = identity.user_id() else {
        return Some(Clause::any_of(should));
    };

    should.push(Clause::term(fields::DS_SUBMITTER_ID, user_id));

    if let Some(group_ids) = identity.group_ids.as_ref().filter(|ids| !ids.is_empty()) {
        should.push(Clause::all_of(vec![
            Clause::terms(fields::DS_GROUP_ID, group_ids.iter().map(String::as_str)),
            Clause::term(fields::DS_GROUP_APPROVED, true),
        ]));
    }

    let project_ids = roles.visible_project_ids();
    if !project_ids.is_empty() {
        should.push(Clause::terms(fields::DS_PROJECT_IDS, project_ids));
    }

    Some(Clause::any_of(should))
}
