//! In-memory backend for tests and local demos.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use super::{Backend, BackendError};
use crate::models::{Identity, Membership, Organization, Profile, Role};

#[derive(Default)]
struct Tables {
    sessions: HashMap<String, Identity>,
    profiles: HashMap<Uuid, Profile>,
    orgs: Vec<Organization>,
    memberships: Vec<Membership>,
    missing_relations: HashSet<String>,
    unavailable: bool,
}

/// Backend holding its rows in memory. Relations can be marked missing to
/// simulate an unprovisioned schema, or the whole backend marked unavailable.
#[derive(Default)]
pub struct InMemoryBackend {
    tables: Mutex<Tables>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> Result<T, BackendError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|e| BackendError::Unavailable(anyhow::anyhow!("Mock backend mutex poisoned: {}", e)))?;
        Ok(f(&mut tables))
    }

    /// Seeding never fails: a lock poisoned by a panicking test still holds valid rows.
    fn seed(&self, f: impl FnOnce(&mut Tables)) {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tables);
    }

    fn check(tables: &Tables, relation: &str) -> Result<(), BackendError> {
        if tables.unavailable {
            return Err(BackendError::Unavailable(anyhow::anyhow!(
                "connection refused"
            )));
        }
        if tables.missing_relations.contains(relation) {
            return Err(BackendError::relation_missing(relation));
        }
        Ok(())
    }

    /// Register a session token for `identity`.
    pub fn add_session(&self, token: &str, identity: Identity) {
        self.seed(|t| {
            t.sessions.insert(token.to_string(), identity);
        });
    }

    pub fn add_profile(&self, profile: Profile) {
        self.seed(|t| {
            t.profiles.insert(profile.id, profile);
        });
    }

    pub fn add_org(&self, org: Organization) {
        self.seed(|t| t.orgs.push(org));
    }

    pub fn add_membership(&self, membership: Membership) {
        self.seed(|t| t.memberships.push(membership));
    }

    /// Make every query against `relation` fail with "relation does not exist".
    pub fn drop_relation(&self, relation: &str) {
        self.seed(|t| {
            t.missing_relations.insert(relation.to_string());
        });
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.seed(|t| t.unavailable = unavailable);
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn current_identity(&self, token: &str) -> Result<Option<Identity>, BackendError> {
        self.with_tables(|t| t.sessions.get(token).cloned())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        self.with_tables(|t| -> Result<_, BackendError> {
            Self::check(t, "profiles")?;
            Ok(t.profiles.get(&user_id).cloned())
        })?
    }

    async fn fetch_org_by_slug(&self, slug: &str) -> Result<Option<Organization>, BackendError> {
        self.with_tables(|t| -> Result<_, BackendError> {
            Self::check(t, "orgs")?;
            Ok(t.orgs.iter().find(|o| o.slug == slug).cloned())
        })?
    }

    async fn fetch_active_membership(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Membership>, BackendError> {
        self.with_tables(|t| -> Result<_, BackendError> {
            Self::check(t, "memberships")?;
            Ok(t
                .memberships
                .iter()
                .find(|m| m.user_id == user_id && m.org_id == org_id && m.is_active)
                .cloned())
        })?
    }

    async fn has_super_admin_membership(&self, user_id: Uuid) -> Result<bool, BackendError> {
        self.with_tables(|t| -> Result<_, BackendError> {
            Self::check(t, "memberships")?;
            Ok(t.memberships.iter().any(|m| {
                m.user_id == user_id && m.is_active && m.role == Role::SuperAdmin.as_str()
            }))
        })?
    }

    async fn list_active_memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Membership, Organization)>, BackendError> {
        self.with_tables(|t| -> Result<_, BackendError> {
            Self::check(t, "memberships")?;
            Self::check(t, "orgs")?;
            let mut rows: Vec<(Membership, Organization)> = t
                .memberships
                .iter()
                .filter(|m| m.user_id == user_id && m.is_active)
                .filter_map(|m| {
                    t.orgs
                        .iter()
                        .find(|o| o.id == m.org_id)
                        .map(|o| (m.clone(), o.clone()))
                })
                .collect();
            rows.sort_by(|a, b| a.1.name.cmp(&b.1.name));
            Ok(rows)
        })?
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        self.with_tables(|t| -> Result<_, BackendError> {
            if t.unavailable {
                Err(BackendError::Unavailable(anyhow::anyhow!("connection refused")))
            } else {
                Ok(())
            }
        })?
    }
}
