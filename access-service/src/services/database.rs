//! PostgreSQL implementation of the backend collaborator.
//!
//! Reads `profiles`, `orgs` and `memberships`. Identity comes from the
//! session token alone; the user store itself is never queried.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::{Backend, BackendError, SessionVerifier};
use crate::models::{Identity, Membership, Organization, Profile, Role};

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
    sessions: SessionVerifier,
}

impl PgBackend {
    pub fn new(pool: PgPool, sessions: SessionVerifier) -> Self {
        Self { pool, sessions }
    }
}

#[derive(sqlx::FromRow)]
struct MembershipWithOrg {
    #[sqlx(flatten)]
    membership: Membership,
    org_slug: String,
    org_name: String,
    #[sqlx(json)]
    org_settings: crate::models::OrgSettings,
    org_created_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl Backend for PgBackend {
    async fn current_identity(&self, token: &str) -> Result<Option<Identity>, BackendError> {
        match self.sessions.verify(token) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                Ok(None)
            }
        }
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        Ok(sqlx::query_as::<_, Profile>(
            "SELECT id, full_name, phone, avatar_url FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn fetch_org_by_slug(&self, slug: &str) -> Result<Option<Organization>, BackendError> {
        Ok(sqlx::query_as::<_, Organization>(
            "SELECT id, slug, name, settings, created_at FROM orgs WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn fetch_active_membership(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Membership>, BackendError> {
        Ok(sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, org_id, role, branch_id, is_active, created_at
            FROM memberships
            WHERE user_id = $1 AND org_id = $2 AND is_active = true
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn has_super_admin_membership(&self, user_id: Uuid) -> Result<bool, BackendError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM memberships
            WHERE user_id = $1 AND role = $2 AND is_active = true
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(Role::SuperAdmin.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn list_active_memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Membership, Organization)>, BackendError> {
        let rows = sqlx::query_as::<_, MembershipWithOrg>(
            r#"
            SELECT m.id, m.user_id, m.org_id, m.role, m.branch_id, m.is_active, m.created_at,
                   o.slug AS org_slug, o.name AS org_name,
                   o.settings AS org_settings, o.created_at AS org_created_at
            FROM memberships m
            JOIN orgs o ON o.id = m.org_id
            WHERE m.user_id = $1 AND m.is_active = true
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let org = Organization {
                    id: row.membership.org_id,
                    slug: row.org_slug,
                    name: row.org_name,
                    settings: row.org_settings,
                    created_at: row.org_created_at,
                };
                (row.membership, org)
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                BackendError::from(e)
            })?;
        Ok(())
    }
}
