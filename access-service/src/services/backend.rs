//! The hosted persistence/auth backend, as seen by the authorization layer.
//!
//! Every call is a read. Nothing returned here is cached between requests.

use async_trait::async_trait;
use uuid::Uuid;

use super::BackendError;
use crate::models::{Identity, Membership, Organization, Profile};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Identity behind a session token; `None` when the token is absent, expired or forged.
    async fn current_identity(&self, token: &str) -> Result<Option<Identity>, BackendError>;

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError>;

    async fn fetch_org_by_slug(&self, slug: &str) -> Result<Option<Organization>, BackendError>;

    /// The single active membership for (user, org), if any.
    async fn fetch_active_membership(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Membership>, BackendError>;

    /// Whether the user holds an active `super_admin` membership in any organization.
    async fn has_super_admin_membership(&self, user_id: Uuid) -> Result<bool, BackendError>;

    /// Active memberships with their organizations, for the org-selection screen.
    async fn list_active_memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Membership, Organization)>, BackendError>;

    async fn health_check(&self) -> Result<(), BackendError>;
}
