//! Request-time auth context resolution.
//!
//! Resolution only gathers data. Missing session, profile, organization or
//! membership show up as `None`; callers decide what absence means.

use serde::Serialize;

use super::{permissions, Backend};
use crate::models::{Identity, Membership, Organization, Profile, Role};
use service_core::error::AppError;

/// Everything known about the caller for one request. Built fresh per call.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub identity: Identity,
    pub profile: Option<Profile>,
    pub membership: Option<Membership>,
    pub organization: Option<Organization>,
}

impl AuthContext {
    pub fn identity_only(identity: Identity, profile: Option<Profile>) -> Self {
        Self {
            identity,
            profile,
            membership: None,
            organization: None,
        }
    }

    /// Role of the active membership, if the stored tag is a known role.
    pub fn role(&self) -> Option<Role> {
        self.membership.as_ref().and_then(Membership::known_role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.membership
            .as_ref()
            .is_some_and(|m| permissions::has_permission(&m.role, permission))
    }

    pub fn can_access_protection_cases(&self) -> bool {
        self.membership
            .as_ref()
            .is_some_and(|m| permissions::can_access_protection_cases(&m.role))
    }
}

/// Resolve identity, profile, organization and membership, in that order.
///
/// Returns `Ok(None)` when there is no valid session. Backend faults other
/// than "not found" propagate as errors.
pub async fn resolve_context(
    backend: &dyn Backend,
    session_token: Option<&str>,
    org_slug: Option<&str>,
) -> Result<Option<AuthContext>, AppError> {
    let Some(token) = session_token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let Some(identity) = backend.current_identity(token).await? else {
        return Ok(None);
    };

    // Profile is best-effort: a missing row or a failed lookup leaves it empty.
    let profile = match backend.fetch_profile(identity.id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(user_id = %identity.id, error = %e, "Profile lookup failed");
            None
        }
    };

    let Some(slug) = org_slug else {
        return Ok(Some(AuthContext::identity_only(identity, profile)));
    };

    let Some(organization) = backend.fetch_org_by_slug(slug).await? else {
        tracing::debug!(org_slug = %slug, user_id = %identity.id, "Organization not found");
        return Ok(Some(AuthContext::identity_only(identity, profile)));
    };

    let membership = backend
        .fetch_active_membership(identity.id, organization.id)
        .await?
        .filter(|m| m.is_active);

    Ok(Some(AuthContext {
        identity,
        profile,
        membership,
        organization: Some(organization),
    }))
}
