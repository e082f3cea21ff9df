pub mod api;
pub mod health;
pub mod metrics;
pub mod pages;

use serde::Serialize;

use crate::models::{Organization, Role};
use crate::services::{permissions, AuthContext};

/// Role as shown to users: stored tag plus label.
#[derive(Debug, Serialize)]
pub struct RoleView {
    pub role: String,
    pub display_name: Option<&'static str>,
}

impl RoleView {
    pub fn from_tag(tag: &str) -> Self {
        Self {
            role: tag.to_string(),
            display_name: tag.parse::<Role>().ok().map(Role::display_name),
        }
    }
}

impl From<Role> for RoleView {
    fn from(role: Role) -> Self {
        Self {
            role: role.as_str().to_string(),
            display_name: Some(role.display_name()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrgSummary {
    pub id: uuid::Uuid,
    pub slug: String,
    pub name: String,
}

impl From<&Organization> for OrgSummary {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            slug: org.slug.clone(),
            name: org.name.clone(),
        }
    }
}

/// Tokens the context's membership grants; empty without a known role.
pub(crate) fn effective_permissions(ctx: &AuthContext) -> Vec<&'static str> {
    ctx.role().map(permissions::permissions_of).unwrap_or_default()
}
