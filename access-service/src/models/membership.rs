use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Role;

/// Binds one identity to one organization with exactly one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub org_id: Uuid,
    /// Raw stored role tag. May name a role this build does not know.
    pub role: String,
    /// Branch/office the membership is scoped to, if any
    pub branch_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(user_id: Uuid, org_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            org_id,
            role: role.as_str().to_string(),
            branch_id: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn known_role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}
