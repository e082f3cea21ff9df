use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Display and contact data for an identity (one row per identity in `profiles`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}
