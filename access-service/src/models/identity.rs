use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated actor, as asserted by the hosted auth backend's session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}
