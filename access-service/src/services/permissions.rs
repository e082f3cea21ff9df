//! Role permission table and the role classification helpers built on it.
//!
//! The table is built once on first use and only read afterwards, so every
//! request can consult it concurrently without locking.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::models::{Role, WILDCARD};

/// Roles that may open sensitive protection cases. This is a separate axis
/// from the permission table and is not derived from it.
pub const PROTECTION_ACCESS_ROLES: [Role; 4] = [
    Role::SuperAdmin,
    Role::OrgAdmin,
    Role::ProtectionOfficer,
    Role::Auditor,
];

pub static PERMISSION_TABLE: Lazy<HashMap<Role, HashSet<&'static str>>> = Lazy::new(|| {
    Role::ALL
        .into_iter()
        .map(|role| (role, baseline(role).iter().copied().collect()))
        .collect()
});

fn baseline(role: Role) -> &'static [&'static str] {
    match role {
        Role::SuperAdmin => &[WILDCARD],
        Role::OrgAdmin => &[
            "dashboard:read",
            "projects:read",
            "projects:write",
            "projects:delete",
            "beneficiaries:read",
            "beneficiaries:write",
            "beneficiaries:delete",
            "cases:read",
            "cases:write",
            "cases:sensitive",
            "distributions:read",
            "distributions:write",
            "distributions:approve",
            "finance:read",
            "finance:write",
            "finance:approve",
            "procurement:read",
            "procurement:write",
            "procurement:approve",
            "assets:read",
            "assets:write",
            "documents:read",
            "documents:write",
            "documents:delete",
            "approvals:read",
            "approvals:decide",
            "hr:read",
            "hr:write",
            "users:read",
            "users:invite",
            "users:manage",
            "branches:read",
            "branches:write",
            "reports:read",
            "reports:write",
            "reports:export",
            "settings:read",
            "settings:write",
            "audit:read",
        ],
        Role::ProgramManager => &[
            "dashboard:read",
            "projects:read",
            "projects:write",
            "beneficiaries:read",
            "beneficiaries:write",
            "cases:read",
            "cases:write",
            "distributions:read",
            "distributions:write",
            "distributions:approve",
            "finance:read",
            "procurement:read",
            "procurement:write",
            "assets:read",
            "documents:read",
            "documents:write",
            "approvals:read",
            "approvals:decide",
            "branches:read",
            "reports:read",
            "reports:export",
        ],
        Role::MeOfficer => &[
            "dashboard:read",
            "projects:read",
            "beneficiaries:read",
            "cases:read",
            "distributions:read",
            "documents:read",
            "documents:write",
            "reports:read",
            "reports:write",
            "reports:export",
        ],
        Role::Finance => &[
            "dashboard:read",
            "projects:read",
            "finance:read",
            "finance:write",
            "finance:approve",
            "procurement:read",
            "procurement:approve",
            "assets:read",
            "documents:read",
            "documents:write",
            "approvals:read",
            "approvals:decide",
            "reports:read",
            "reports:export",
        ],
        Role::Hr => &[
            "dashboard:read",
            "hr:read",
            "hr:write",
            "users:read",
            "users:invite",
            "branches:read",
            "documents:read",
            "documents:write",
            "reports:read",
        ],
        Role::Procurement => &[
            "dashboard:read",
            "projects:read",
            "procurement:read",
            "procurement:write",
            "assets:read",
            "assets:write",
            "finance:read",
            "documents:read",
            "documents:write",
            "approvals:read",
            "reports:read",
        ],
        Role::FieldOfficer => &[
            "dashboard:read",
            "projects:read",
            "beneficiaries:read",
            "beneficiaries:write",
            "cases:read",
            "cases:write",
            "distributions:read",
            "distributions:write",
            "assets:read",
            "documents:read",
            "documents:write",
        ],
        Role::DataEntry => &[
            "dashboard:read",
            "projects:read",
            "beneficiaries:read",
            "beneficiaries:write",
            "distributions:read",
            "distributions:write",
            "documents:read",
            "documents:write",
        ],
        Role::Viewer => &[
            "dashboard:read",
            "projects:read",
            "beneficiaries:read",
            "distributions:read",
            "documents:read",
            "reports:read",
        ],
        Role::Auditor => &[
            "dashboard:read",
            "projects:read",
            "beneficiaries:read",
            "cases:read",
            "distributions:read",
            "finance:read",
            "procurement:read",
            "assets:read",
            "documents:read",
            "hr:read",
            "approvals:read",
            "reports:read",
            "reports:export",
            "audit:read",
        ],
        Role::ProtectionOfficer => &[
            "dashboard:read",
            "beneficiaries:read",
            "beneficiaries:write",
            "cases:read",
            "cases:write",
            "cases:sensitive",
            "documents:read",
            "documents:write",
            "reports:read",
        ],
    }
}

/// Tokens granted to `role`, sorted for stable output.
pub fn permissions_of(role: Role) -> Vec<&'static str> {
    let mut tokens: Vec<&'static str> = PERMISSION_TABLE
        .get(&role)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default();
    tokens.sort_unstable();
    tokens
}

pub fn role_has_permission(role: Role, permission: &str) -> bool {
    PERMISSION_TABLE
        .get(&role)
        .is_some_and(|set| set.contains(WILDCARD) || set.contains(permission))
}

/// Check a stored role tag. Tags outside the table never hold any permission.
pub fn has_permission(role: &str, permission: &str) -> bool {
    match role.parse::<Role>() {
        Ok(role) => role_has_permission(role, permission),
        Err(_) => {
            tracing::warn!(role = %role, "Permission check against unknown role");
            false
        }
    }
}

pub fn can_access_protection_cases(role: &str) -> bool {
    role.parse::<Role>()
        .is_ok_and(|role| PROTECTION_ACCESS_ROLES.contains(&role))
}

/// Roles `acting_role` may grant to others, in `Role::ALL` order.
pub fn assignable_roles(acting_role: &str) -> Vec<Role> {
    match acting_role.parse::<Role>() {
        Ok(Role::SuperAdmin) => Role::ALL.to_vec(),
        Ok(Role::OrgAdmin) => Role::ALL
            .into_iter()
            .filter(|r| *r != Role::SuperAdmin)
            .collect(),
        _ => Vec::new(),
    }
}
