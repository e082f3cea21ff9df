//! Role model - the closed set of roles a membership can carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role held by a member within one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    OrgAdmin,
    ProgramManager,
    MeOfficer,
    Finance,
    Hr,
    Procurement,
    FieldOfficer,
    DataEntry,
    Viewer,
    Auditor,
    ProtectionOfficer,
}

impl Role {
    /// Every role, in the order roles are offered for assignment.
    pub const ALL: [Role; 12] = [
        Role::SuperAdmin,
        Role::OrgAdmin,
        Role::ProgramManager,
        Role::MeOfficer,
        Role::Finance,
        Role::Hr,
        Role::Procurement,
        Role::FieldOfficer,
        Role::DataEntry,
        Role::Viewer,
        Role::Auditor,
        Role::ProtectionOfficer,
    ];

    /// Stored tag, as it appears in `memberships.role`.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::OrgAdmin => "org_admin",
            Role::ProgramManager => "program_manager",
            Role::MeOfficer => "me_officer",
            Role::Finance => "finance",
            Role::Hr => "hr",
            Role::Procurement => "procurement",
            Role::FieldOfficer => "field_officer",
            Role::DataEntry => "data_entry",
            Role::Viewer => "viewer",
            Role::Auditor => "auditor",
            Role::ProtectionOfficer => "protection_officer",
        }
    }

    /// Human-readable label. Presentation only; compare roles, not labels.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Administrator",
            Role::OrgAdmin => "Organization Administrator",
            Role::ProgramManager => "Program Manager",
            Role::MeOfficer => "M&E Officer",
            Role::Finance => "Finance Officer",
            Role::Hr => "HR Officer",
            Role::Procurement => "Procurement Officer",
            Role::FieldOfficer => "Field Officer",
            Role::DataEntry => "Data Entry Clerk",
            Role::Viewer => "Viewer",
            Role::Auditor => "Auditor",
            Role::ProtectionOfficer => "Protection Officer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
