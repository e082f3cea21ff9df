pub mod identity;
pub mod membership;
pub mod organization;
pub mod permission;
pub mod profile;
pub mod role;
pub mod workflow;

pub use identity::Identity;
pub use membership::Membership;
pub use organization::{OrgSettings, Organization};
pub use permission::{PermissionToken, PermissionTokenError, WILDCARD};
pub use profile::Profile;
pub use role::{Role, UnknownRole};
pub use workflow::{
    ApprovalWorkflow, ConditionOperator, ConditionValue, WorkflowCondition, WorkflowStep,
};
