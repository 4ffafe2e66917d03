//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod action;
mod assignment;
mod fallback_policy;
mod grant;
mod ids;
mod module;
mod role;

pub use access::{AccessContext, AccessContextInput, AccessDecision, DecisionReason};
pub use action::{Action, ActionSet};
pub use assignment::{
    CommitteeMembership, IdentitySnapshot, PrimaryAssignment, ScopedRoleAssignment,
};
pub use fallback_policy::{
    FallbackPolicy, FallbackPolicyDocument, FallbackRule, STANDARD_FALLBACK_POLICY_VERSION,
};
pub use grant::{Coverage, PermissionGrant};
pub use ids::{BranchId, CommitteeId, CustomRoleId, DepartmentId, MinistryId, ModuleId};
pub use module::{ModuleCategory, ModuleDefinition, ModuleSlug};
pub use role::{Role, RoleTier};
