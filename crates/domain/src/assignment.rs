use serde::{Deserialize, Serialize};

use crate::{BranchId, CommitteeId, CustomRoleId, DepartmentId, MinistryId, Role};

/// The single primary profile of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryAssignment {
    /// Home branch, if the profile is tied to one.
    pub home_branch_id: Option<BranchId>,
    /// Primary role.
    pub primary_role: Role,
}

/// A role held within a branch, department or ministry scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedRoleAssignment {
    /// Coarse role held in this scope.
    pub role: Role,
    /// Custom role definition the assignment is tied to.
    ///
    /// Only assignments with a custom role can unlock permission grants.
    pub custom_role_id: Option<CustomRoleId>,
    /// Branch scope.
    pub branch_id: Option<BranchId>,
    /// Department scope.
    pub department_id: Option<DepartmentId>,
    /// Ministry scope.
    pub ministry_id: Option<MinistryId>,
}

impl ScopedRoleAssignment {
    /// Creates an unscoped assignment of a coarse role.
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self {
            role,
            custom_role_id: None,
            branch_id: None,
            department_id: None,
            ministry_id: None,
        }
    }

    /// Ties the assignment to a custom role definition.
    #[must_use]
    pub fn with_custom_role(mut self, custom_role_id: CustomRoleId) -> Self {
        self.custom_role_id = Some(custom_role_id);
        self
    }

    /// Scopes the assignment to a branch.
    #[must_use]
    pub fn in_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Scopes the assignment to a department.
    #[must_use]
    pub fn in_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    /// Scopes the assignment to a ministry.
    #[must_use]
    pub fn in_ministry(mut self, ministry_id: MinistryId) -> Self {
        self.ministry_id = Some(ministry_id);
        self
    }
}

/// Membership of an identity in a committee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitteeMembership {
    /// Committee the identity sits on.
    pub committee_id: CommitteeId,
}

/// Everything the identity store knows about one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    /// Primary profile; absent when the profile was never provisioned.
    pub primary: Option<PrimaryAssignment>,
    /// Scoped role assignments.
    pub scoped_assignments: Vec<ScopedRoleAssignment>,
    /// Committee memberships.
    pub committee_memberships: Vec<CommitteeMembership>,
}

impl IdentitySnapshot {
    /// Returns the custom roles referenced by scoped assignments.
    #[must_use]
    pub fn custom_role_ids(&self) -> std::collections::BTreeSet<CustomRoleId> {
        self.scoped_assignments
            .iter()
            .filter_map(|assignment| assignment.custom_role_id)
            .collect()
    }
}
