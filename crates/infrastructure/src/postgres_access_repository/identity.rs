use std::str::FromStr;

use steward_domain::{
    BranchId, CommitteeId, CommitteeMembership, CustomRoleId, DepartmentId, MinistryId,
    PrimaryAssignment, Role, ScopedRoleAssignment,
};

use super::*;

impl PostgresAccessRepository {
    pub(super) async fn load_identity_impl(
        &self,
        identity_id: IdentityId,
    ) -> AppResult<IdentitySnapshot> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| unavailable("start identity snapshot transaction", error))?;

        // One snapshot for all three reads, so a concurrent revocation is seen whole or not at all.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await
            .map_err(|error| unavailable("set identity snapshot isolation", error))?;

        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT home_branch_id, primary_role
            FROM identity_profiles
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| unavailable("load identity profile", error))?;

        let assignment_rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT role, custom_role_id, branch_id, department_id, ministry_id
            FROM identity_role_assignments
            WHERE identity_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(identity_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| unavailable("load role assignments", error))?;

        let committee_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT committee_id
            FROM committee_memberships
            WHERE identity_id = $1
            ORDER BY committee_id
            "#,
        )
        .bind(identity_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| unavailable("load committee memberships", error))?;

        transaction
            .commit()
            .await
            .map_err(|error| unavailable("finish identity snapshot transaction", error))?;

        let primary = profile
            .map(|row| {
                Ok::<_, AppError>(PrimaryAssignment {
                    home_branch_id: row.home_branch_id.map(BranchId::from_uuid),
                    primary_role: decode_role(row.primary_role.as_str(), identity_id)?,
                })
            })
            .transpose()?;

        let scoped_assignments = assignment_rows
            .into_iter()
            .map(|row| {
                Ok(ScopedRoleAssignment {
                    role: decode_role(row.role.as_str(), identity_id)?,
                    custom_role_id: row.custom_role_id.map(CustomRoleId::from_uuid),
                    branch_id: row.branch_id.map(BranchId::from_uuid),
                    department_id: row.department_id.map(DepartmentId::from_uuid),
                    ministry_id: row.ministry_id.map(MinistryId::from_uuid),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let committee_memberships = committee_ids
            .into_iter()
            .map(|committee_id| CommitteeMembership {
                committee_id: CommitteeId::from_uuid(committee_id),
            })
            .collect();

        Ok(IdentitySnapshot {
            primary,
            scoped_assignments,
            committee_memberships,
        })
    }
}

fn decode_role(value: &str, identity_id: IdentityId) -> AppResult<Role> {
    Role::from_str(value).map_err(|error| {
        AppError::Internal(format!(
            "failed to decode role '{value}' for identity '{identity_id}': {error}"
        ))
    })
}
