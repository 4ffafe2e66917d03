use std::str::FromStr;

use steward_domain::{Action, ActionSet, CommitteeId, Coverage, DepartmentId, ModuleId};
use tracing::debug;

use super::*;

impl PostgresAccessRepository {
    pub(super) async fn grants_for_impl(
        &self,
        custom_role_ids: &BTreeSet<CustomRoleId>,
    ) -> AppResult<Vec<PermissionGrant>> {
        if custom_role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let role_ids: Vec<Uuid> = custom_role_ids.iter().map(CustomRoleId::as_uuid).collect();
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                id,
                custom_role_id,
                module_id,
                allowed_actions,
                coverage_type,
                department_id,
                committee_id
            FROM custom_role_grants
            WHERE custom_role_id = ANY($1)
            ORDER BY custom_role_id, module_id, id
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| unavailable("load permission grants", error))?;

        debug!(
            custom_roles = custom_role_ids.len(),
            grants = rows.len(),
            "loaded permission grants"
        );

        rows.into_iter().map(decode_grant).collect()
    }
}

fn decode_grant(row: GrantRow) -> AppResult<PermissionGrant> {
    let allowed_actions = row
        .allowed_actions
        .iter()
        .map(|action| Action::from_str(action.as_str()))
        .collect::<AppResult<ActionSet>>()
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to decode actions of grant '{}': {error}",
                row.id
            ))
        })?;

    let coverage = Coverage::from_parts(
        row.coverage_type.as_str(),
        row.department_id.map(DepartmentId::from_uuid),
        row.committee_id.map(CommitteeId::from_uuid),
    )
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to decode coverage of grant '{}': {error}",
            row.id
        ))
    })?;

    Ok(PermissionGrant {
        custom_role_id: CustomRoleId::from_uuid(row.custom_role_id),
        module_id: ModuleId::from_uuid(row.module_id),
        allowed_actions,
        coverage,
    })
}
