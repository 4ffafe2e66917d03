use std::str::FromStr;

use steward_domain::{ModuleCategory, ModuleId};

use super::*;

impl PostgresAccessRepository {
    pub(super) async fn list_modules_impl(&self) -> AppResult<Vec<ModuleDefinition>> {
        let rows = sqlx::query_as::<_, ModuleRow>(
            r#"
            SELECT id, slug, display_name, category, is_active
            FROM access_modules
            ORDER BY slug
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| unavailable("list access modules", error))?;

        rows.into_iter()
            .map(|row| {
                let category = ModuleCategory::from_str(row.category.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "failed to decode category of module '{}': {error}",
                        row.slug
                    ))
                })?;

                ModuleDefinition::new(
                    ModuleId::from_uuid(row.id),
                    row.slug.as_str(),
                    row.display_name,
                    category,
                    row.is_active,
                )
                .map_err(|error| {
                    AppError::Internal(format!("failed to decode module '{}': {error}", row.slug))
                })
            })
            .collect()
    }
}
