use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use steward_application::{GrantRepository, IdentityStore, ModuleCatalog};
use steward_core::{AppError, AppResult, IdentityId};
use steward_domain::{CustomRoleId, IdentitySnapshot, ModuleDefinition, PermissionGrant};

mod grants;
mod identity;
mod modules;


/// PostgreSQL-backed identity store, grant repository and module catalog.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    home_branch_id: Option<Uuid>,
    primary_role: String,
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    role: String,
    custom_role_id: Option<Uuid>,
    branch_id: Option<Uuid>,
    department_id: Option<Uuid>,
    ministry_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct ModuleRow {
    id: Uuid,
    slug: String,
    display_name: String,
    category: String,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct GrantRow {
    id: Uuid,
    custom_role_id: Uuid,
    module_id: Uuid,
    allowed_actions: Vec<String>,
    coverage_type: String,
    department_id: Option<Uuid>,
    committee_id: Option<Uuid>,
}

fn unavailable(context: &str, error: sqlx::Error) -> AppError {
    AppError::Unavailable(format!("failed to {context}: {error}"))
}

#[async_trait]
impl IdentityStore for PostgresAccessRepository {
    async fn load_identity(&self, identity_id: IdentityId) -> AppResult<IdentitySnapshot> {
        self.load_identity_impl(identity_id).await
    }
}

#[async_trait]
impl GrantRepository for PostgresAccessRepository {
    async fn grants_for(
        &self,
        custom_role_ids: &BTreeSet<CustomRoleId>,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.grants_for_impl(custom_role_ids).await
    }
}

#[async_trait]
impl ModuleCatalog for PostgresAccessRepository {
    async fn list_modules(&self) -> AppResult<Vec<ModuleDefinition>> {
        self.list_modules_impl().await
    }
}
