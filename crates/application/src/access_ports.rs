use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use steward_core::{AppResult, IdentityId};
use steward_domain::{
    AccessContext, CustomRoleId, IdentitySnapshot, ModuleDefinition, PermissionGrant,
};

/// Port for the identity store.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Loads the primary profile, scoped role assignments and committee memberships.
    ///
    /// Unknown identities yield an empty snapshot.
    async fn load_identity(&self, identity_id: IdentityId) -> AppResult<IdentitySnapshot>;
}

/// Port for the permission grant store.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Lists grants owned by any of the custom roles. Performs no coverage matching.
    async fn grants_for(
        &self,
        custom_role_ids: &BTreeSet<CustomRoleId>,
    ) -> AppResult<Vec<PermissionGrant>>;
}

/// Port for the module catalog.
#[async_trait]
pub trait ModuleCatalog: Send + Sync {
    /// Lists every module, active or not.
    async fn list_modules(&self) -> AppResult<Vec<ModuleDefinition>>;
}

/// Optional cache port for resolved contexts.
#[async_trait]
pub trait AccessContextCache: Send + Sync {
    /// Returns the cached context of an identity.
    async fn get_context(&self, identity_id: IdentityId) -> AppResult<Option<Arc<AccessContext>>>;

    /// Stores a context with ttl.
    async fn set_context(
        &self,
        identity_id: IdentityId,
        context: Arc<AccessContext>,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops the cached context of an identity.
    async fn evict_context(&self, identity_id: IdentityId) -> AppResult<()>;
}
