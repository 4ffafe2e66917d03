use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use steward_application::{GrantRepository, IdentityStore, ModuleCatalog};
use steward_core::{AppError, AppResult, IdentityId};
use steward_domain::{
    CommitteeId, CommitteeMembership, CustomRoleId, IdentitySnapshot, ModuleDefinition,
    PermissionGrant, PrimaryAssignment, ScopedRoleAssignment,
};
use tokio::sync::RwLock;

/// In-memory identity store, grant repository and module catalog.
///
/// Backs local runs and tests; mirrors the PostgreSQL adapter's semantics.
#[derive(Debug, Default)]
pub struct InMemoryAccessDirectory {
    profiles: RwLock<HashMap<IdentityId, PrimaryAssignment>>,
    assignments: RwLock<HashMap<IdentityId, Vec<ScopedRoleAssignment>>>,
    committees: RwLock<HashMap<IdentityId, BTreeSet<CommitteeId>>>,
    modules: RwLock<BTreeMap<String, ModuleDefinition>>,
    grants: RwLock<Vec<PermissionGrant>>,
}

impl InMemoryAccessDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary profile of an identity.
    pub async fn set_primary(&self, identity_id: IdentityId, primary: PrimaryAssignment) {
        self.profiles.write().await.insert(identity_id, primary);
    }

    /// Adds a scoped role assignment.
    pub async fn add_assignment(&self, identity_id: IdentityId, assignment: ScopedRoleAssignment) {
        self.assignments
            .write()
            .await
            .entry(identity_id)
            .or_default()
            .push(assignment);
    }

    /// Adds a committee membership.
    pub async fn add_committee_membership(
        &self,
        identity_id: IdentityId,
        committee_id: CommitteeId,
    ) {
        self.committees
            .write()
            .await
            .entry(identity_id)
            .or_default()
            .insert(committee_id);
    }

    /// Inserts or replaces a module, keyed by slug.
    ///
    /// Fails when the slug already belongs to a module with another id.
    pub async fn save_module(&self, module: ModuleDefinition) -> AppResult<()> {
        let mut modules = self.modules.write().await;
        let slug = module.slug().as_str().to_owned();
        if modules
            .get(&slug)
            .is_some_and(|existing| existing.module_id() != module.module_id())
        {
            return Err(AppError::Validation(format!(
                "module slug '{slug}' is already taken"
            )));
        }

        modules.insert(slug, module);
        Ok(())
    }

    /// Adds a permission grant.
    pub async fn add_grant(&self, grant: PermissionGrant) {
        self.grants.write().await.push(grant);
    }
}

#[async_trait]
impl IdentityStore for InMemoryAccessDirectory {
    async fn load_identity(&self, identity_id: IdentityId) -> AppResult<IdentitySnapshot> {
        let primary = self.profiles.read().await.get(&identity_id).copied();
        let scoped_assignments = self
            .assignments
            .read()
            .await
            .get(&identity_id)
            .cloned()
            .unwrap_or_default();
        let committee_memberships = self
            .committees
            .read()
            .await
            .get(&identity_id)
            .map(|committee_ids| {
                committee_ids
                    .iter()
                    .map(|committee_id| CommitteeMembership {
                        committee_id: *committee_id,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(IdentitySnapshot {
            primary,
            scoped_assignments,
            committee_memberships,
        })
    }
}

#[async_trait]
impl GrantRepository for InMemoryAccessDirectory {
    async fn grants_for(
        &self,
        custom_role_ids: &BTreeSet<CustomRoleId>,
    ) -> AppResult<Vec<PermissionGrant>> {
        if custom_role_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .grants
            .read()
            .await
            .iter()
            .filter(|grant| custom_role_ids.contains(&grant.custom_role_id))
            .copied()
            .collect())
    }
}

#[async_trait]
impl ModuleCatalog for InMemoryAccessDirectory {
    async fn list_modules(&self) -> AppResult<Vec<ModuleDefinition>> {
        Ok(self.modules.read().await.values().cloned().collect())
    }
}
