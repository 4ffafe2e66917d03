use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use steward_core::{AppError, AppResult, IdentityId};
use steward_domain::{
    CustomRoleId, FallbackPolicy, IdentitySnapshot, ModuleCategory, ModuleDefinition, ModuleId,
    PermissionGrant, PrimaryAssignment, Role,
};

use crate::access_ports::{GrantRepository, IdentityStore, ModuleCatalog};
use crate::{AccessResolver, ResolutionConfig};

/// In-process stand-in for all three stores, with call counters and failure switches.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    identities: Mutex<HashMap<IdentityId, IdentitySnapshot>>,
    grants: Mutex<Vec<PermissionGrant>>,
    modules: Mutex<Vec<ModuleDefinition>>,
    gates: Mutex<HashMap<IdentityId, Arc<Notify>>>,
    pub(crate) identity_loads: AtomicUsize,
    pub(crate) grant_loads: AtomicUsize,
    pub(crate) catalog_loads: AtomicUsize,
    pub(crate) unavailable: AtomicBool,
}

impl FakeDirectory {
    pub(crate) async fn with_standard_catalog() -> Arc<Self> {
        let directory = Arc::new(Self::default());
        for (slug, category) in [
            ("finance", ModuleCategory::FinanceLike),
            ("choir", ModuleCategory::MinistryOperational),
            ("admin", ModuleCategory::Administrative),
        ] {
            directory.add_module(slug, category).await;
        }
        directory
    }

    pub(crate) async fn add_module(&self, slug: &str, category: ModuleCategory) -> ModuleId {
        let module_id = ModuleId::new();
        let module = ModuleDefinition::new(module_id, slug, slug, category, true)
            .unwrap_or_else(|_| unreachable!());
        self.modules.lock().await.push(module);
        module_id
    }

    pub(crate) async fn module_id(&self, slug: &str) -> ModuleId {
        self.modules
            .lock()
            .await
            .iter()
            .find(|module| module.slug().as_str() == slug)
            .map(ModuleDefinition::module_id)
            .unwrap_or_else(|| unreachable!())
    }

    pub(crate) async fn put_identity(&self, identity_id: IdentityId, snapshot: IdentitySnapshot) {
        self.identities.lock().await.insert(identity_id, snapshot);
    }

    pub(crate) async fn put_primary(&self, role: Role) -> IdentityId {
        let identity_id = IdentityId::new();
        self.set_primary(identity_id, role).await;
        identity_id
    }

    pub(crate) async fn set_primary(&self, identity_id: IdentityId, role: Role) {
        self.put_identity(
            identity_id,
            IdentitySnapshot {
                primary: Some(PrimaryAssignment {
                    home_branch_id: None,
                    primary_role: role,
                }),
                ..IdentitySnapshot::default()
            },
        )
        .await;
    }

    pub(crate) async fn add_grant(&self, grant: PermissionGrant) {
        self.grants.lock().await.push(grant);
    }

    /// Holds loads of the identity until [`FakeDirectory::release`] is called.
    ///
    /// A held load has already read the snapshot, so later writes do not reach it.
    pub(crate) async fn gate(&self, identity_id: IdentityId) {
        self.gates
            .lock()
            .await
            .insert(identity_id, Arc::new(Notify::new()));
    }

    pub(crate) async fn release(&self, identity_id: IdentityId) {
        if let Some(gate) = self.gates.lock().await.remove(&identity_id) {
            gate.notify_one();
        }
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("directory is offline".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for FakeDirectory {
    async fn load_identity(&self, identity_id: IdentityId) -> AppResult<IdentitySnapshot> {
        let snapshot = self
            .identities
            .lock()
            .await
            .get(&identity_id)
            .cloned()
            .unwrap_or_default();
        let gate = self.gates.lock().await.get(&identity_id).cloned();
        self.identity_loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_available()?;

        Ok(snapshot)
    }
}

#[async_trait]
impl GrantRepository for FakeDirectory {
    async fn grants_for(
        &self,
        custom_role_ids: &BTreeSet<CustomRoleId>,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.grant_loads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| custom_role_ids.contains(&grant.custom_role_id))
            .copied()
            .collect())
    }
}

#[async_trait]
impl ModuleCatalog for FakeDirectory {
    async fn list_modules(&self) -> AppResult<Vec<ModuleDefinition>> {
        self.catalog_loads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        Ok(self.modules.lock().await.clone())
    }
}

pub(crate) fn resolver(directory: &Arc<FakeDirectory>) -> AccessResolver {
    AccessResolver::new(
        directory.clone(),
        directory.clone(),
        directory.clone(),
        ResolutionConfig::new(FallbackPolicy::standard(), true),
    )
}

pub(crate) fn loads(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Yields until `counter` reaches `expected`.
pub(crate) async fn wait_for_loads(counter: &AtomicUsize, expected: usize) {
    while loads(counter) < expected {
        tokio::task::yield_now().await;
    }
}
