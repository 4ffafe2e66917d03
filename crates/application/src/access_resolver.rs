use std::sync::Arc;

use chrono::Utc;
use steward_core::{AppResult, IdentityId};
use steward_domain::{AccessContext, AccessContextInput};
use tracing::{debug, warn};

use crate::access_ports::{GrantRepository, IdentityStore, ModuleCatalog};
use crate::resolution_config::ResolutionConfig;


/// Loads everything an identity's decisions depend on and builds its context.
#[derive(Clone)]
pub struct AccessResolver {
    identity_store: Arc<dyn IdentityStore>,
    grant_repository: Arc<dyn GrantRepository>,
    module_catalog: Arc<dyn ModuleCatalog>,
    config: ResolutionConfig,
}

impl AccessResolver {
    /// Creates a resolver from port implementations.
    #[must_use]
    pub fn new(
        identity_store: Arc<dyn IdentityStore>,
        grant_repository: Arc<dyn GrantRepository>,
        module_catalog: Arc<dyn ModuleCatalog>,
        config: ResolutionConfig,
    ) -> Self {
        Self {
            identity_store,
            grant_repository,
            module_catalog,
            config,
        }
    }

    /// Returns the resolution settings.
    #[must_use]
    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Resolves the decision context of an identity.
    ///
    /// `None` yields the anonymous context without touching any store. The
    /// identity snapshot and the module catalog load concurrently; grants are
    /// fetched once the snapshot names the custom roles they belong to.
    pub async fn resolve(&self, identity_id: Option<IdentityId>) -> AppResult<AccessContext> {
        let policy = self.config.fallback_policy.clone();
        let Some(identity_id) = identity_id else {
            return Ok(AccessContext::anonymous(policy, Utc::now()));
        };

        let (snapshot, modules) = tokio::try_join!(
            self.identity_store.load_identity(identity_id),
            self.module_catalog.list_modules(),
        )
        .inspect_err(|error| {
            warn!(identity_id = %identity_id, error = %error, "failed to load identity or module catalog");
        })?;

        let custom_role_ids = snapshot.custom_role_ids();
        let grants = if custom_role_ids.is_empty() {
            Vec::new()
        } else {
            self.grant_repository
                .grants_for(&custom_role_ids)
                .await
                .inspect_err(|error| {
                    warn!(identity_id = %identity_id, error = %error, "failed to load permission grants");
                })?
        };

        debug!(
            identity_id = %identity_id,
            scoped_assignments = snapshot.scoped_assignments.len(),
            committees = snapshot.committee_memberships.len(),
            custom_roles = custom_role_ids.len(),
            grants = grants.len(),
            modules = modules.len(),
            policy_version = policy.version(),
            "resolved access context"
        );

        Ok(AccessContext::resolve(AccessContextInput {
            identity_id,
            snapshot,
            grants,
            modules,
            policy,
            resolved_at: Utc::now(),
        }))
    }
}
