use std::collections::HashMap;
use std::sync::Arc;

use steward_core::{AppError, AppResult, IdentityId};
use steward_domain::{AccessContext, AccessDecision, Action, ActionSet};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::access_ports::AccessContextCache;
use crate::access_resolver::AccessResolver;


/// Answers decision queries for many identities, optionally through a context cache.
///
/// Every [`AccessService::invalidate`] bumps the identity's epoch. A context whose
/// resolution started under an older epoch is returned to its caller but never cached.
#[derive(Clone)]
pub struct AccessService {
    resolver: AccessResolver,
    cache: Option<Arc<dyn AccessContextCache>>,
    cache_ttl_seconds: u32,
    epochs: Arc<Mutex<HashMap<IdentityId, u64>>>,
}

impl AccessService {
    /// Creates a service that resolves on every query.
    #[must_use]
    pub fn new(resolver: AccessResolver) -> Self {
        Self {
            resolver,
            cache: None,
            cache_ttl_seconds: 0,
            epochs: Arc::default(),
        }
    }

    /// Creates a service that memoizes contexts for `cache_ttl_seconds`.
    ///
    /// A zero ttl disables caching.
    #[must_use]
    pub fn with_cache(
        resolver: AccessResolver,
        cache: Arc<dyn AccessContextCache>,
        cache_ttl_seconds: u32,
    ) -> Self {
        Self {
            resolver,
            cache: (cache_ttl_seconds > 0).then_some(cache),
            cache_ttl_seconds,
            epochs: Arc::default(),
        }
    }

    /// Returns the resolved context of an identity.
    pub async fn context_for(&self, identity_id: IdentityId) -> AppResult<Arc<AccessContext>> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(self.resolver.resolve(Some(identity_id)).await?));
        };

        match cache.get_context(identity_id).await {
            Ok(Some(context)) => return Ok(context),
            Ok(None) => {}
            Err(error) => {
                warn!(identity_id = %identity_id, error = %error, "access context cache read failed");
            }
        }

        let epoch = self.epoch(identity_id).await;
        let context = Arc::new(self.resolver.resolve(Some(identity_id)).await?);

        // Held across the write so an invalidation cannot slip between check and store.
        let epochs = self.epochs.lock().await;
        if epochs.get(&identity_id).copied().unwrap_or_default() != epoch {
            debug!(identity_id = %identity_id, "skipped caching context resolved before invalidation");
            return Ok(context);
        }

        if let Err(error) = cache
            .set_context(identity_id, context.clone(), self.cache_ttl_seconds)
            .await
        {
            warn!(identity_id = %identity_id, error = %error, "access context cache write failed");
        }
        drop(epochs);

        Ok(context)
    }

    /// Decides a query and reports why.
    pub async fn explain(
        &self,
        identity_id: IdentityId,
        module_slug: &str,
        action: Action,
    ) -> AppResult<AccessDecision> {
        let decision = self.context_for(identity_id).await?.explain(module_slug, action);
        debug!(
            identity_id = %identity_id,
            module = module_slug,
            action = action.as_str(),
            allowed = decision.allowed,
            reason = ?decision.reason,
            "access decision"
        );

        Ok(decision)
    }

    /// Answers whether the identity may perform `action` on a module.
    pub async fn can(
        &self,
        identity_id: IdentityId,
        module_slug: &str,
        action: Action,
    ) -> AppResult<bool> {
        Ok(self.explain(identity_id, module_slug, action).await?.allowed)
    }

    /// Fails with [`AppError::Forbidden`] unless the identity may perform `action`.
    pub async fn require(
        &self,
        identity_id: IdentityId,
        module_slug: &str,
        action: Action,
    ) -> AppResult<()> {
        if self.can(identity_id, module_slug, action).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "identity '{identity_id}' may not {} module '{module_slug}'",
            action.as_str()
        )))
    }

    /// Returns every action the identity may perform on a module.
    pub async fn effective_actions(
        &self,
        identity_id: IdentityId,
        module_slug: &str,
    ) -> AppResult<ActionSet> {
        Ok(self
            .context_for(identity_id)
            .await?
            .effective_actions(module_slug))
    }

    /// Answers whether the identity holds any of the named roles.
    pub async fn has_role(&self, identity_id: IdentityId, role_names: &[&str]) -> AppResult<bool> {
        let roles = self.resolver.config().parse_role_names(role_names)?;
        Ok(self.context_for(identity_id).await?.has_role(&roles))
    }

    /// Drops the cached context of an identity after its assignments changed.
    ///
    /// Resolutions already in flight for the identity will not repopulate the cache.
    pub async fn invalidate(&self, identity_id: IdentityId) -> AppResult<()> {
        if let Some(cache) = &self.cache {
            let mut epochs = self.epochs.lock().await;
            *epochs.entry(identity_id).or_default() += 1;
            cache.evict_context(identity_id).await?;
            debug!(identity_id = %identity_id, "evicted access context");
        }

        Ok(())
    }

    async fn epoch(&self, identity_id: IdentityId) -> u64 {
        self.epochs
            .lock()
            .await
            .get(&identity_id)
            .copied()
            .unwrap_or_default()
    }
}
