use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use steward_application::AccessContextCache;
use steward_core::{AppResult, IdentityId};
use steward_domain::AccessContext;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct AccessContextCacheEntry {
    context: Arc<AccessContext>,
    expires_at: Instant,
}

/// In-memory cache adapter for resolved access contexts.
#[derive(Default)]
pub struct InMemoryAccessContextCache {
    entries: RwLock<HashMap<IdentityId, AccessContextCacheEntry>>,
}

impl InMemoryAccessContextCache {
    /// Creates an empty in-memory access context cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessContextCache for InMemoryAccessContextCache {
    async fn get_context(&self, identity_id: IdentityId) -> AppResult<Option<Arc<AccessContext>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(&identity_id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.context.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&identity_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&identity_id);
        }

        Ok(None)
    }

    async fn set_context(
        &self,
        identity_id: IdentityId,
        context: Arc<AccessContext>,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            identity_id,
            AccessContextCacheEntry {
                context,
                expires_at,
            },
        );

        Ok(())
    }

    async fn evict_context(&self, identity_id: IdentityId) -> AppResult<()> {
        self.entries.write().await.remove(&identity_id);
        Ok(())
    }
}
