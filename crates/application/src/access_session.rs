use std::sync::Arc;

use serde::Serialize;
use steward_core::{AppError, AppResult, IdentityId};
use steward_domain::{AccessContext, AccessDecision, Action, Role};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::access_resolver::AccessResolver;


/// Lifecycle of the context held by an [`AccessSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    /// Nothing has been bound yet, or the session ended.
    Uninitialized,
    /// A resolution is in flight.
    Loading,
    /// Decisions can be answered.
    Ready,
    /// The last resolution failed; [`AccessSession::refresh`] retries it.
    Failed,
}

#[derive(Debug, Clone)]
enum Phase {
    Uninitialized,
    Loading,
    Ready(Arc<AccessContext>),
    Failed(String),
}

impl Phase {
    fn status(&self) -> AccessStatus {
        match self {
            Self::Uninitialized => AccessStatus::Uninitialized,
            Self::Loading => AccessStatus::Loading,
            Self::Ready(_) => AccessStatus::Ready,
            Self::Failed(_) => AccessStatus::Failed,
        }
    }
}

#[derive(Debug, Clone)]
struct SessionState {
    generation: u64,
    identity_id: Option<IdentityId>,
    phase: Phase,
}

/// Memoized decision context for one caller session.
///
/// Reads never suspend and never fetch: they answer from the last resolved
/// context or fail with [`AppError::Unavailable`]. Every load captures a
/// generation number, and a result that arrives after the session moved on
/// (rebound, refreshed or ended) is discarded.
pub struct AccessSession {
    resolver: AccessResolver,
    state: watch::Sender<SessionState>,
}

impl AccessSession {
    /// Creates an unbound session.
    #[must_use]
    pub fn new(resolver: AccessResolver) -> Self {
        Self {
            resolver,
            state: watch::Sender::new(SessionState {
                generation: 0,
                identity_id: None,
                phase: Phase::Uninitialized,
            }),
        }
    }

    /// Binds the session to an identity, or to the anonymous caller with `None`.
    ///
    /// Binding the identity that is already loading or loaded performs no fetch.
    pub async fn bind(&self, identity_id: Option<IdentityId>) -> AccessStatus {
        let mut started = None;
        self.state.send_if_modified(|state| {
            let settled_or_loading = matches!(state.phase, Phase::Loading | Phase::Ready(_));
            if settled_or_loading && state.identity_id == identity_id {
                return false;
            }

            state.generation += 1;
            state.identity_id = identity_id;
            state.phase = Phase::Loading;
            started = Some(state.generation);
            true
        });

        match started {
            Some(generation) => self.load(generation, identity_id).await,
            None => self.status(),
        }
    }

    /// Reloads the bound identity. An unbound session stays unbound.
    pub async fn refresh(&self) -> AccessStatus {
        let mut started = None;
        self.state.send_if_modified(|state| {
            if matches!(state.phase, Phase::Uninitialized) {
                return false;
            }

            state.generation += 1;
            state.phase = Phase::Loading;
            started = Some((state.generation, state.identity_id));
            true
        });

        match started {
            Some((generation, identity_id)) => self.load(generation, identity_id).await,
            None => AccessStatus::Uninitialized,
        }
    }

    /// Tears the session down. Loads still in flight are dropped when they land.
    pub fn end(&self) {
        self.state.send_modify(|state| {
            state.generation += 1;
            state.identity_id = None;
            state.phase = Phase::Uninitialized;
        });
    }

    async fn load(&self, generation: u64, identity_id: Option<IdentityId>) -> AccessStatus {
        let result = self.resolver.resolve(identity_id).await;
        if let Err(error) = &result {
            warn!(
                identity_id = ?identity_id,
                error = %error,
                "access context resolution failed"
            );
        }

        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }

            state.phase = match result {
                Ok(context) => Phase::Ready(Arc::new(context)),
                Err(error) => Phase::Failed(error.to_string()),
            };
            true
        });

        if !applied {
            debug!(
                identity_id = ?identity_id,
                generation,
                "discarded access context that arrived after the session moved on"
            );
        }

        self.status()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn status(&self) -> AccessStatus {
        self.state.borrow().phase.status()
    }

    /// Returns the bound identity.
    #[must_use]
    pub fn identity_id(&self) -> Option<IdentityId> {
        self.state.borrow().identity_id
    }

    /// Waits until no resolution is in flight and returns the settled state.
    pub async fn wait_settled(&self) -> AccessStatus {
        let mut receiver = self.state.subscribe();
        match receiver
            .wait_for(|state| !matches!(state.phase, Phase::Loading))
            .await
        {
            Ok(state) => state.phase.status(),
            Err(_) => AccessStatus::Uninitialized,
        }
    }

    /// Returns the resolved context.
    pub fn context(&self) -> AppResult<Arc<AccessContext>> {
        match &self.state.borrow().phase {
            Phase::Ready(context) => Ok(context.clone()),
            Phase::Failed(message) => Err(AppError::Unavailable(format!(
                "access context failed to resolve: {message}"
            ))),
            Phase::Loading => Err(AppError::Unavailable(
                "access context is not ready: resolution in progress".to_owned(),
            )),
            Phase::Uninitialized => Err(AppError::Unavailable(
                "access context is not ready: session is not bound".to_owned(),
            )),
        }
    }

    /// Answers whether the session may perform `action` on a module.
    pub fn can(&self, module_slug: &str, action: Action) -> AppResult<bool> {
        Ok(self.context()?.can(module_slug, action))
    }

    /// Explains the decision for `action` on a module.
    pub fn explain(&self, module_slug: &str, action: Action) -> AppResult<AccessDecision> {
        Ok(self.context()?.explain(module_slug, action))
    }

    /// Answers whether the session holds any of the roles.
    pub fn has_role(&self, roles: &[Role]) -> AppResult<bool> {
        Ok(self.context()?.has_role(roles))
    }

    /// Like [`AccessSession::has_role`], for role names supplied as text.
    pub fn has_role_named(&self, role_names: &[&str]) -> AppResult<bool> {
        let context = self.context()?;
        let roles = self.resolver.config().parse_role_names(role_names)?;
        Ok(context.has_role(&roles))
    }
}
