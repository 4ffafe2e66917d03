use serde::{Deserialize, Serialize};
use steward_domain::{AccessContext, AccessDecision, Action, ActionSet, DecisionReason};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Query string of a single access decision.
#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub module: String,
    pub action: Option<String>,
}

/// Query string of a role check, with comma separated role names.
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub any_of: String,
}

/// API representation of an access decision.
#[derive(Debug, Serialize)]
pub struct AccessDecisionResponse {
    pub identity_id: String,
    pub module: String,
    pub action: Action,
    pub allowed: bool,
    pub reason: DecisionReason,
    pub policy_version: u32,
    pub resolved_at: String,
}

impl AccessDecisionResponse {
    pub fn new(
        identity_id: String,
        module: String,
        action: Action,
        decision: AccessDecision,
        context: &AccessContext,
    ) -> Self {
        Self {
            identity_id,
            module,
            action,
            allowed: decision.allowed,
            reason: decision.reason,
            policy_version: context.policy_version(),
            resolved_at: context.resolved_at().to_rfc3339(),
        }
    }
}

/// Actions an identity may perform on one module, with `manage` expanded.
#[derive(Debug, Serialize)]
pub struct EffectiveActionsResponse {
    pub identity_id: String,
    pub module: String,
    pub actions: ActionSet,
}

/// Result of a role check.
#[derive(Debug, Serialize)]
pub struct RoleCheckResponse {
    pub identity_id: String,
    pub has_role: bool,
}
