//! Immutable per-identity decision context.
//!
//! An [`AccessContext`] is built once from everything the stores returned for
//! an identity and then answers `has_role`/`can` queries without further I/O.
//! Coverage matching happens at build time, so a query is a couple of map
//! lookups.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steward_core::IdentityId;

use crate::{
    Action, ActionSet, CommitteeId, Coverage, CustomRoleId, FallbackPolicy, IdentitySnapshot,
    ModuleCategory, ModuleDefinition, ModuleId, PermissionGrant, Role, RoleTier,
    ScopedRoleAssignment,
};

#[cfg(test)]
mod tests;

/// Everything needed to build a context for an authenticated identity.
#[derive(Debug, Clone)]
pub struct AccessContextInput {
    /// Identity the context is resolved for.
    pub identity_id: IdentityId,
    /// Roles, assignments and committee memberships of the identity.
    pub snapshot: IdentitySnapshot,
    /// Grants owned by the custom roles referenced in the snapshot.
    pub grants: Vec<PermissionGrant>,
    /// Full module catalog.
    pub modules: Vec<ModuleDefinition>,
    /// Fallback table in force.
    pub policy: Arc<FallbackPolicy>,
    /// Resolution timestamp.
    pub resolved_at: DateTime<Utc>,
}

/// A grant that survived coverage matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EffectiveGrant {
    custom_role_id: CustomRoleId,
    actions: ActionSet,
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionReason {
    /// No identity is bound.
    NotAuthenticated,
    /// The identity holds `super_admin` or `admin`.
    SuperTier,
    /// A coverage-matched grant of a held custom role allowed the action.
    ExplicitGrant {
        /// Custom role owning the grant.
        custom_role_id: CustomRoleId,
    },
    /// The fallback table allowed the action.
    Fallback {
        /// Tier the table was consulted with.
        tier: RoleTier,
        /// Category of the module.
        category: ModuleCategory,
        /// Version of the table.
        policy_version: u32,
    },
    /// The module slug is not in the catalog.
    UnknownModule,
    /// The module is switched off.
    InactiveModule,
    /// Neither grants nor the fallback table allowed the action.
    NoMatch {
        /// Tier the table was consulted with.
        tier: RoleTier,
        /// Category of the module.
        category: ModuleCategory,
    },
}

/// Outcome of one `can` query with its explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether access is granted.
    pub allowed: bool,
    /// Rule that decided.
    pub reason: DecisionReason,
}

impl AccessDecision {
    fn allow(reason: DecisionReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Resolved, immutable authorization snapshot for one identity.
#[derive(Debug, Clone)]
pub struct AccessContext {
    identity_id: Option<IdentityId>,
    roles: BTreeSet<Role>,
    tier: RoleTier,
    modules: HashMap<String, ModuleDefinition>,
    grants_by_module: HashMap<ModuleId, Vec<EffectiveGrant>>,
    policy: Arc<FallbackPolicy>,
    resolved_at: DateTime<Utc>,
}

impl AccessContext {
    /// Creates the context of a caller without identity. Every check is false.
    #[must_use]
    pub fn anonymous(policy: Arc<FallbackPolicy>, resolved_at: DateTime<Utc>) -> Self {
        Self {
            identity_id: None,
            roles: BTreeSet::new(),
            tier: RoleTier::Member,
            modules: HashMap::new(),
            grants_by_module: HashMap::new(),
            policy,
            resolved_at,
        }
    }

    /// Combines store results into a context.
    #[must_use]
    pub fn resolve(input: AccessContextInput) -> Self {
        let AccessContextInput {
            identity_id,
            snapshot,
            grants,
            modules,
            policy,
            resolved_at,
        } = input;

        let mut roles: BTreeSet<Role> = snapshot
            .scoped_assignments
            .iter()
            .map(|assignment| assignment.role)
            .collect();
        if let Some(primary) = snapshot.primary {
            roles.insert(primary.primary_role);
        }

        let committee_ids: BTreeSet<CommitteeId> = snapshot
            .committee_memberships
            .iter()
            .map(|membership| membership.committee_id)
            .collect();
        let held_custom_roles = snapshot.custom_role_ids();

        let mut grants_by_module: HashMap<ModuleId, Vec<EffectiveGrant>> = HashMap::new();
        for grant in grants {
            if !held_custom_roles.contains(&grant.custom_role_id) {
                continue;
            }

            if !coverage_matches(&grant, &snapshot.scoped_assignments, &committee_ids) {
                continue;
            }

            grants_by_module
                .entry(grant.module_id)
                .or_default()
                .push(EffectiveGrant {
                    custom_role_id: grant.custom_role_id,
                    actions: grant.allowed_actions,
                });
        }

        let modules = modules
            .into_iter()
            .map(|module| (module.slug().as_str().to_owned(), module))
            .collect();

        Self {
            identity_id: Some(identity_id),
            tier: RoleTier::highest(roles.iter()),
            roles,
            modules,
            grants_by_module,
            policy,
            resolved_at,
        }
    }

    /// Returns the identity, or `None` for an anonymous context.
    #[must_use]
    pub fn identity_id(&self) -> Option<IdentityId> {
        self.identity_id
    }

    /// Returns whether an identity is bound.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity_id.is_some()
    }

    /// Returns the merged role set.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Returns the most privileged tier the identity reaches.
    #[must_use]
    pub fn tier(&self) -> RoleTier {
        self.tier
    }

    /// Returns the version of the fallback table in force.
    #[must_use]
    pub fn policy_version(&self) -> u32 {
        self.policy.version()
    }

    /// Returns when the context was resolved.
    #[must_use]
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Returns true when any of the roles is held, in any scope.
    #[must_use]
    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.roles.contains(role))
    }

    /// Returns whether the identity may perform the action on the module.
    #[must_use]
    pub fn can(&self, module_slug: &str, action: Action) -> bool {
        self.explain(module_slug, action).allowed
    }

    /// Decides a query and reports the rule that decided it.
    #[must_use]
    pub fn explain(&self, module_slug: &str, action: Action) -> AccessDecision {
        if !self.is_authenticated() {
            return AccessDecision::deny(DecisionReason::NotAuthenticated);
        }

        if self.tier == RoleTier::SuperTier {
            return AccessDecision::allow(DecisionReason::SuperTier);
        }

        let Some(module) = self.modules.get(module_slug) else {
            return AccessDecision::deny(DecisionReason::UnknownModule);
        };

        if !module.is_active() {
            return AccessDecision::deny(DecisionReason::InactiveModule);
        }

        if let Some(grant) = self
            .grants_by_module
            .get(&module.module_id())
            .and_then(|grants| grants.iter().find(|grant| grant.actions.permits(action)))
        {
            return AccessDecision::allow(DecisionReason::ExplicitGrant {
                custom_role_id: grant.custom_role_id,
            });
        }

        let category = module.category();
        if self.policy.allowed(self.tier, category).permits(action) {
            return AccessDecision::allow(DecisionReason::Fallback {
                tier: self.tier,
                category,
                policy_version: self.policy.version(),
            });
        }

        AccessDecision::deny(DecisionReason::NoMatch {
            tier: self.tier,
            category,
        })
    }

    /// Returns every action the identity may perform on the module, with `manage` expanded.
    #[must_use]
    pub fn effective_actions(&self, module_slug: &str) -> ActionSet {
        if !self.is_authenticated() {
            return ActionSet::EMPTY;
        }

        if self.tier == RoleTier::SuperTier {
            return ActionSet::of(Action::all());
        }

        let Some(module) = self
            .modules
            .get(module_slug)
            .filter(|module| module.is_active())
        else {
            return ActionSet::EMPTY;
        };

        let granted = self
            .grants_by_module
            .get(&module.module_id())
            .into_iter()
            .flatten()
            .fold(ActionSet::EMPTY, |set, grant| set.union(grant.actions));

        granted
            .union(self.policy.allowed(self.tier, module.category()))
            .permitted()
    }
}

fn coverage_matches(
    grant: &PermissionGrant,
    assignments: &[ScopedRoleAssignment],
    committee_ids: &BTreeSet<CommitteeId>,
) -> bool {
    match grant.coverage {
        Coverage::Global | Coverage::Branch => true,
        Coverage::Department { department_id } => assignments.iter().any(|assignment| {
            assignment.custom_role_id == Some(grant.custom_role_id)
                && assignment.department_id == Some(department_id)
        }),
        Coverage::Committee { committee_id } => committee_ids.contains(&committee_id),
    }
}
