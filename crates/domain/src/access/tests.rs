use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use steward_core::IdentityId;

use crate::{
    Action, ActionSet, CommitteeId, CommitteeMembership, Coverage, CustomRoleId, DecisionReason,
    DepartmentId, FallbackPolicy, IdentitySnapshot, ModuleCategory, ModuleDefinition, ModuleId,
    PermissionGrant, PrimaryAssignment, Role, RoleTier, ScopedRoleAssignment,
};

use super::{AccessContext, AccessContextInput};

struct Catalog {
    finance: ModuleDefinition,
    choir: ModuleDefinition,
    console: ModuleDefinition,
    bulletin: ModuleDefinition,
    archive: ModuleDefinition,
}

impl Catalog {
    fn new() -> Self {
        Self {
            finance: module("finance", ModuleCategory::FinanceLike, true),
            choir: module("choir", ModuleCategory::MinistryOperational, true),
            console: module("admin", ModuleCategory::Administrative, true),
            bulletin: module("bulletin", ModuleCategory::Uncategorized, true),
            archive: module("archive", ModuleCategory::MinistryOperational, false),
        }
    }

    fn all(&self) -> Vec<ModuleDefinition> {
        vec![
            self.finance.clone(),
            self.choir.clone(),
            self.console.clone(),
            self.bulletin.clone(),
            self.archive.clone(),
        ]
    }
}

fn module(slug: &str, category: ModuleCategory, is_active: bool) -> ModuleDefinition {
    ModuleDefinition::new(ModuleId::new(), slug, slug, category, is_active)
        .unwrap_or_else(|_| unreachable!())
}

fn context(
    catalog: &Catalog,
    snapshot: IdentitySnapshot,
    grants: Vec<PermissionGrant>,
) -> AccessContext {
    AccessContext::resolve(AccessContextInput {
        identity_id: IdentityId::new(),
        snapshot,
        grants,
        modules: catalog.all(),
        policy: Arc::new(FallbackPolicy::standard()),
        resolved_at: Utc::now(),
    })
}

fn primary_only(role: Role) -> IdentitySnapshot {
    IdentitySnapshot {
        primary: Some(PrimaryAssignment {
            home_branch_id: None,
            primary_role: role,
        }),
        ..IdentitySnapshot::default()
    }
}

#[test]
fn anonymous_context_denies_everything() {
    let context = AccessContext::anonymous(Arc::new(FallbackPolicy::standard()), Utc::now());

    for role in Role::all() {
        assert!(!context.has_role(&[*role]));
    }
    for action in Action::all() {
        assert!(!context.can("finance", *action));
        assert!(!context.can("choir", *action));
    }
    assert_eq!(
        context.explain("choir", Action::View).reason,
        DecisionReason::NotAuthenticated
    );
    assert!(context.effective_actions("choir").is_empty());
}

#[test]
fn leadership_fallback_on_finance() {
    let catalog = Catalog::new();
    for role in [Role::Leader, Role::Pastor] {
        let context = context(&catalog, primary_only(role), Vec::new());
        assert!(context.can("finance", Action::View));
        assert!(context.can("finance", Action::Update));
        assert!(!context.can("finance", Action::Delete));
    }
}

#[test]
fn worker_fallback_on_ministry_module() {
    let catalog = Catalog::new();
    let context = context(&catalog, primary_only(Role::Worker), Vec::new());

    assert!(context.can("choir", Action::View));
    assert!(context.can("choir", Action::Create));
    assert!(!context.can("choir", Action::Delete));
    assert!(!context.can("finance", Action::View));
    assert!(
        matches!(
            context.explain("choir", Action::Create).reason,
            DecisionReason::Fallback {
                tier: RoleTier::Worker,
                category: ModuleCategory::MinistryOperational,
                policy_version: 1,
            }
        )
    );
}

#[test]
fn member_may_only_view_ministry_and_uncategorized_modules() {
    let catalog = Catalog::new();
    let context = context(&catalog, primary_only(Role::Member), Vec::new());

    assert!(context.can("choir", Action::View));
    assert!(!context.can("choir", Action::Create));
    assert!(context.can("bulletin", Action::View));
    assert!(!context.can("bulletin", Action::Update));
    assert!(!context.can("finance", Action::View));
}

#[test]
fn identity_without_any_role_falls_into_member_tier() {
    let catalog = Catalog::new();
    let context = context(&catalog, IdentitySnapshot::default(), Vec::new());

    assert_eq!(context.tier(), RoleTier::Member);
    assert!(context.can("bulletin", Action::View));
    assert!(!context.can("bulletin", Action::Delete));
}

#[test]
fn administrative_module_is_closed_to_leadership() {
    let catalog = Catalog::new();
    let context = context(&catalog, primary_only(Role::Pastor), Vec::new());

    for action in Action::all() {
        assert!(!context.can("admin", *action));
    }
}

#[test]
fn super_tier_reaches_administrative_module() {
    let catalog = Catalog::new();
    let context = context(&catalog, primary_only(Role::Admin), Vec::new());

    assert!(context.can("admin", Action::Manage));
    assert!(context.can("finance", Action::Delete));
    assert_eq!(
        context.explain("admin", Action::View).reason,
        DecisionReason::SuperTier
    );
}

#[test]
fn department_grant_requires_matching_assignment() {
    let catalog = Catalog::new();
    let custom_role_id = CustomRoleId::new();
    let department_id = DepartmentId::new();
    let snapshot = IdentitySnapshot {
        scoped_assignments: vec![
            ScopedRoleAssignment::role(Role::Member)
                .with_custom_role(custom_role_id)
                .in_department(department_id),
        ],
        ..IdentitySnapshot::default()
    };
    let grant = PermissionGrant {
        custom_role_id,
        module_id: catalog.finance.module_id(),
        allowed_actions: ActionSet::of(&[Action::View, Action::Update]),
        coverage: Coverage::Department { department_id },
    };

    let matching = context(&catalog, snapshot.clone(), vec![grant]);
    assert!(matching.can("finance", Action::View));
    assert!(matching.can("finance", Action::Update));
    assert!(!matching.can("finance", Action::Delete));
    assert_eq!(
        matching.explain("finance", Action::Update).reason,
        DecisionReason::ExplicitGrant { custom_role_id }
    );

    let other_department = PermissionGrant {
        coverage: Coverage::Department {
            department_id: DepartmentId::new(),
        },
        ..grant
    };
    let mismatched = context(&catalog, snapshot, vec![other_department]);
    assert!(!mismatched.can("finance", Action::View));
    assert!(!mismatched.can("finance", Action::Update));
    assert!(!mismatched.can("finance", Action::Delete));
}

#[test]
fn department_grant_ignores_assignment_of_another_custom_role() {
    let catalog = Catalog::new();
    let held_role = CustomRoleId::new();
    let granted_role = CustomRoleId::new();
    let department_id = DepartmentId::new();
    let snapshot = IdentitySnapshot {
        scoped_assignments: vec![
            ScopedRoleAssignment::role(Role::Member)
                .with_custom_role(held_role)
                .in_department(department_id),
            ScopedRoleAssignment::role(Role::Member).with_custom_role(granted_role),
        ],
        ..IdentitySnapshot::default()
    };
    let grant = PermissionGrant {
        custom_role_id: granted_role,
        module_id: catalog.finance.module_id(),
        allowed_actions: ActionSet::of(&[Action::View]),
        coverage: Coverage::Department { department_id },
    };

    let context = context(&catalog, snapshot, vec![grant]);
    assert!(!context.can("finance", Action::View));
}

#[test]
fn committee_manage_grant_implies_delete() {
    let catalog = Catalog::new();
    let custom_role_id = CustomRoleId::new();
    let committee_id = CommitteeId::new();
    let snapshot = IdentitySnapshot {
        scoped_assignments: vec![
            ScopedRoleAssignment::role(Role::Member).with_custom_role(custom_role_id),
        ],
        committee_memberships: vec![CommitteeMembership { committee_id }],
        ..IdentitySnapshot::default()
    };
    let grant = PermissionGrant {
        custom_role_id,
        module_id: catalog.finance.module_id(),
        allowed_actions: ActionSet::of(&[Action::Manage]),
        coverage: Coverage::Committee { committee_id },
    };

    let context = context(&catalog, snapshot.clone(), vec![grant]);
    assert!(context.can("finance", Action::Delete));
    assert!(context.effective_actions("finance").contains(Action::Create));

    let outsider = IdentitySnapshot {
        committee_memberships: Vec::new(),
        ..snapshot
    };
    let outsider_context = self::context(&catalog, outsider, vec![grant]);
    assert!(!outsider_context.can("finance", Action::Delete));
}

#[test]
fn grants_of_custom_roles_not_held_are_ignored() {
    let catalog = Catalog::new();
    let grant = PermissionGrant {
        custom_role_id: CustomRoleId::new(),
        module_id: catalog.finance.module_id(),
        allowed_actions: ActionSet::of(&[Action::Manage]),
        coverage: Coverage::Global,
    };

    let context = context(&catalog, primary_only(Role::Worker), vec![grant]);
    assert!(!context.can("finance", Action::View));
}

#[test]
fn explicit_grant_extends_fallback() {
    let catalog = Catalog::new();
    let custom_role_id = CustomRoleId::new();
    let snapshot = IdentitySnapshot {
        primary: Some(PrimaryAssignment {
            home_branch_id: None,
            primary_role: Role::Worker,
        }),
        scoped_assignments: vec![
            ScopedRoleAssignment::role(Role::Worker).with_custom_role(custom_role_id),
        ],
        committee_memberships: Vec::new(),
    };
    let grant = PermissionGrant {
        custom_role_id,
        module_id: catalog.choir.module_id(),
        allowed_actions: ActionSet::of(&[Action::Delete]),
        coverage: Coverage::Branch,
    };

    let context = context(&catalog, snapshot, vec![grant]);
    assert!(context.can("choir", Action::Delete));
    assert!(context.can("choir", Action::Create));
    assert!(!context.can("choir", Action::Update));
    assert_eq!(
        context.effective_actions("choir"),
        ActionSet::of(&[Action::View, Action::Create, Action::Delete])
    );
}

#[test]
fn inactive_and_unknown_modules_deny_even_with_grants() {
    let catalog = Catalog::new();
    let custom_role_id = CustomRoleId::new();
    let snapshot = IdentitySnapshot {
        primary: Some(PrimaryAssignment {
            home_branch_id: None,
            primary_role: Role::Leader,
        }),
        scoped_assignments: vec![
            ScopedRoleAssignment::role(Role::Leader).with_custom_role(custom_role_id),
        ],
        committee_memberships: Vec::new(),
    };
    let grant = PermissionGrant {
        custom_role_id,
        module_id: catalog.archive.module_id(),
        allowed_actions: ActionSet::of(&[Action::Manage]),
        coverage: Coverage::Global,
    };

    let context = context(&catalog, snapshot, vec![grant]);
    assert!(!context.can("archive", Action::View));
    assert_eq!(
        context.explain("archive", Action::View).reason,
        DecisionReason::InactiveModule
    );
    assert!(!context.can("no-such-module", Action::View));
    assert_eq!(
        context.explain("no-such-module", Action::View).reason,
        DecisionReason::UnknownModule
    );
}

#[test]
fn has_role_is_scope_blind_any_of() {
    let catalog = Catalog::new();
    let snapshot = IdentitySnapshot {
        scoped_assignments: vec![ScopedRoleAssignment::role(Role::Leader)
            .in_department(DepartmentId::new())],
        ..IdentitySnapshot::default()
    };

    let context = context(&catalog, snapshot, Vec::new());
    assert!(context.has_role(&[Role::Leader]));
    assert!(!context.has_role(&[Role::Admin]));
    assert!(context.has_role(&[Role::Leader, Role::Pastor]));
    assert!(!context.has_role(&[]));
}

#[test]
fn scoped_role_counts_towards_fallback_tier() {
    let catalog = Catalog::new();
    let snapshot = IdentitySnapshot {
        primary: Some(PrimaryAssignment {
            home_branch_id: None,
            primary_role: Role::Member,
        }),
        scoped_assignments: vec![ScopedRoleAssignment::role(Role::Pastor)],
        committee_memberships: Vec::new(),
    };

    let context = context(&catalog, snapshot, Vec::new());
    assert_eq!(context.tier(), RoleTier::Leadership);
    assert!(context.can("choir", Action::Delete));
}

#[test]
fn repeated_queries_are_stable() {
    let catalog = Catalog::new();
    let context = context(&catalog, primary_only(Role::Worker), Vec::new());

    let first = context.explain("choir", Action::Create);
    let second = context.explain("choir", Action::Create);
    assert_eq!(first, second);
}

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::all().to_vec())
}

fn any_action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::all().to_vec())
}

proptest! {
    #[test]
    fn super_tier_grants_every_module_and_action(
        super_role in prop::sample::select(vec![Role::SuperAdmin, Role::Admin]),
        other_roles in prop::collection::vec(any_role(), 0..4),
        action in any_action(),
        slug in "[a-z]{1,12}",
    ) {
        let catalog = Catalog::new();
        let snapshot = IdentitySnapshot {
            primary: Some(PrimaryAssignment { home_branch_id: None, primary_role: Role::Member }),
            scoped_assignments: other_roles
                .into_iter()
                .chain(std::iter::once(super_role))
                .map(ScopedRoleAssignment::role)
                .collect(),
            committee_memberships: Vec::new(),
        };
        let context = context(&catalog, snapshot, Vec::new());

        prop_assert!(context.can(slug.as_str(), action));
        prop_assert!(context.can("admin", action));
    }

    #[test]
    fn effective_actions_agree_with_can(role in any_role(), action in any_action()) {
        let catalog = Catalog::new();
        let context = context(&catalog, primary_only(role), Vec::new());

        for slug in ["finance", "choir", "admin", "bulletin", "archive"] {
            prop_assert_eq!(context.effective_actions(slug).contains(action), context.can(slug, action));
        }
    }
}
