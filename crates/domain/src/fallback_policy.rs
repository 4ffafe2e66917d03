//! Default action sets applied when no explicit grant resolves a query.
//!
//! The table is plain data so it can be versioned, shipped as a JSON file and
//! audited independently of the resolution algorithm.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use steward_core::{AppError, AppResult};

use crate::{Action, ActionSet, ModuleCategory, RoleTier};

/// Version of the built-in table.
pub const STANDARD_FALLBACK_POLICY_VERSION: u32 = 1;

const STANDARD_RULES: &[(RoleTier, ModuleCategory, ActionSet)] = &[
    (
        RoleTier::Leadership,
        ModuleCategory::FinanceLike,
        ActionSet::of(&[Action::View, Action::Update]),
    ),
    (
        RoleTier::Leadership,
        ModuleCategory::MinistryOperational,
        ActionSet::of(&[
            Action::View,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ]),
    ),
    (
        RoleTier::Leadership,
        ModuleCategory::Uncategorized,
        ActionSet::of(&[Action::View]),
    ),
    (
        RoleTier::Worker,
        ModuleCategory::MinistryOperational,
        ActionSet::of(&[Action::View, Action::Create]),
    ),
    (
        RoleTier::Worker,
        ModuleCategory::Uncategorized,
        ActionSet::of(&[Action::View]),
    ),
    (
        RoleTier::Member,
        ModuleCategory::MinistryOperational,
        ActionSet::of(&[Action::View]),
    ),
    (
        RoleTier::Member,
        ModuleCategory::Uncategorized,
        ActionSet::of(&[Action::View]),
    ),
];

/// One cell of the serialized policy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    /// Role tier the cell applies to.
    pub tier: RoleTier,
    /// Module category the cell applies to.
    pub category: ModuleCategory,
    /// Default actions for the tier in that category.
    pub actions: ActionSet,
}

/// Serialized form of a fallback policy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicyDocument {
    /// Monotonic table version.
    pub version: u32,
    /// Non-empty cells; missing cells grant nothing.
    pub rules: Vec<FallbackRule>,
}

/// Validated fallback policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    version: u32,
    cells: BTreeMap<(RoleTier, ModuleCategory), ActionSet>,
}

impl FallbackPolicy {
    /// Returns the built-in table.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            version: STANDARD_FALLBACK_POLICY_VERSION,
            cells: STANDARD_RULES
                .iter()
                .map(|(tier, category, actions)| ((*tier, *category), *actions))
                .collect(),
        }
    }

    /// Validates a serialized table.
    pub fn from_document(document: FallbackPolicyDocument) -> AppResult<Self> {
        if document.version == 0 {
            return Err(AppError::Validation(
                "fallback policy version must be greater than zero".to_owned(),
            ));
        }

        let mut cells = BTreeMap::new();
        for rule in document.rules {
            if rule.tier == RoleTier::SuperTier {
                return Err(AppError::Validation(
                    "fallback policy must not define rules for the super tier".to_owned(),
                ));
            }

            if rule.category == ModuleCategory::Administrative && !rule.actions.is_empty() {
                return Err(AppError::Validation(format!(
                    "fallback policy must not grant '{}' any administrative access",
                    rule.tier
                )));
            }

            if cells
                .insert((rule.tier, rule.category), rule.actions)
                .is_some()
            {
                return Err(AppError::Validation(format!(
                    "fallback policy defines '{}'/'{}' more than once",
                    rule.tier, rule.category
                )));
            }
        }

        Ok(Self {
            version: document.version,
            cells,
        })
    }

    /// Parses and validates a JSON table.
    pub fn from_json(value: &str) -> AppResult<Self> {
        let document = serde_json::from_str::<FallbackPolicyDocument>(value).map_err(|error| {
            AppError::Validation(format!("invalid fallback policy document: {error}"))
        })?;

        Self::from_document(document)
    }

    /// Returns the serialized form of this table.
    #[must_use]
    pub fn to_document(&self) -> FallbackPolicyDocument {
        FallbackPolicyDocument {
            version: self.version,
            rules: self
                .cells
                .iter()
                .filter(|(_, actions)| !actions.is_empty())
                .map(|((tier, category), actions)| FallbackRule {
                    tier: *tier,
                    category: *category,
                    actions: *actions,
                })
                .collect(),
        }
    }

    /// Returns the table version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the default actions of a tier in a category.
    #[must_use]
    pub fn allowed(&self, tier: RoleTier, category: ModuleCategory) -> ActionSet {
        self.cells
            .get(&(tier, category))
            .copied()
            .unwrap_or(ActionSet::EMPTY)
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
