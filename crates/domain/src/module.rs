use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use steward_core::{AppError, AppResult};

use crate::ModuleId;

const MODULE_SLUG_MAX_LENGTH: usize = 64;

/// Stable slug naming a functional module, e.g. `finance` or `choir`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleSlug(String);

impl ModuleSlug {
    /// Creates a validated module slug.
    ///
    /// Slugs are lowercase ASCII letters, digits, `_` and `-`, at most 64 characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::Validation(
                "module slug must not be empty".to_owned(),
            ));
        }

        if value.len() > MODULE_SLUG_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "module slug must not exceed {MODULE_SLUG_MAX_LENGTH} characters"
            )));
        }

        let valid = value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-');
        if !valid {
            return Err(AppError::Validation(format!(
                "module slug '{value}' may only contain lowercase letters, digits, '_' and '-'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the slug text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ModuleSlug {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModuleSlug> for String {
    fn from(value: ModuleSlug) -> Self {
        value.0
    }
}

impl Display for ModuleSlug {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Category tag the fallback policy is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleCategory {
    /// Finance, giving, budgets.
    FinanceLike,
    /// Day-to-day ministry operations such as choir, ushering or outreach.
    MinistryOperational,
    /// The administrative console.
    Administrative,
    /// Anything not tagged.
    Uncategorized,
}

impl ModuleCategory {
    /// Returns a stable storage value for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinanceLike => "finance_like",
            Self::MinistryOperational => "ministry_operational",
            Self::Administrative => "administrative",
            Self::Uncategorized => "uncategorized",
        }
    }
}

impl Display for ModuleCategory {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ModuleCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "finance_like" => Ok(Self::FinanceLike),
            "ministry_operational" => Ok(Self::MinistryOperational),
            "administrative" => Ok(Self::Administrative),
            "uncategorized" => Ok(Self::Uncategorized),
            _ => Err(AppError::Validation(format!(
                "unknown module category '{value}'"
            ))),
        }
    }
}

/// Catalog entry for a functional module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    module_id: ModuleId,
    slug: ModuleSlug,
    display_name: String,
    category: ModuleCategory,
    is_active: bool,
}

impl ModuleDefinition {
    /// Creates a validated module definition.
    pub fn new(
        module_id: ModuleId,
        slug: impl Into<String>,
        display_name: impl Into<String>,
        category: ModuleCategory,
        is_active: bool,
    ) -> AppResult<Self> {
        let slug = ModuleSlug::new(slug)?;
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            slug.as_str().to_owned()
        } else {
            display_name
        };

        Ok(Self {
            module_id,
            slug,
            display_name,
            category,
            is_active,
        })
    }

    /// Returns the stable module identifier.
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Returns the module slug.
    #[must_use]
    pub fn slug(&self) -> &ModuleSlug {
        &self.slug
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the fallback category.
    #[must_use]
    pub fn category(&self) -> ModuleCategory {
        self.category
    }

    /// Returns whether the module accepts any access at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
