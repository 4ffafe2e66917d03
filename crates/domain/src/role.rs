use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use steward_core::AppError;

/// Coarse roles an identity may hold, either as its primary role or through a scoped assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform-wide administrator.
    SuperAdmin,
    /// Organization administrator.
    Admin,
    /// Pastor of a branch or ministry.
    Pastor,
    /// Leader of a department, ministry or committee.
    Leader,
    /// Volunteer or staff worker.
    Worker,
    /// Registered member.
    Member,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Pastor => "pastor",
            Self::Leader => "leader",
            Self::Worker => "worker",
            Self::Member => "member",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::SuperAdmin,
            Role::Admin,
            Role::Pastor,
            Role::Leader,
            Role::Worker,
            Role::Member,
        ];

        ALL
    }

    /// Returns the coarse tier this role belongs to.
    #[must_use]
    pub fn tier(&self) -> RoleTier {
        match self {
            Self::SuperAdmin | Self::Admin => RoleTier::SuperTier,
            Self::Pastor | Self::Leader => RoleTier::Leadership,
            Self::Worker => RoleTier::Worker,
            Self::Member => RoleTier::Member,
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "pastor" => Ok(Self::Pastor),
            "leader" => Ok(Self::Leader),
            "worker" => Ok(Self::Worker),
            "member" => Ok(Self::Member),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Coarse role tiers used by the fallback policy.
///
/// Ordered from most to least privileged; the fallback policy always uses the
/// most privileged tier an identity reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
    /// `super_admin` and `admin`; bypasses grants and fallback entirely.
    SuperTier,
    /// `pastor` and `leader`.
    Leadership,
    /// `worker`.
    Worker,
    /// `member`, or no role at all.
    Member,
}

impl RoleTier {
    /// Returns a stable storage value for this tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperTier => "super_tier",
            Self::Leadership => "leadership",
            Self::Worker => "worker",
            Self::Member => "member",
        }
    }

    /// Returns the most privileged tier reached by any of the roles.
    ///
    /// An empty role set falls into [`RoleTier::Member`].
    #[must_use]
    pub fn highest<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Self {
        roles
            .into_iter()
            .map(Role::tier)
            .min()
            .unwrap_or(Self::Member)
    }
}

impl Display for RoleTier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
