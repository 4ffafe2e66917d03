use std::str::FromStr;

use serde::{Deserialize, Serialize};
use steward_core::AppError;
use uuid::Uuid;

macro_rules! scope_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!(concat!("invalid ", $label, " '{}': {}"), value, error))
                })
            }
        }
    };
}

scope_id!(
    /// Identifier of a branch (a physical congregation site).
    BranchId,
    "branch id"
);
scope_id!(
    /// Identifier of a department within a branch.
    DepartmentId,
    "department id"
);
scope_id!(
    /// Identifier of a ministry.
    MinistryId,
    "ministry id"
);
scope_id!(
    /// Identifier of a committee.
    CommitteeId,
    "committee id"
);
scope_id!(
    /// Identifier of a custom role definition that owns permission grants.
    CustomRoleId,
    "custom role id"
);
scope_id!(
    /// Identifier of a functional module in the catalog.
    ModuleId,
    "module id"
);
