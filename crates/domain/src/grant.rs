use std::str::FromStr;

use serde::{Deserialize, Serialize};
use steward_core::{AppError, AppResult};

use crate::{ActionSet, CommitteeId, CustomRoleId, DepartmentId, ModuleId};

/// Dimension along which a permission grant is restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Coverage {
    /// Applies to every holder of the custom role.
    Global,
    /// Applies to every holder of the custom role, whatever their branch.
    Branch,
    /// Applies to holders of the custom role within one department.
    Department {
        /// Department the holder must be assigned in.
        department_id: DepartmentId,
    },
    /// Applies to members of one committee.
    Committee {
        /// Committee the identity must sit on.
        committee_id: CommitteeId,
    },
}

impl Coverage {
    /// Rebuilds a coverage from its flattened storage columns.
    ///
    /// Department and committee coverages require their scope id; the other
    /// types must not carry one.
    pub fn from_parts(
        coverage_type: &str,
        department_id: Option<DepartmentId>,
        committee_id: Option<CommitteeId>,
    ) -> AppResult<Self> {
        match (
            CoverageType::from_str(coverage_type)?,
            department_id,
            committee_id,
        ) {
            (CoverageType::Global, None, None) => Ok(Self::Global),
            (CoverageType::Branch, None, None) => Ok(Self::Branch),
            (CoverageType::Department, Some(department_id), None) => {
                Ok(Self::Department { department_id })
            }
            (CoverageType::Committee, None, Some(committee_id)) => {
                Ok(Self::Committee { committee_id })
            }
            (CoverageType::Department, None, _) => Err(AppError::Validation(
                "department coverage requires a department id".to_owned(),
            )),
            (CoverageType::Committee, _, None) => Err(AppError::Validation(
                "committee coverage requires a committee id".to_owned(),
            )),
            (coverage_type, _, _) => Err(AppError::Validation(format!(
                "{} coverage carries an unexpected scope id",
                coverage_type.as_str()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoverageType {
    Global,
    Branch,
    Department,
    Committee,
}

impl CoverageType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Branch => "branch",
            Self::Department => "department",
            Self::Committee => "committee",
        }
    }
}

impl FromStr for CoverageType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "branch" => Ok(Self::Branch),
            "department" => Ok(Self::Department),
            "committee" => Ok(Self::Committee),
            _ => Err(AppError::Validation(format!(
                "unknown coverage type '{value}'"
            ))),
        }
    }
}

/// Actions a custom role receives on one module, restricted by coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Custom role that owns the grant.
    pub custom_role_id: CustomRoleId,
    /// Module the grant applies to.
    pub module_id: ModuleId,
    /// Actions allowed by the grant.
    pub allowed_actions: ActionSet,
    /// Coverage restriction.
    pub coverage: Coverage,
}
