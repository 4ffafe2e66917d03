use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use steward_core::AppError;

/// Actions that can be requested against a module.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read access.
    #[default]
    View,
    /// Create new records.
    Create,
    /// Update existing records.
    Update,
    /// Delete records.
    Delete,
    /// Full control; implies every other action on the same module.
    Manage,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::View,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ];

        ALL
    }

    const fn bit(self) -> u8 {
        match self {
            Self::View => 1,
            Self::Create => 1 << 1,
            Self::Update => 1 << 2,
            Self::Delete => 1 << 3,
            Self::Manage => 1 << 4,
        }
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "view" => Ok(Self::View),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            _ => Err(AppError::Validation(format!(
                "unknown action value '{value}'"
            ))),
        }
    }
}

/// Compact set of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Action>", from = "Vec<Action>")]
pub struct ActionSet(u8);

impl ActionSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from a list of actions.
    #[must_use]
    pub const fn of(actions: &[Action]) -> Self {
        let mut bits = 0_u8;
        let mut index = 0;
        while index < actions.len() {
            bits |= actions[index].bit();
            index += 1;
        }
        Self(bits)
    }

    /// Returns whether the action is listed explicitly.
    #[must_use]
    pub const fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    /// Returns whether the set allows the action, counting `manage` as every action.
    #[must_use]
    pub const fn permits(&self, action: Action) -> bool {
        self.contains(action) || self.contains(Action::Manage)
    }

    /// Returns whether no action is listed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Adds one action.
    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    /// Returns every action the set allows, expanding `manage`.
    #[must_use]
    pub fn permitted(&self) -> Self {
        if self.contains(Action::Manage) {
            Self::of(Action::all())
        } else {
            *self
        }
    }

    /// Iterates listed actions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::all()
            .iter()
            .copied()
            .filter(|action| self.contains(*action))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        let mut set = Self::EMPTY;
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl From<Vec<Action>> for ActionSet {
    fn from(value: Vec<Action>) -> Self {
        value.into_iter().collect()
    }
}

impl From<ActionSet> for Vec<Action> {
    fn from(value: ActionSet) -> Self {
        value.iter().collect()
    }
}
