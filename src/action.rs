//! Actions and action sets.
//!
//! An [`Action`] is one of the four CRUD verbs or the `manage` wildcard. An
//! [`ActionSet`] keeps the actions granted on one subject: unique, in the order
//! they were granted, but compared as a set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// Wildcard verb; matches every action in an ability check.
    Manage,
}

impl Action {
    /// Toggleable actions, in presentation order.
    pub const CRUD: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }

    /// Whether the action can be toggled in a permission matrix.
    pub fn is_crud(self) -> bool {
        !matches!(self, Action::Manage)
    }

    /// Column index in the read/create/update/delete presentation order.
    pub fn column(self) -> Option<usize> {
        Self::CRUD.iter().position(|a| *a == self)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Action::Read),
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "manage" => Ok(Action::Manage),
            _ => Err(Error::InvalidAction(value.to_string())),
        }
    }
}

/// Insertion-ordered set of actions.
#[derive(Debug, Clone, Default, Eq)]
pub struct ActionSet(Vec<Action>);

impl ActionSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    /// Add `action`; returns false if it was already present.
    pub fn insert(&mut self, action: Action) -> bool {
        if self.contains(action) {
            return false;
        }
        self.0.push(action);
        true
    }

    /// Remove `action`; returns false if it was absent.
    pub fn remove(&mut self, action: Action) -> bool {
        let before = self.0.len();
        self.0.retain(|a| *a != action);
        self.0.len() != before
    }

    /// Flip membership of `action`. Returns true if it is now present.
    pub fn toggle(&mut self, action: Action) -> bool {
        if self.remove(action) {
            false
        } else {
            self.0.push(action);
            true
        }
    }

    /// Whether an ability check for `action` passes against this set.
    pub fn permits(&self, action: Action) -> bool {
        self.contains(action) || self.contains(Action::Manage)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Actions in grant order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }

    /// CRUD membership in read/create/update/delete order.
    pub fn cells(&self) -> [bool; 4] {
        Action::CRUD.map(|a| self.contains(a))
    }

    pub fn extend(&mut self, other: &ActionSet) {
        for action in other.iter() {
            self.insert(action);
        }
    }
}

impl PartialEq for ActionSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|a| other.contains(a))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl<const N: usize> From<[Action; N]> for ActionSet {
    fn from(actions: [Action; N]) -> Self {
        actions.into_iter().collect()
    }
}

impl Serialize for ActionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for ActionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let actions = Vec::<Action>::deserialize(deserializer)?;
        Ok(actions.into_iter().collect())
    }
}
