//! Permission rules and their wire forms.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{Action, ActionSet};
use crate::subject::SubjectName;

/// A granted `(subject, actions)` pair. Never holds an empty action set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    subject: SubjectName,
    actions: ActionSet,
}

impl Rule {
    /// Returns `None` for an empty action set; an empty rule grants nothing.
    pub fn new(subject: SubjectName, actions: ActionSet) -> Option<Self> {
        if actions.is_empty() {
            None
        } else {
            Some(Self { subject, actions })
        }
    }

    pub fn subject(&self) -> &SubjectName {
        &self.subject
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entry = MatrixEntry::deserialize(deserializer)?;
        let subject = entry.subject.clone();
        entry.into_rule().ok_or_else(|| {
            serde::de::Error::custom(format!("rule for {subject} has no actions"))
        })
    }
}

/// One row of an editable permission matrix. The action set may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub subject: SubjectName,
    #[serde(default)]
    pub actions: ActionSet,
}

impl MatrixEntry {
    pub fn new(subject: SubjectName, actions: ActionSet) -> Self {
        Self { subject, actions }
    }

    pub fn empty(subject: SubjectName) -> Self {
        Self::new(subject, ActionSet::new())
    }

    /// Drop actions a matrix cell cannot show, such as `manage`.
    pub fn crud_only(mut self) -> Self {
        if self.actions.iter().any(|a| !a.is_crud()) {
            tracing::warn!(subject = %self.subject, "dropping non-CRUD actions from matrix row");
            self.actions = self.actions.iter().filter(|a| a.is_crud()).collect();
        }
        self
    }

    pub fn to_rule(&self) -> Option<Rule> {
        Rule::new(self.subject.clone(), self.actions.clone())
    }

    pub fn into_rule(self) -> Option<Rule> {
        Rule::new(self.subject, self.actions)
    }
}

/// A saved rule exactly as the API sent it.
///
/// Saved-rule lists come from an independently versioned server, so nothing
/// here is trusted until [`RawRule::parse`] accepts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Value>,
}

impl RawRule {
    pub fn new(subject: &str, actions: &[&str]) -> Self {
        Self {
            subject: Some(Value::from(subject)),
            actions: Some(Value::from(actions.to_vec())),
        }
    }

    /// Validate the entry.
    ///
    /// Returns `None` when the subject is missing, blank or not a string, or
    /// when `actions` is not an array. Unrecognised action strings are dropped
    /// one by one; the rest of the entry survives.
    pub fn parse(&self) -> Option<MatrixEntry> {
        let subject = self
            .subject
            .as_ref()
            .and_then(Value::as_str)
            .and_then(SubjectName::new);
        let Some(subject) = subject else {
            tracing::warn!(entry = ?self, "skipping saved rule without a subject");
            return None;
        };
        let Some(values) = self.actions.as_ref().and_then(Value::as_array) else {
            tracing::warn!(%subject, "skipping saved rule without an actions array");
            return None;
        };

        let mut actions = ActionSet::new();
        for value in values {
            match value.as_str().map(str::parse::<Action>) {
                Some(Ok(action)) => {
                    actions.insert(action);
                }
                _ => tracing::warn!(%subject, action = %value, "dropping unknown action"),
            }
        }
        Some(MatrixEntry::new(subject, actions))
    }
}

impl From<&Rule> for RawRule {
    fn from(rule: &Rule) -> Self {
        Self {
            subject: Some(Value::from(rule.subject.as_str())),
            actions: Some(Value::from(
                rule.actions.iter().map(Action::as_str).collect::<Vec<_>>(),
            )),
        }
    }
}

/// Identifier of a server-owned record; the API uses both numbers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Entry of the server's permission catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSubject {
    pub id: RecordId,
    pub name: SubjectName,
}
