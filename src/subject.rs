//! Subject identifiers.
//!
//! A [`SubjectName`] keeps the spelling the server sent and compares
//! case-insensitively. [`Subject`] is what an ability check is asked about:
//! either a bare name or a typed record whose kind names the subject.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wildcard subject matching every other subject.
pub const ALL: &str = "all";

/// A subject name, stored as received and compared case-insensitively.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectName(String);

impl TryFrom<String> for SubjectName {
    type Error = &'static str;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        SubjectName::new(name).ok_or("subject must not be blank")
    }
}

impl From<SubjectName> for String {
    fn from(name: SubjectName) -> Self {
        name.0
    }
}

impl SubjectName {
    /// Build a name from a non-blank string.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn all() -> Self {
        Self(ALL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup key: the name lower-cased.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn matches(&self, other: &str) -> bool {
        self.0 == other || self.0.to_lowercase() == other.to_lowercase()
    }

    pub fn is_all(&self) -> bool {
        self.matches(ALL)
    }
}

impl PartialEq for SubjectName {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl std::hash::Hash for SubjectName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What an ability check is asked about.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Named(String),
    /// A record whose `kind` is the subject, e.g. a gallery entry of kind `Gallery`.
    Typed {
        kind: String,
        payload: serde_json::Value,
    },
}

impl Subject {
    pub fn named(name: impl Into<String>) -> Self {
        Subject::Named(name.into())
    }

    pub fn typed(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Subject::Typed {
            kind: kind.into(),
            payload,
        }
    }

    /// The subject name rules are registered under.
    pub fn kind(&self) -> &str {
        match self {
            Subject::Named(name) => name,
            Subject::Typed { kind, .. } => kind,
        }
    }
}

impl From<&str> for Subject {
    fn from(name: &str) -> Self {
        Subject::Named(name.to_string())
    }
}

impl From<String> for Subject {
    fn from(name: String) -> Self {
        Subject::Named(name)
    }
}

impl From<&SubjectName> for Subject {
    fn from(name: &SubjectName) -> Self {
        Subject::Named(name.as_str().to_string())
    }
}
