//! Editable permission matrix.
//!
//! A [`PermissionMatrix`] holds one row per subject and flips single
//! `(action, subject)` cells. After every toggle it exports the sparse rule
//! list (rows with at least one action) and hands the complete list to its
//! listener. Listeners never receive deltas.
//!
//! A matrix belongs to the dialog that created it. It is not `Clone`;
//! build a fresh one from [`crate::seed::seed`] for every open.
//!
//! # Example
//!
//! ```
//! use koliwada::{Action, PermissionMatrix, seed};
//!
//! let rows = seed::seed_names(&["User", "Invitation"], &[]);
//! let mut matrix = PermissionMatrix::new(rows);
//! let exported = matrix.toggle(Action::Read, "user").unwrap();
//! assert_eq!(exported.len(), 1);
//! assert_eq!(exported[0].subject().as_str(), "User");
//! ```

use std::fmt;

use crate::action::{Action, ActionSet};
use crate::error::{Error, Result};
use crate::rule::{MatrixEntry, Rule};
use crate::subject::SubjectName;

/// Callback receiving the full exported rule list after each toggle.
pub type Listener = Box<dyn FnMut(&[Rule]) + Send>;

pub struct PermissionMatrix {
    entries: Vec<MatrixEntry>,
    listener: Option<Listener>,
}

impl PermissionMatrix {
    /// Rows keep only their CRUD actions.
    pub fn new(entries: Vec<MatrixEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(MatrixEntry::crud_only).collect(),
            listener: None,
        }
    }

    pub fn with_listener<F>(entries: Vec<MatrixEntry>, listener: F) -> Self
    where
        F: FnMut(&[Rule]) + Send + 'static,
    {
        let mut matrix = Self::new(entries);
        matrix.on_change(listener);
        matrix
    }

    /// Replace the listener.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&[Rule]) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Flip `action` for `subject` and emit the resulting export.
    ///
    /// The subject is matched case-insensitively against existing rows; an
    /// unknown subject is appended with the single action. Only CRUD actions
    /// can be toggled.
    pub fn toggle(&mut self, action: Action, subject: &str) -> Result<Vec<Rule>> {
        if !action.is_crud() {
            return Err(Error::InvalidToggle {
                action: action.to_string(),
                subject: subject.to_string(),
                reason: "only read, create, update and delete can be toggled",
            });
        }
        let Some(name) = SubjectName::new(subject) else {
            return Err(Error::InvalidToggle {
                action: action.to_string(),
                subject: subject.to_string(),
                reason: "subject must not be blank",
            });
        };

        match self.entries.iter_mut().find(|e| e.subject.matches(subject)) {
            Some(entry) => {
                let granted = entry.actions.toggle(action);
                tracing::debug!(%action, subject = %entry.subject, granted, "toggled permission");
            }
            None => {
                tracing::debug!(%action, subject = %name, "added permission row");
                self.entries
                    .push(MatrixEntry::new(name, ActionSet::from([action])));
            }
        }

        let exported = self.export();
        if let Some(listener) = self.listener.as_mut() {
            listener(&exported);
        }
        Ok(exported)
    }

    /// Rows with at least one granted action, in row order.
    pub fn export(&self) -> Vec<Rule> {
        self.entries.iter().filter_map(MatrixEntry::to_rule).collect()
    }

    /// All rows, including those with nothing granted.
    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<MatrixEntry> {
        self.entries
    }

    pub fn is_granted(&self, action: Action, subject: &str) -> bool {
        self.entries
            .iter()
            .find(|e| e.subject.matches(subject))
            .is_some_and(|e| e.actions.contains(action))
    }
}

impl fmt::Debug for PermissionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionMatrix")
            .field("entries", &self.entries)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
