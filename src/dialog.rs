//! Responsibility dialog state.
//!
//! Each open of the responsibility dialog owns a freshly seeded
//! [`PermissionMatrix`]. Closing consumes the dialog, so state from a create
//! flow can never leak into a following edit flow or vice versa.

use serde::Serialize;

use crate::action::Action;
use crate::error::{Error, Result};
use crate::matrix::PermissionMatrix;
use crate::role::{Responsibility, ResponsibilityRequest};
use crate::rule::{CatalogSubject, MatrixEntry, RawRule, RecordId, Rule};
use crate::seed;

/// One rendered checkbox row: read, create, update, delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub subject: String,
    pub cells: [bool; 4],
}

impl From<&MatrixEntry> for MatrixRow {
    fn from(entry: &MatrixEntry) -> Self {
        Self {
            subject: entry.subject.to_string(),
            cells: entry.actions.cells(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogMode {
    Create,
    Edit { id: Option<RecordId> },
}

#[derive(Debug)]
pub struct ResponsibilityDialog {
    mode: DialogMode,
    role: Option<RecordId>,
    matrix: PermissionMatrix,
}

impl ResponsibilityDialog {
    /// Open for a new responsibility: every catalog subject, nothing granted.
    pub fn open_create(catalog: &[CatalogSubject]) -> Self {
        Self {
            mode: DialogMode::Create,
            role: None,
            matrix: PermissionMatrix::new(seed::seed(catalog, &[])),
        }
    }

    /// Open on an existing responsibility, preloading its saved rules.
    pub fn open_edit(catalog: &[CatalogSubject], existing: &Responsibility) -> Self {
        Self {
            mode: DialogMode::Edit {
                id: existing.id.clone(),
            },
            role: existing.role.id.clone(),
            matrix: PermissionMatrix::new(seed::seed(catalog, &existing.permissions)),
        }
    }

    pub fn mode(&self) -> &DialogMode {
        &self.mode
    }

    pub fn select_role(&mut self, role: RecordId) {
        self.role = Some(role);
    }

    pub fn toggle(&mut self, action: Action, subject: &str) -> Result<Vec<Rule>> {
        self.matrix.toggle(action, subject)
    }

    /// Forward every export to `listener`.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&[Rule]) + Send + 'static,
    {
        self.matrix.on_change(listener);
    }

    pub fn rows(&self) -> Vec<MatrixRow> {
        self.matrix.entries().iter().map(MatrixRow::from).collect()
    }

    pub fn permissions(&self) -> Vec<Rule> {
        self.matrix.export()
    }

    /// Build the request body. Fails if no role has been selected.
    pub fn submit(&self) -> Result<ResponsibilityRequest> {
        let role = self
            .role
            .clone()
            .ok_or_else(|| Error::Validation("Please Select Role".to_string()))?;
        Ok(ResponsibilityRequest {
            role,
            permissions: self.matrix.export(),
        })
    }

    /// Discard the dialog and its matrix.
    pub fn close(self) {
        tracing::debug!(mode = ?self.mode, "closing responsibility dialog");
    }
}

/// Read-only rows for the permission preview, in saved order.
///
/// Malformed saved entries are skipped; the responsibility is never modified.
pub fn preview(responsibility: &Responsibility) -> Vec<MatrixRow> {
    responsibility
        .permissions
        .iter()
        .filter_map(RawRule::parse)
        .map(|entry| MatrixRow::from(&entry))
        .collect()
}
