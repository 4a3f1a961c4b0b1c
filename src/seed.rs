//! Matrix seeding from the permission catalog and previously saved rules.

use crate::rule::{CatalogSubject, MatrixEntry, RawRule};
use crate::subject::SubjectName;

/// Build one matrix row per catalog subject, in catalog order.
///
/// Rows whose subject has a saved rule start with a copy of that rule's CRUD
/// actions; all other rows start empty. Saved rules for subjects missing from
/// the catalog are ignored, as are malformed entries. When the saved list
/// names a subject twice the first entry wins.
pub fn seed(catalog: &[CatalogSubject], saved: &[RawRule]) -> Vec<MatrixEntry> {
    seed_from(catalog.iter().map(|c| &c.name), saved)
}

/// [`seed`] over a plain list of subject names. Blank names are skipped.
pub fn seed_names(names: &[&str], saved: &[RawRule]) -> Vec<MatrixEntry> {
    let names: Vec<SubjectName> = names.iter().filter_map(|n| SubjectName::new(*n)).collect();
    seed_from(names.iter(), saved)
}

fn seed_from<'a>(
    catalog: impl Iterator<Item = &'a SubjectName>,
    saved: &[RawRule],
) -> Vec<MatrixEntry> {
    let saved: Vec<MatrixEntry> = saved.iter().filter_map(RawRule::parse).collect();

    let rows: Vec<MatrixEntry> = catalog
        .map(|subject| {
            let actions = saved
                .iter()
                .find(|rule| rule.subject.matches(subject.as_str()))
                .map(|rule| rule.actions.clone())
                .unwrap_or_default();
            MatrixEntry::new(subject.clone(), actions).crud_only()
        })
        .collect();

    let orphans = saved
        .iter()
        .filter(|rule| !rows.iter().any(|row| row.subject == rule.subject))
        .count();
    if orphans > 0 {
        tracing::debug!(orphans, "ignoring saved rules for subjects outside the catalog");
    }

    rows
}
