use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::dialog::MatrixRow;
use crate::matrix::PermissionMatrix;
use crate::module::Module;
use crate::permission::{Grant, level};
use crate::response;
use crate::role::RoleDraft;
use crate::router::Router;
use crate::rule::{CatalogSubject, MatrixEntry, RawRule, Rule};
use crate::seed;
use crate::Result;

/// Permission matrix editing for the responsibility screens.
///
/// The gateway keeps no matrix between requests: every call carries the
/// current entries and gets back the new ones.
pub struct MatrixModule;

#[derive(Deserialize)]
struct SeedRequest {
    catalog: Vec<CatalogSubject>,
    #[serde(default)]
    saved: Vec<RawRule>,
}

#[derive(Deserialize)]
struct ToggleRequest {
    entries: Vec<MatrixEntry>,
    action: Action,
    subject: String,
}

#[derive(Serialize)]
struct MatrixView {
    entries: Vec<MatrixEntry>,
    rows: Vec<MatrixRow>,
    permissions: Vec<Rule>,
}

impl MatrixView {
    fn new(entries: Vec<MatrixEntry>, permissions: Vec<Rule>) -> Self {
        Self {
            rows: entries.iter().map(MatrixRow::from).collect(),
            entries,
            permissions,
        }
    }
}

fn seed_matrix(_grant: &Grant<level::Read>, request: SeedRequest) -> MatrixView {
    let matrix = PermissionMatrix::new(seed::seed(&request.catalog, &request.saved));
    let permissions = matrix.export();
    MatrixView::new(matrix.into_entries(), permissions)
}

fn toggle_matrix(_grant: &Grant<level::Update>, request: ToggleRequest) -> Result<MatrixView> {
    let mut matrix = PermissionMatrix::new(request.entries);
    let permissions = matrix.toggle(request.action, &request.subject)?;
    Ok(MatrixView::new(matrix.into_entries(), permissions))
}

impl Module for MatrixModule {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn routes(&self, router: &mut Router) {
        router.post("/api/permissions/seed", |ctx| async move {
            let grant = ctx.ability()?.require::<level::Read>("Responsibility")?;
            let request: SeedRequest = ctx.json()?;
            response::ok(&seed_matrix(&grant, request))
        });

        router.post("/api/permissions/toggle", |ctx| async move {
            let grant = ctx.ability()?.require::<level::Update>("Responsibility")?;
            let request: ToggleRequest = ctx.json()?;
            response::ok(&toggle_matrix(&grant, request)?)
        });

        router.post("/api/roles/draft", |ctx| async move {
            ctx.ability()?.require::<level::Create>("Role")?;
            let draft: RoleDraft = ctx.json()?;
            let draft = RoleDraft::new(&draft.name, &draft.name_native);
            draft.validate()?;
            response::ok(&draft)
        });
    }
}
