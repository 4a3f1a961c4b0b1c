use serde::Deserialize;
use serde_json::{Value, json};

use crate::action::Action;
use crate::guard::{self, GuardRoute};
use crate::module::Module;
use crate::navigation;
use crate::response;
use crate::router::Router;
use crate::subject::Subject;

/// Ability queries for the signed-in admin.
pub struct AbilityModule;

/// A subject is either a plain name or a record tagged with its kind.
#[derive(Deserialize)]
#[serde(untagged)]
enum SubjectInput {
    Named(String),
    Typed {
        kind: String,
        #[serde(default)]
        payload: Value,
    },
}

impl From<SubjectInput> for Subject {
    fn from(input: SubjectInput) -> Self {
        match input {
            SubjectInput::Named(name) => Subject::named(name),
            SubjectInput::Typed { kind, payload } => Subject::typed(kind, payload),
        }
    }
}

#[derive(Deserialize)]
struct CheckRequest {
    action: Action,
    subject: SubjectInput,
}

impl Module for AbilityModule {
    fn name(&self) -> &'static str {
        "ability"
    }

    fn routes(&self, router: &mut Router) {
        router.get("/api/ability", |ctx| async move {
            let ability = ctx.ability()?;
            response::ok(&json!({
                "role": ability.role(),
                "unrestricted": ability.is_unrestricted(),
                "rules": ability.export(),
            }))
        });

        router.post("/api/ability/check", |ctx| async move {
            let ability = ctx.ability()?;
            let request: CheckRequest = ctx.json()?;
            let subject = Subject::from(request.subject);
            response::ok(&json!({
                "action": request.action,
                "subject": subject.kind(),
                "allowed": ability.can_subject(request.action, &subject),
            }))
        });

        router.get("/api/navigation", |ctx| async move {
            let ability = ctx.ability()?;
            response::ok(&navigation::visible(&navigation::portal(), &ability))
        });

        // Signed-out callers are allowed here; the verdict covers them.
        router.post("/api/guard", |ctx| async move {
            let route: GuardRoute = ctx.json()?;
            let ability = match ctx.claims() {
                Some(_) => Some(ctx.ability()?),
                None => None,
            };
            response::ok(&guard::check(&route, ability.as_ref(), &ctx.config.acl))
        });
    }
}
