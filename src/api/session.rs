use serde::{Deserialize, Serialize};

use crate::ability::{Ability, ExportedRule};
use crate::auth;
use crate::error::Error;
use crate::module::Module;
use crate::response;
use crate::router::Router;
use crate::session;

/// Sign-in, session restore and sign-out.
pub struct SessionModule;

/// Sign-in request: the access token the portal API issued.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignIn {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    role: String,
    unrestricted: bool,
    rules: Vec<ExportedRule>,
    home_route: String,
}

impl SessionView {
    fn new(ability: &Ability, home_route: &str) -> Self {
        Self {
            access_token: None,
            role: ability.role().to_string(),
            unrestricted: ability.is_unrestricted(),
            rules: ability.export(),
            home_route: home_route.to_string(),
        }
    }
}

impl Module for SessionModule {
    fn name(&self) -> &'static str {
        "session"
    }

    fn routes(&self, router: &mut Router) {
        router.post("/api/session", |ctx| async move {
            let request: SignIn = ctx.json()?;
            let portal = auth::verify_portal_token(&ctx.config.auth, &request.access_token)?;
            let key = portal.sub.trim();
            if key.is_empty() {
                return Err(Error::Unauthorized);
            }
            if let Some(email) = portal.profile.email()
                && !email.eq_ignore_ascii_case(key)
            {
                tracing::warn!(sub = key, email, "portal token subject does not match its profile");
                return Err(Error::Unauthorized);
            }

            let ability = session::login(ctx.store.as_ref(), key, &portal.profile, &ctx.config.acl)
                .map_err(|e| match e {
                    Error::Configuration(reason) => Error::Validation(reason),
                    other => other,
                })?;
            let token = auth::create_token(&ctx.config.auth, key, ability.role())?;

            let view = SessionView {
                access_token: Some(token),
                ..SessionView::new(&ability, &ctx.config.acl.home_route)
            };
            response::created(&view)
        });

        router.get("/api/session", |ctx| async move {
            let ability = ctx.ability()?;
            response::ok(&SessionView::new(&ability, &ctx.config.acl.home_route))
        });

        router.delete("/api/session", |ctx| async move {
            let claims = ctx.require_claims()?;
            session::logout(ctx.store.as_ref(), &claims.sub)?;
            Ok(response::no_content())
        });
    }
}
