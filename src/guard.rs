//! Route guard: decides what a page request renders.

use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::action::Action;
use crate::config::Acl;
use crate::subject::ALL;

/// Pages that render for everyone.
const ERROR_PAGES: [&str; 2] = ["/404", "/500"];

/// The ability a page requires. Pages that declare nothing require `manage:all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAcl {
    pub action: Action,
    pub subject: String,
}

impl Default for RouteAcl {
    fn default() -> Self {
        Self {
            action: Action::Manage,
            subject: ALL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardRoute {
    pub path: String,
    #[serde(default)]
    pub acl: RouteAcl,
    /// Page meant for signed-out visitors (login and the like).
    #[serde(default)]
    pub guest_guard: bool,
    #[serde(default = "default_auth_guard")]
    pub auth_guard: bool,
}

fn default_auth_guard() -> bool {
    true
}

impl GuardRoute {
    pub fn new(path: impl Into<String>, acl: RouteAcl) -> Self {
        Self {
            path: path.into(),
            acl,
            guest_guard: false,
            auth_guard: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "location", rename_all = "snake_case")]
pub enum Verdict {
    Render,
    Redirect(String),
    NotAuthorized,
}

/// Decide how `route` is handled for the current session.
///
/// `ability` is `None` while nobody is signed in.
pub fn check(route: &GuardRoute, ability: Option<&Ability>, policy: &Acl) -> Verdict {
    if ability.is_some() && !route.guest_guard && route.path == "/" {
        return Verdict::Redirect(policy.home_route.clone());
    }

    if route.guest_guard || ERROR_PAGES.contains(&route.path.as_str()) || !route.auth_guard {
        return Verdict::Render;
    }

    match ability {
        Some(ability) if ability.can(route.acl.action, route.acl.subject.as_str()) => {
            Verdict::Render
        }
        _ => {
            tracing::debug!(path = %route.path, "route not authorized");
            Verdict::NotAuthorized
        }
    }
}
