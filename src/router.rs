//! HTTP routing with matchit.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use hyper::Method;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::ability::Ability;
use crate::auth::{self, Claims};
use crate::config::SharedConfig;
use crate::error::Error;
use crate::response::HttpResponse;
use crate::session;
use crate::store::ProfileStore;

/// Boxed future for async handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handler context passed to route handlers.
pub struct Context {
    pub method: Method,
    pub uri: hyper::Uri,
    pub headers: hyper::http::HeaderMap,
    /// Route parameters (e.g., {id} from path).
    pub params: HashMap<String, String>,
    /// The request body, pre-read as bytes.
    pub body: Bytes,
    pub config: SharedConfig,
    /// Stored admin profiles.
    pub store: Arc<dyn ProfileStore>,
}

impl Context {
    /// Parse the request body as JSON.
    ///
    /// A body sent with a content type other than `application/json` is
    /// rejected with 415.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if let Some(content_type) = self.header("content-type")
            && !content_type
                .split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        {
            return Err(Error::UnsupportedMediaType {
                expected: "application/json".to_string(),
            });
        }
        if self.body.is_empty() {
            serde_json::from_value(serde_json::Value::Null)
                .map_err(|e| Error::BadRequest(format!("Invalid request body: {e}")))
        } else {
            serde_json::from_slice(&self.body)
                .map_err(|e| Error::BadRequest(format!("Invalid request body: {e}")))
        }
    }

    /// Get a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Session claims, if a valid token is present.
    pub fn claims(&self) -> Option<Claims> {
        auth::extract_claims(&self.headers, &self.config.auth).ok()
    }

    /// Require a valid session token.
    pub fn require_claims(&self) -> Result<Claims> {
        auth::extract_claims(&self.headers, &self.config.auth)
    }

    /// The ability of the signed-in admin.
    ///
    /// A token whose stored profile is gone, unreadable or now belongs to a
    /// different role no longer identifies a usable session.
    pub fn ability(&self) -> Result<Ability> {
        let claims = self.require_claims()?;
        let ability = session::restore(self.store.as_ref(), &claims.sub, &self.config.acl)
            .map_err(|e| match e {
                Error::Configuration(reason) => {
                    tracing::warn!(%reason, "rejecting session without a usable profile");
                    Error::Unauthorized
                }
                other => other,
            })?;
        if ability.role() != claims.role {
            tracing::warn!(
                token_role = %claims.role,
                stored_role = ability.role(),
                "session role changed since sign-in"
            );
            return Err(Error::Unauthorized);
        }
        Ok(ability)
    }
}

/// Handler function type.
pub type Handler = Box<dyn Fn(Context) -> BoxFuture<'static, Result<HttpResponse>> + Send + Sync>;

struct RouteEntry {
    handlers: HashMap<Method, Handler>,
}

/// HTTP router for registering and dispatching requests.
pub struct Router {
    routes: matchit::Router<usize>,
    entries: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: matchit::Router::new(),
            entries: Vec::new(),
        }
    }

    /// Register a handler for a method and path.
    ///
    /// # Example
    /// ```ignore
    /// router.route(Method::GET, "/api/ability", |ctx| async move {
    ///     response::ok(&ctx.ability()?.export())
    /// });
    /// ```
    pub fn route<F, Fut>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        let entry_idx = match self.routes.at(path) {
            Ok(matched) => *matched.value,
            Err(_) => {
                let idx = self.entries.len();
                self.entries.push(RouteEntry {
                    handlers: HashMap::new(),
                });
                if let Err(e) = self.routes.insert(path, idx) {
                    tracing::error!(path, "route not registered: {e}");
                }
                idx
            }
        };

        let boxed: Handler = Box::new(move |ctx| Box::pin(handler(ctx)));
        if self.entries[entry_idx]
            .handlers
            .insert(method.clone(), boxed)
            .is_some()
        {
            tracing::warn!(%method, path, "replacing existing handler");
        }
    }

    pub fn get<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.route(Method::GET, path, handler);
    }

    pub fn post<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.route(Method::POST, path, handler);
    }

    pub fn delete<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.route(Method::DELETE, path, handler);
    }

    /// Convert to a thread-safe handle for use in request handling.
    pub fn into_handle(self) -> Arc<RouterHandle> {
        Arc::new(RouterHandle {
            routes: self.routes,
            entries: self.entries,
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe router handle for use in request handling.
pub struct RouterHandle {
    routes: matchit::Router<usize>,
    entries: Vec<RouteEntry>,
}

/// Result of matching a request to a route.
pub enum RouteMatch<'a> {
    Matched {
        handler: &'a Handler,
        params: HashMap<String, String>,
    },
    /// Path matched but method not allowed.
    MethodNotAllowed,
    NotFound,
}

impl RouterHandle {
    /// Match a request to a route.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        match self.routes.at(path) {
            Ok(matched) => {
                let entry = &self.entries[*matched.value];
                let params: HashMap<String, String> = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();

                match entry.handlers.get(method) {
                    Some(handler) => RouteMatch::Matched { handler, params },
                    None => RouteMatch::MethodNotAllowed,
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }
}
