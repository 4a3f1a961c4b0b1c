//! Module trait for grouping gateway routes.
//!
//! # Example
//!
//! ```ignore
//! use koliwada::{Module, Router};
//!
//! pub struct HealthModule;
//!
//! impl Module for HealthModule {
//!     fn name(&self) -> &'static str {
//!         "health"
//!     }
//!
//!     fn routes(&self, router: &mut Router) {
//!         router.get("/health", |_ctx| async move {
//!             koliwada::response::ok(&serde_json::json!({ "status": "ok" }))
//!         });
//!     }
//! }
//! ```

use crate::router::Router;

/// A group of gateway routes.
pub trait Module: Send + Sync {
    /// Module name for identification and logging.
    fn name(&self) -> &'static str;

    /// Register routes with the router.
    fn routes(&self, router: &mut Router);
}

/// Register every module's routes, logging each one.
pub fn register(router: &mut Router, modules: &[&dyn Module]) {
    for module in modules {
        tracing::debug!(module = module.name(), "registering routes");
        module.routes(router);
    }
}
