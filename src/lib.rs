//! Koliwada - permission core and session gateway for the koliwada admin portal.
//!
//! The crate has two layers:
//!
//! - **Permission core**: the editable [`PermissionMatrix`] behind the
//!   responsibility screens, the [`seed`] step that reconciles a subject
//!   catalog with saved rules, and the session [`Ability`] used to gate pages,
//!   menus and actions.
//! - **Gateway**: a small hyper server that signs admins in, issues session
//!   tokens and answers ability, navigation, guard and matrix requests.
//!
//! # Example
//!
//! ```
//! use koliwada::{Ability, Action, RawRule, config::Acl};
//!
//! let saved = [RawRule::new("Invitation", &["read", "create"])];
//! let ability = Ability::from_raw("gram_sevak", &saved, &Acl::default());
//!
//! assert!(ability.can(Action::Create, "Invitation"));
//! assert!(ability.can(Action::Read, "home"));
//! assert!(ability.cannot(Action::Delete, "Invitation"));
//! ```

pub mod ability;
pub mod action;
pub mod api;
pub mod auth;
pub mod config;
pub mod dialog;
pub mod error;
pub mod guard;
pub mod matrix;
pub mod module;
pub mod navigation;
pub mod permission;
pub mod profile;
pub mod response;
pub mod role;
pub mod router;
pub mod rule;
pub mod seed;
pub mod server;
pub mod session;
pub mod store;
pub mod subject;

// Re-export main types at crate root
pub use ability::Ability;
pub use action::{Action, ActionSet};
pub use config::{Config, ConfigLoader};
pub use error::{Error, Result};
pub use matrix::PermissionMatrix;
pub use module::Module;
pub use permission::{Grant, Level, level};
pub use router::{Context, Router};
pub use rule::{CatalogSubject, MatrixEntry, RawRule, RecordId, Rule};
pub use subject::{Subject, SubjectName};

// Re-export commonly used dependencies for convenience
pub use hyper::Method;
pub use serde_json::json;
