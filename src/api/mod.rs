//! Gateway modules for the admin portal.

mod ability;
mod matrix;
mod session;

pub use ability::AbilityModule;
pub use matrix::MatrixModule;
pub use session::SessionModule;

use crate::module::Module;

/// Every module the gateway serves.
pub fn modules() -> [&'static dyn Module; 3] {
    [&SessionModule, &AbilityModule, &MatrixModule]
}
