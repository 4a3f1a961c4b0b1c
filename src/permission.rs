//! Typed action levels for gated operations.
//!
//! A [`Grant<L>`] can only be obtained from [`Ability::require`], so a
//! function taking `Grant<level::Update>` cannot be reached without the
//! matching ability check having passed.
//!
//! # Example
//!
//! ```
//! use koliwada::{Ability, config::Acl, level};
//!
//! let ability = Ability::build("super_admin", &[], &Acl::default());
//! let grant = ability.require::<level::Update>("Responsibility").unwrap();
//! assert_eq!(grant.subject(), "Responsibility");
//! ```
//!
//! [`Ability::require`]: crate::Ability::require

use std::fmt;
use std::marker::PhantomData;

use crate::action::Action;

/// Marker trait for the toggleable actions.
pub trait Level: Clone + Copy + PartialEq + Eq + fmt::Debug {
    const ACTION: Action;
}

/// Standard levels, one per CRUD action.
pub mod level {
    use super::Level;
    use crate::action::Action;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Read;

    impl Level for Read {
        const ACTION: Action = Action::Read;
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Create;

    impl Level for Create {
        const ACTION: Action = Action::Create;
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Update;

    impl Level for Update {
        const ACTION: Action = Action::Update;
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Delete;

    impl Level for Delete {
        const ACTION: Action = Action::Delete;
    }
}

/// Proof that an ability check for `L` on `subject` passed.
#[derive(Clone, PartialEq, Eq)]
pub struct Grant<L: Level> {
    subject: String,
    _level: PhantomData<L>,
}

impl<L: Level> Grant<L> {
    pub(crate) fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            _level: PhantomData,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn action(&self) -> Action {
        L::ACTION
    }
}

impl<L: Level> fmt::Debug for Grant<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grant({}:{})", L::ACTION, self.subject)
    }
}
