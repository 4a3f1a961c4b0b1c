//! Session ability: answers `can(action, subject)` for UI gating.
//!
//! An [`Ability`] is built once per signed-in session from the admin's role
//! slug and resolved rules, and never changes afterwards. A role or permission
//! change means building a new one.
//!
//! The super-admin slug yields an unrestricted ability holding only
//! `manage:all`. Every other role is restricted: it always gets `read` on the
//! policy's baseline subjects, plus whatever its rules grant.
//!
//! Subjects are matched case-insensitively, the same as in the permission
//! matrix. A rule on `all` applies to every subject and a rule granting
//! `manage` permits every action.

use std::collections::HashMap;

use serde::Serialize;

use crate::action::{Action, ActionSet};
use crate::config::Acl;
use crate::error::{Error, Result};
use crate::permission::{Grant, Level};
use crate::profile::AdminProfile;
use crate::rule::{MatrixEntry, RawRule, Rule};
use crate::subject::{Subject, SubjectName};

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Unrestricted,
    Restricted {
        /// Keyed by lower-cased subject.
        grants: HashMap<String, ActionSet>,
        /// Actions granted on `all`.
        everywhere: ActionSet,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    role: String,
    mode: Mode,
    rules: Vec<Rule>,
}

/// Flattened rule as handed to a front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedRule {
    pub subject: String,
    pub actions: Vec<Action>,
}

impl Ability {
    /// Build an ability for `role` from already validated rules.
    pub fn build(role: &str, rules: &[Rule], policy: &Acl) -> Self {
        if role == policy.super_admin_slug {
            tracing::debug!(role, "building unrestricted ability");
            let manage_all = Rule::new(SubjectName::all(), ActionSet::from([Action::Manage]));
            return Self {
                role: role.to_string(),
                mode: Mode::Unrestricted,
                rules: manage_all.into_iter().collect(),
            };
        }

        let baseline = policy
            .baseline_subjects
            .iter()
            .filter_map(|s| SubjectName::new(s.as_str()))
            .filter_map(|s| Rule::new(s, ActionSet::from([Action::Read])));

        let mut merged: Vec<Rule> = Vec::new();
        for rule in baseline.chain(rules.iter().cloned()) {
            match merged.iter_mut().find(|r| r.subject() == rule.subject()) {
                Some(existing) => {
                    let mut actions = existing.actions().clone();
                    actions.extend(rule.actions());
                    if let Some(union) = Rule::new(existing.subject().clone(), actions) {
                        *existing = union;
                    }
                }
                None => merged.push(rule),
            }
        }

        let mut grants = HashMap::new();
        let mut everywhere = ActionSet::new();
        for rule in &merged {
            if rule.subject().is_all() {
                everywhere.extend(rule.actions());
            } else {
                grants.insert(rule.subject().key(), rule.actions().clone());
            }
        }

        tracing::debug!(role, rules = merged.len(), "building restricted ability");
        Self {
            role: role.to_string(),
            mode: Mode::Restricted { grants, everywhere },
            rules: merged,
        }
    }

    /// Build an ability from raw saved rules, skipping malformed entries.
    pub fn from_raw(role: &str, rules: &[RawRule], policy: &Acl) -> Self {
        let rules: Vec<Rule> = rules
            .iter()
            .filter_map(RawRule::parse)
            .filter_map(MatrixEntry::into_rule)
            .collect();
        Self::build(role, &rules, policy)
    }

    /// Build the ability for a signed-in admin.
    ///
    /// A restricted admin whose profile carries no resolved permissions is
    /// rejected rather than treated as having none.
    pub fn from_profile(profile: &AdminProfile, policy: &Acl) -> Result<Self> {
        let slug = profile.slug();
        if slug.trim().is_empty() {
            return Err(Error::Configuration(
                "admin profile has an empty role slug".to_string(),
            ));
        }
        if slug == policy.super_admin_slug {
            return Ok(Self::build(slug, &[], policy));
        }
        let permissions = profile.permissions().ok_or_else(|| {
            Error::Configuration(format!("admin profile for role {slug} has no permissions"))
        })?;
        Ok(Self::from_raw(slug, permissions, policy))
    }

    /// Build the ability from a stored profile. An absent or unreadable
    /// profile is a configuration error, never an empty ability.
    pub fn from_stored(raw: Option<&str>, policy: &Acl) -> Result<Self> {
        let raw = raw.ok_or_else(|| Error::Configuration("no stored admin profile".to_string()))?;
        let profile = AdminProfile::parse(raw)?;
        Self::from_profile(&profile, policy)
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn is_unrestricted(&self) -> bool {
        self.mode == Mode::Unrestricted
    }

    /// Whether `action` is permitted on `subject`.
    pub fn can(&self, action: Action, subject: impl Into<Subject>) -> bool {
        self.can_subject(action, &subject.into())
    }

    pub fn can_subject(&self, action: Action, subject: &Subject) -> bool {
        match &self.mode {
            Mode::Unrestricted => true,
            Mode::Restricted { grants, everywhere } => {
                if everywhere.permits(action) {
                    return true;
                }
                let kind = subject.kind();
                if kind.eq_ignore_ascii_case(crate::subject::ALL) {
                    // Asking about `all` needs a grant on `all`.
                    return false;
                }
                grants
                    .get(&kind.to_lowercase())
                    .is_some_and(|actions| actions.permits(action))
            }
        }
    }

    pub fn cannot(&self, action: Action, subject: impl Into<Subject>) -> bool {
        !self.can(action, subject)
    }

    /// Check `L` on `subject`, returning a proof token or `Forbidden`.
    pub fn require<L: Level>(&self, subject: &str) -> Result<Grant<L>> {
        if self.can(L::ACTION, subject) {
            Ok(Grant::new(subject))
        } else {
            tracing::debug!(role = %self.role, action = %L::ACTION, subject, "ability check failed");
            Err(Error::Forbidden {
                action: L::ACTION.to_string(),
                subject: subject.to_string(),
            })
        }
    }

    /// Registered rules, baseline included, in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn export(&self) -> Vec<ExportedRule> {
        self.rules
            .iter()
            .map(|rule| ExportedRule {
                subject: rule.subject().to_string(),
                actions: rule.actions().iter().collect(),
            })
            .collect()
    }
}
