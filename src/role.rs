//! Roles, responsibilities and the role form's name handling.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rule::{RawRule, RecordId, Rule};

/// A role as the portal API stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub name_native: String,
    pub slug: String,
    #[serde(default)]
    pub rank: u32,
}

/// A role bound to its saved rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Responsibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<RawRule>,
}

/// Body of a responsibility create/update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsibilityRequest {
    pub role: RecordId,
    pub permissions: Vec<Rule>,
}

/// Role slug: each space-separated word lower-cased, joined with `_`.
///
/// Runs of spaces are kept as runs of underscores, as the portal has always
/// generated them.
pub fn role_slug(name: &str) -> String {
    name.split(' ')
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Slug used for locations and gallery entries: trimmed, lower-cased, `-` joined.
pub fn location_slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(' ')
        .collect::<Vec<_>>()
        .join("-")
}

/// Upper-case the first letter of each space-separated word.
pub fn capitalize_words(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Contents of the role form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_native: String,
    #[serde(default)]
    pub slug: String,
}

impl RoleDraft {
    pub fn new(name: &str, name_native: &str) -> Self {
        let mut draft = Self {
            name_native: name_native.to_string(),
            ..Self::default()
        };
        draft.set_name(name);
        draft
    }

    /// Set the English name, capitalising it and regenerating the slug.
    /// An empty name leaves the draft unchanged.
    pub fn set_name(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.slug = role_slug(name);
        self.name = capitalize_words(name);
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        {
            return Err(Error::Validation(
                "Please enter role name in english".to_string(),
            ));
        }
        if self.name_native.trim().is_empty() {
            return Err(Error::Validation("nameNative is required".to_string()));
        }
        if !self
            .name_native
            .chars()
            .all(|c| is_devanagari(c) || c.is_whitespace())
        {
            return Err(Error::Validation(
                "Please enter role name in marathi".to_string(),
            ));
        }
        if self.slug.is_empty() {
            return Err(Error::Validation("slug is required".to_string()));
        }
        Ok(())
    }
}
