//! The signed-in admin's profile as delivered by the portal API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::rule::RawRule;

/// Admin profile returned at sign-in and by the `me` endpoint.
///
/// Only the fields the ability model reads are typed; everything else the API
/// sends is kept in `extra` so a stored profile round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub responsibility: ResponsibilityRef,
    /// The admin's resolved permission rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<GrantedRole>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsibilityRef {
    pub role: RoleRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRef {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantedRole {
    pub permissions: Vec<RawRule>,
}

impl AdminProfile {
    pub fn new(slug: impl Into<String>, permissions: Vec<RawRule>) -> Self {
        Self {
            responsibility: ResponsibilityRef {
                role: RoleRef {
                    slug: slug.into(),
                    name: None,
                },
            },
            role: Some(GrantedRole { permissions }),
            extra: serde_json::Map::new(),
        }
    }

    /// Parse a stored profile. Any failure is a configuration error: the
    /// session cannot be gated without a readable profile.
    pub fn parse(raw: &str) -> Result<Self> {
        let profile: AdminProfile = serde_json::from_str(raw)
            .map_err(|e| Error::Configuration(format!("stored admin profile is unreadable: {e}")))?;
        if profile.slug().trim().is_empty() {
            return Err(Error::Configuration(
                "stored admin profile has an empty role slug".to_string(),
            ));
        }
        Ok(profile)
    }

    pub fn slug(&self) -> &str {
        &self.responsibility.role.slug
    }

    pub fn email(&self) -> Option<&str> {
        self.extra.get("email").and_then(Value::as_str)
    }

    /// The admin's own saved rules, if the API resolved them.
    pub fn permissions(&self) -> Option<&[RawRule]> {
        self.role.as_ref().map(|r| r.permissions.as_slice())
    }
}
