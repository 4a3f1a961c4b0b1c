//! Portal navigation and its ability-based filtering.

use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::action::Action;
use crate::subject::ALL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    fn link(title: &str, action: Action, subject: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            action: Some(action),
            subject: Some(subject.to_string()),
            path: Some(path.to_string()),
            icon: None,
            children: Vec::new(),
        }
    }

    fn group(title: &str, action: Option<Action>, subject: Option<&str>, children: Vec<NavItem>) -> Self {
        Self {
            title: title.to_string(),
            action,
            subject: subject.map(str::to_string),
            path: None,
            icon: None,
            children,
        }
    }

    fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    fn has_acl(&self) -> bool {
        self.action.is_some() && self.subject.is_some()
    }

    /// Leaf check; items without an acl fall back to `manage:all`.
    fn permitted(&self, ability: &Ability) -> bool {
        let action = self.action.unwrap_or(Action::Manage);
        let subject = self.subject.as_deref().unwrap_or(ALL);
        ability.can(action, subject)
    }
}

/// The portal's vertical menu.
pub fn portal() -> Vec<NavItem> {
    use Action::{Create, Read};

    vec![
        NavItem::link("Home", Read, "home", "/home").icon("tabler:smart-home"),
        NavItem::link("Invitations", Read, "Invitation", "/invitation").icon("mingcute:invite-fill"),
        NavItem::link("User Management", Read, "User", "/user").icon("tabler:user-share"),
        NavItem::group(
            "Gallery",
            Some(Read),
            Some("Gallery"),
            vec![
                NavItem::link("Add", Create, "Gallery", "/gallery/add"),
                NavItem::link("List", Read, "Gallery", "/gallery/list"),
            ],
        )
        .icon("tabler:brand-appgallery"),
        NavItem::group(
            "Settings",
            None,
            None,
            vec![
                NavItem::group(
                    "Roles & Responsibility",
                    Some(Read),
                    Some("roles-responsibility"),
                    vec![
                        NavItem::link("Permissions", Read, "Permission", "/settings/permissions"),
                        NavItem::link("Roles", Read, "Role", "/settings/roles"),
                        NavItem::link("Responsibility", Read, "Responsibility", "/settings/responsibility"),
                    ],
                )
                .icon("tabler:user-star"),
                NavItem::group(
                    "Locations",
                    Some(Read),
                    Some("location"),
                    vec![
                        NavItem::link("State", Read, "Location", "/settings/locations/state"),
                        NavItem::link("District", Read, "Location", "/settings/locations/district"),
                        NavItem::link("Tehsil", Read, "Location", "/settings/locations/tehsil"),
                        NavItem::link("Village", Read, "Location", "/settings/locations/village"),
                    ],
                )
                .icon("tabler:location"),
                NavItem::link("Event", Read, "Event", "/settings/event").icon("tabler:calendar-event"),
            ],
        )
        .icon("tabler:settings"),
    ]
}

/// The items `ability` may see.
///
/// A group survives when at least one child survives and, if the group has
/// its own acl, that check passes too.
pub fn visible(items: &[NavItem], ability: &Ability) -> Vec<NavItem> {
    items
        .iter()
        .filter_map(|item| {
            if !item.is_group() {
                return item.permitted(ability).then(|| item.clone());
            }
            let children = visible(&item.children, ability);
            if children.is_empty() || (item.has_acl() && !item.permitted(ability)) {
                return None;
            }
            Some(NavItem {
                children,
                ..item.clone()
            })
        })
        .collect()
}
