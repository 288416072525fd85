//! Navigation menu models.

use serde::Serialize;

/// A sidebar entry: a plain link or a group of actions.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MenuItem {
    Link(MenuLink),
    Group(MenuGroup),
}

impl MenuItem {
    #[cfg(test)]
    pub fn label(&self) -> &str {
        match self {
            MenuItem::Link(link) => &link.label,
            MenuItem::Group(group) => &group.label,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuLink {
    pub path: String,
    pub icon: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuGroup {
    pub label: String,
    pub icon: String,
    pub children: Vec<MenuGroupEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuGroupEntry {
    pub label: String,
    pub action: MenuAction,
}

/// What a group entry does when chosen.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MenuAction {
    Navigate { path: String },
    Logout,
}
