//! Role menu resolver and sidebar state.
//!
//! Each role maps to a static table of entries. Parent entries that point at
//! a child carry a `{child}` placeholder filled from the session.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{MenuAction, MenuGroup, MenuGroupEntry, MenuItem, MenuLink, Role};

const CHILD_PLACEHOLDER: &str = "{child}";

/// (path, icon, label)
type Entry = (&'static str, &'static str, &'static str);

const ADMIN_MENU: &[Entry] = &[
    ("/admin/dashboard", "dashboard", "Dashboard"),
    ("/admin/students", "users", "Students"),
    ("/admin/teachers", "chalkboard", "Teachers"),
    ("/admin/parents", "user-friends", "Parents"),
    ("/admin/drivers", "bus", "Drivers"),
    ("/admin/classes", "school", "Classes"),
    ("/admin/health-records", "heartbeat", "Health Records"),
    ("/admin/events", "calendar", "Events"),
    ("/admin/announcements", "bullhorn", "Announcements"),
];

const PRINCIPAL_MENU: &[Entry] = &[
    ("/principal/dashboard", "dashboard", "Dashboard"),
    ("/principal/teachers", "chalkboard", "Teachers"),
    ("/principal/students", "users", "Students"),
    ("/principal/exams", "clipboard", "Exam Results"),
    ("/principal/events", "calendar", "Events"),
    ("/principal/announcements", "bullhorn", "Announcements"),
];

const TEACHER_MENU: &[Entry] = &[
    ("/teacher/dashboard", "dashboard", "Dashboard"),
    ("/teacher/students", "users", "My Students"),
    ("/teacher/exams", "clipboard", "Exams"),
    ("/teacher/health-records", "heartbeat", "Health Records"),
    ("/teacher/announcements", "bullhorn", "Announcements"),
];

const STUDENT_MENU: &[Entry] = &[
    ("/student/dashboard", "dashboard", "Dashboard"),
    ("/student/marks", "clipboard", "My Marks"),
    ("/student/health-record", "heartbeat", "Health Record"),
    ("/student/events", "calendar", "Events"),
];

const PARENT_MENU: &[Entry] = &[
    ("/parent/dashboard", "dashboard", "Dashboard"),
    ("/parent/children/{child}/marks", "clipboard", "Marks"),
    ("/parent/children/{child}/health", "heartbeat", "Health Record"),
    ("/parent/children/{child}/transport", "bus", "Transport"),
    ("/parent/events", "calendar", "Events"),
];

const DRIVER_MENU: &[Entry] = &[
    ("/driver/dashboard", "dashboard", "Dashboard"),
    ("/driver/route", "route", "My Route"),
    ("/driver/students", "users", "Students"),
];

fn table(role: Role) -> &'static [Entry] {
    match role {
        Role::Admin => ADMIN_MENU,
        Role::Principal => PRINCIPAL_MENU,
        Role::Teacher => TEACHER_MENU,
        Role::Student => STUDENT_MENU,
        Role::Parent => PARENT_MENU,
        Role::Driver => DRIVER_MENU,
    }
}

/// Session values interpolated into menu paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuContext<'a> {
    pub child_id: Option<&'a str>,
}

/// Ordered navigation entries for a role. No role yields an empty menu.
pub fn menu_items(role: Option<Role>, context: MenuContext<'_>) -> Vec<MenuItem> {
    let Some(role) = role else {
        return Vec::new();
    };

    let mut items: Vec<MenuItem> = table(role)
        .iter()
        .filter_map(|(path, icon, label)| {
            let path = if path.contains(CHILD_PLACEHOLDER) {
                path.replace(CHILD_PLACEHOLDER, context.child_id?)
            } else {
                path.to_string()
            };
            Some(MenuItem::Link(MenuLink {
                path,
                icon: icon.to_string(),
                label: label.to_string(),
            }))
        })
        .collect();

    items.push(account_group(role));
    items
}

fn account_group(role: Role) -> MenuItem {
    MenuItem::Group(MenuGroup {
        label: "Account".to_string(),
        icon: "user-circle".to_string(),
        children: vec![
            MenuGroupEntry {
                label: "Profile".to_string(),
                action: MenuAction::Navigate {
                    path: format!("/{}/profile", role.as_str()),
                },
            },
            MenuGroupEntry {
                label: "Logout".to_string(),
                action: MenuAction::Logout,
            },
        ],
    })
}

/// Expand/collapse and active-route state over a built menu.
#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    items: Vec<MenuItem>,
    active_path: Option<String>,
    expanded: BTreeSet<String>,
}

impl Sidebar {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Flip a group open or closed. Returns the new state; labels that are not groups stay closed.
    pub fn toggle(&mut self, label: &str) -> bool {
        let is_group = self
            .items
            .iter()
            .any(|item| matches!(item, MenuItem::Group(g) if g.label == label));
        if !is_group {
            return false;
        }
        if !self.expanded.remove(label) {
            self.expanded.insert(label.to_string());
            return true;
        }
        false
    }

    /// Record the current route. A group holding the route is opened.
    pub fn set_active(&mut self, path: &str) {
        self.active_path = Some(path.to_string());
        let owners: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| match item {
                MenuItem::Group(g) if g.children.iter().any(|c| action_matches(&c.action, path)) => {
                    Some(g.label.clone())
                }
                _ => None,
            })
            .collect();
        self.expanded.extend(owners);
    }

    pub fn is_expanded(&self, label: &str) -> bool {
        self.expanded.contains(label)
    }

    pub fn is_active(&self, item: &MenuItem) -> bool {
        let Some(active) = self.active_path.as_deref() else {
            return false;
        };
        match item {
            MenuItem::Link(link) => route_matches(&link.path, active),
            MenuItem::Group(group) => group.children.iter().any(|c| action_matches(&c.action, active)),
        }
    }

    pub fn view(&self) -> Vec<SidebarEntry> {
        self.items
            .iter()
            .map(|item| SidebarEntry {
                active: self.is_active(item),
                expanded: match item {
                    MenuItem::Group(g) => Some(self.is_expanded(&g.label)),
                    MenuItem::Link(_) => None,
                },
                item: item.clone(),
            })
            .collect()
    }
}

/// A menu item with its sidebar flags.
#[derive(Debug, Clone, Serialize)]
pub struct SidebarEntry {
    #[serde(flatten)]
    pub item: MenuItem,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
}

/// `/teacher/exams` is active for `/teacher/exams` and `/teacher/exams/42`, not `/teacher/examsx`.
fn route_matches(item_path: &str, active: &str) -> bool {
    match active.strip_prefix(item_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn action_matches(action: &MenuAction, active: &str) -> bool {
    match action {
        MenuAction::Navigate { path } => route_matches(path, active),
        MenuAction::Logout => false,
    }
}
