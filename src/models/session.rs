//! Session and role models.

use serde::{Deserialize, Serialize};

/// Portal roles known to the school platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Principal,
    Teacher,
    Student,
    Parent,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Principal => "principal",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Driver => "driver",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "principal" => Some(Role::Principal),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            "parent" => Some(Role::Parent),
            "driver" => Some(Role::Driver),
            _ => None,
        }
    }
}

/// The user object handed out by the backend at login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    /// Kept as the backend sent it; unknown roles resolve to no role.
    pub role: String,
    #[serde(default)]
    pub role_id: String,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role)
    }
}

/// Persisted session: token, user object and the parent's selected child.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub selected_child_id: Option<String>,
    pub created_at: String,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        self.user.role()
    }
}

/// What the browser shell sees of the session. The token stays server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub name: String,
    pub role: String,
    pub role_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_child_id: Option<String>,
    pub logged_in_at: String,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            name: session.user.name.clone(),
            role: session.user.role.clone(),
            role_id: session.user.role_id.clone(),
            selected_child_id: session.selected_child_id.clone(),
            logged_in_at: session.created_at.clone(),
        }
    }
}

/// Request body for logging in through the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Backend answer to a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Request body for adopting a session obtained by an external login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptSessionRequest {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub role_id: String,
    pub token: String,
}
