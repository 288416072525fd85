//! Menu API endpoint.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::menu::{menu_items, MenuContext, Sidebar, SidebarEntry};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    /// Route currently shown in the browser.
    #[serde(default)]
    pub path: Option<String>,
    /// Comma-separated labels of groups the shell has open.
    #[serde(default)]
    pub expanded: Option<String>,
}

/// GET /api/menu - Sidebar for the session's role. No session, no entries.
pub async fn get_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Vec<SidebarEntry>> {
    let session = state.store.load().await?;

    let items = match &session {
        Some(session) => menu_items(
            session.role(),
            MenuContext {
                child_id: session.selected_child_id.as_deref(),
            },
        ),
        None => Vec::new(),
    };

    let mut sidebar = Sidebar::new(items);
    if let Some(path) = query.path.as_deref() {
        sidebar.set_active(path);
    }
    for label in query.expanded.as_deref().unwrap_or_default().split(',') {
        let label = label.trim();
        if !label.is_empty() && !sidebar.is_expanded(label) {
            sidebar.toggle(label);
        }
    }

    success(sidebar.view())
}
