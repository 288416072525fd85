//! Parent portal endpoints: children, child selection and the parent dashboard.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{require_role, success, ApiResult};
use crate::children::resolve_selection;
use crate::errors::AppError;
use crate::models::{Announcement, Event, Role, Session, Student};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDashboard {
    pub children: Vec<Student>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_child: Option<Student>,
    pub events: Vec<Event>,
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectChildRequest {
    pub child_id: String,
}

/// GET /api/children - The parent's children.
pub async fn list_children(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Parent])?;

    success(
        state
            .backend
            .children(&session.token, &session.user.role_id)
            .await?,
    )
}

/// GET /api/parent/dashboard - Dashboard for the selected child.
pub async fn get_parent_dashboard(State(state): State<AppState>) -> ApiResult<ParentDashboard> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Parent])?;

    let children = state
        .backend
        .children(&session.token, &session.user.role_id)
        .await?;
    let selected = resolve_selection(&children, session.selected_child_id.as_deref())
        .map(|c| c.id.clone());

    if selected != session.selected_child_id {
        state.store.set_selected_child(selected.as_deref()).await?;
    }

    success(build_dashboard(&state, &session, children, selected).await?)
}

/// PUT /api/children/selected - Switch child and return the refreshed dashboard.
pub async fn select_child(
    State(state): State<AppState>,
    Json(request): Json<SelectChildRequest>,
) -> ApiResult<ParentDashboard> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Parent])?;

    let children = state
        .backend
        .children(&session.token, &session.user.role_id)
        .await?;
    if !children.iter().any(|c| c.id == request.child_id) {
        return Err(AppError::Validation(format!(
            "{} is not one of your children",
            request.child_id
        )));
    }

    state
        .store
        .set_selected_child(Some(&request.child_id))
        .await?;
    tracing::info!("Parent {} selected child {}", session.user.role_id, request.child_id);

    success(build_dashboard(&state, &session, children, Some(request.child_id)).await?)
}

/// Fetch the child's record and the notice board together.
async fn build_dashboard(
    state: &AppState,
    session: &Session,
    children: Vec<Student>,
    selected: Option<String>,
) -> Result<ParentDashboard, AppError> {
    let token = session.token.as_str();
    let child = async {
        match selected.as_deref() {
            Some(id) => state.backend.student(token, id).await.map(Some),
            None => Ok(None),
        }
    };

    let (selected_child, events, announcements) = tokio::try_join!(
        child,
        state.backend.events(token),
        state.backend.announcements(token),
    )?;

    Ok(ParentDashboard {
        children,
        selected_child,
        events,
        announcements,
    })
}
