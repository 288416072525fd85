//! Dashboard API endpoint.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::models::{Announcement, Event, SessionView};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: SessionView,
    pub events: Vec<Event>,
    pub announcements: Vec<Announcement>,
}

/// GET /api/dashboard - Notice board for any signed-in role.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Dashboard> {
    let session = state.store.require().await?;

    let (events, announcements) = tokio::try_join!(
        state.backend.events(&session.token),
        state.backend.announcements(&session.token),
    )?;

    success(Dashboard {
        user: SessionView::from(&session),
        events,
        announcements,
    })
}
