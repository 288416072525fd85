//! Session API endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{AdoptSessionRequest, LoginRequest, SessionView, User};
use crate::AppState;

/// POST /api/session/login - Log in against the school backend and keep the session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionView> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let login = state.backend.login(&request).await?;
    let session = state.store.save(&login.user, &login.token).await?;
    state.tables.write().await.clear();

    success(SessionView::from(&session))
}

/// PUT /api/session - Adopt a session obtained elsewhere.
pub async fn adopt_session(
    State(state): State<AppState>,
    Json(request): Json<AdoptSessionRequest>,
) -> ApiResult<SessionView> {
    if request.token.trim().is_empty() {
        return Err(AppError::Validation("A session token is required".to_string()));
    }

    let user = User {
        name: request.name,
        role: request.role,
        role_id: request.role_id,
    };
    let session = state.store.save(&user, &request.token).await?;
    state.tables.write().await.clear();

    success(SessionView::from(&session))
}

/// GET /api/session - Current session.
pub async fn get_session(State(state): State<AppState>) -> ApiResult<SessionView> {
    let session = state.store.require().await?;
    success(SessionView::from(&session))
}

/// DELETE /api/session - Log out, forgetting token, user and child choice.
pub async fn logout(State(state): State<AppState>) -> ApiResult<()> {
    if state.store.clear().await? {
        tracing::info!("Session cleared");
    }
    state.tables.write().await.clear();
    success(())
}
