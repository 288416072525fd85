//! Pass-through listings used by the exam and admin screens.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::{Subject, Teacher};
use crate::AppState;

/// GET /api/teachers
pub async fn list_teachers(State(state): State<AppState>) -> ApiResult<Vec<Teacher>> {
    let session = state.store.require().await?;
    success(state.backend.teachers(&session.token).await?)
}

/// GET /api/subjects
pub async fn list_subjects(State(state): State<AppState>) -> ApiResult<Vec<Subject>> {
    let session = state.store.require().await?;
    success(state.backend.subjects(&session.token).await?)
}
