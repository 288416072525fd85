//! Health record API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{require_role, success, ApiResult};
use crate::errors::AppError;
use crate::health::{self, HealthRecordEditor, ListField};
use crate::models::{HealthRecord, Role, Student};
use crate::AppState;

const EDITORS: &[Role] = &[Role::Admin, Role::Principal, Role::Teacher];

/// A student with the editable working copy of their record.
#[derive(Debug, Serialize)]
pub struct HealthRecordForm {
    pub student: Student,
    pub record: HealthRecord,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotAction {
    Add,
    Remove,
}

/// Add or remove one entry of a repeatable list in the working copy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub record: HealthRecord,
    pub field: ListField,
    pub action: SlotAction,
    #[serde(default)]
    pub index: Option<usize>,
}

/// GET /api/health-records - All records (admin list screen).
pub async fn list_health_records(State(state): State<AppState>) -> ApiResult<Vec<HealthRecord>> {
    let session = state.store.require().await?;
    require_role(&session, EDITORS)?;

    success(state.backend.health_records(&session.token).await?)
}

/// GET /api/health-records/form/{admission_number} - Form hydrated with placeholder slots.
pub async fn get_health_form(
    State(state): State<AppState>,
    Path(admission_number): Path<String>,
) -> ApiResult<HealthRecordForm> {
    let session = state.store.require().await?;
    require_role(&session, EDITORS)?;

    let (student, editor) =
        health::load_form(&state.backend, &session.token, &admission_number).await?;

    success(HealthRecordForm {
        student,
        record: editor.record().clone(),
    })
}

/// POST /api/health-records/form/{admission_number} - Create or update from the working copy.
pub async fn submit_health_form(
    State(state): State<AppState>,
    Path(admission_number): Path<String>,
    Json(record): Json<HealthRecord>,
) -> ApiResult<HealthRecordForm> {
    let session = state.store.require().await?;
    require_role(&session, EDITORS)?;

    let student = state
        .backend
        .student_by_admission(&session.token, &admission_number)
        .await?;
    let editor = HealthRecordEditor::from_form(record);
    let saved = health::submit(&state.backend, &session.token, &student, &editor).await?;

    // Hand back a fresh working copy so the form keeps its empty slots.
    let mut student = student;
    if saved.id.is_some() {
        student.health_record = saved.id.clone();
    }
    let editor = HealthRecordEditor::new(Some(saved), &student.id);

    success(HealthRecordForm {
        student,
        record: editor.record().clone(),
    })
}

/// POST /api/health-records/slots - Edit list slots of a working copy. Nothing is saved.
pub async fn edit_health_slots(
    State(state): State<AppState>,
    Json(request): Json<SlotRequest>,
) -> ApiResult<HealthRecord> {
    let session = state.store.require().await?;
    require_role(&session, EDITORS)?;

    let mut editor = HealthRecordEditor::from_form(request.record);
    match (request.action, request.index) {
        (SlotAction::Add, _) => editor.add(request.field),
        (SlotAction::Remove, Some(index)) => editor.remove(request.field, index),
        (SlotAction::Remove, None) => {
            return Err(AppError::BadRequest(
                "An index is required to remove an entry".to_string(),
            ))
        }
    }

    success(editor.record().clone())
}

/// DELETE /api/health-records/{id}
pub async fn delete_health_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Admin])?;

    state.backend.delete_health_record(&session.token, &id).await?;
    tracing::info!("Deleted health record {}", id);
    success(())
}
