//! Exam and grading table API endpoints.
//!
//! An opened exam lives in memory as an `ExamTable` until it is reopened,
//! deleted, or the session ends. Cell edits only touch that table; rows reach
//! the backend one student at a time.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{require_role, success, ApiResult};
use crate::errors::AppError;
use crate::grading::{ExamTable, ExamTableView, RowView};
use crate::models::{CreateExamRequest, Exam, NewExam, Role, Session, SetMarkRequest};
use crate::AppState;

/// GET /api/exams - Exams created by the signed-in teacher.
pub async fn list_exams(State(state): State<AppState>) -> ApiResult<Vec<Exam>> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Teacher])?;

    success(
        state
            .backend
            .exams(&session.token, &session.user.role_id)
            .await?,
    )
}

/// POST /api/exams - Create an exam after local checks.
pub async fn create_exam(
    State(state): State<AppState>,
    Json(request): Json<CreateExamRequest>,
) -> ApiResult<Exam> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Teacher])?;

    let new_exam = validate_new_exam(request, &session.user.role_id)?;

    let existing = state
        .backend
        .exams(&session.token, &session.user.role_id)
        .await?;
    if is_duplicate_name(&existing, &new_exam.name) {
        return Err(AppError::Validation(format!(
            "An exam named {:?} already exists",
            new_exam.name
        )));
    }

    let exam = state.backend.create_exam(&session.token, &new_exam).await?;
    tracing::info!("Created exam {} ({})", exam.name, exam.id);
    success(exam)
}

/// DELETE /api/exams/{id}
pub async fn delete_exam(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Teacher])?;

    state.backend.delete_exam(&session.token, &id).await?;
    state.tables.write().await.remove(&id);
    tracing::info!("Deleted exam {}", id);
    success(())
}

/// POST /api/exams/{id}/table - Select an exam: load it with its roster into a fresh table.
pub async fn open_exam_table(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ExamTableView> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Teacher])?;

    let exam = state.backend.exam(&session.token, &id).await?;
    let table = load_table(&state, &session, &exam).await?;
    let view = table.view();
    state.tables.write().await.insert(id, table);

    success(view)
}

/// GET /api/exams/{id}/table - The table as currently edited.
pub async fn get_exam_table(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ExamTableView> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Teacher])?;

    let tables = state.tables.read().await;
    let table = tables.get(&id).ok_or_else(|| not_open(&id))?;
    success(table.view())
}

/// PUT /api/exams/{id}/table/{student_id}/{subject} - Edit one mark cell.
pub async fn set_exam_mark(
    State(state): State<AppState>,
    Path((id, student_id, subject)): Path<(String, String, String)>,
    Json(request): Json<SetMarkRequest>,
) -> ApiResult<RowView> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Teacher])?;

    let mut tables = state.tables.write().await;
    let table = tables.get_mut(&id).ok_or_else(|| not_open(&id))?;

    let row = table.set_mark(&student_id, &subject, &request.value)?.clone();
    success(table.row_view(&row))
}

/// POST /api/exams/{id}/table/{student_id}/submit - Send one student's marks.
///
/// Incomplete rows are refused before anything is sent. After a successful
/// write the exam list and roster are fetched again and the table rebuilt.
pub async fn submit_exam_row(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(String, String)>,
) -> ApiResult<ExamTableView> {
    let session = state.store.require().await?;
    require_role(&session, &[Role::Teacher])?;

    let submission = {
        let tables = state.tables.read().await;
        let table = tables.get(&id).ok_or_else(|| not_open(&id))?;
        table.submission(&student_id)?
    };

    state
        .backend
        .submit_marks(&session.token, &id, &submission)
        .await?;
    tracing::info!("Submitted marks for student {} in exam {}", student_id, id);

    let exams = state
        .backend
        .exams(&session.token, &session.user.role_id)
        .await?;
    let exam = match exams.into_iter().find(|e| e.id == id) {
        Some(exam) => exam,
        None => state.backend.exam(&session.token, &id).await?,
    };
    let table = load_table(&state, &session, &exam).await?;
    let view = table.view();
    state.tables.write().await.insert(id, table);

    success(view)
}

async fn load_table(state: &AppState, session: &Session, exam: &Exam) -> Result<ExamTable, AppError> {
    let roster = state
        .backend
        .roster(&session.token, &exam.class_name, &exam.section)
        .await?;
    Ok(ExamTable::build(exam, &roster))
}

fn not_open(id: &str) -> AppError {
    AppError::NotFound(format!("Exam {} is not open for grading", id))
}

/// Check the request and turn it into the backend payload.
fn validate_new_exam(request: CreateExamRequest, created_by: &str) -> Result<NewExam, AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Exam name is required".to_string()));
    }

    let mut subjects: Vec<String> = Vec::new();
    for subject in request.subjects.iter().map(|s| s.trim()) {
        if !subject.is_empty() && !subjects.iter().any(|s| s == subject) {
            subjects.push(subject.to_string());
        }
    }
    if subjects.is_empty() {
        return Err(AppError::Validation(
            "Select at least one subject".to_string(),
        ));
    }

    if !request.max_marks.is_finite() || request.max_marks <= 0.0 {
        return Err(AppError::Validation(
            "Maximum marks must be greater than zero".to_string(),
        ));
    }

    if request.class_name.trim().is_empty() || request.section.trim().is_empty() {
        return Err(AppError::Validation(
            "Class and section are required".to_string(),
        ));
    }

    Ok(NewExam {
        name,
        subjects,
        max_marks: request.max_marks,
        class_name: request.class_name.trim().to_string(),
        section: request.section.trim().to_string(),
        created_by: created_by.to_string(),
    })
}

/// Names compare trimmed and case-insensitively.
fn is_duplicate_name(existing: &[Exam], name: &str) -> bool {
    let wanted = name.trim().to_lowercase();
    existing
        .iter()
        .any(|e| e.name.trim().to_lowercase() == wanted)
}
