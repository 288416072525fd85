//! Portal API module.
//!
//! JSON endpoints the browser shell calls. Every response uses the
//! `{ success, data }` envelope; errors use the envelope from `errors`.

mod dashboard;
mod exams;
mod health;
mod menu;
mod parent;
mod school;
mod session;

pub use dashboard::*;
pub use exams::*;
pub use health::*;
pub use menu::*;
pub use parent::*;
pub use school::*;
pub use session::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Role, Session};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Fail unless the session's role is one of `allowed`.
pub fn require_role(session: &Session, allowed: &[Role]) -> Result<Role, AppError> {
    match session.role() {
        Some(role) if allowed.contains(&role) => Ok(role),
        _ => Err(AppError::Forbidden(format!(
            "This screen is not available for the {} role",
            session.user.role
        ))),
    }
}
