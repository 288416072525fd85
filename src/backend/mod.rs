//! Client for the school management backend.
//!
//! Every call carries the session's bearer token and exchanges plain JSON.
//! Failures come back as `AppError::Upstream` with the backend's own message
//! when it sent one; a 401 means the stored token is no longer accepted.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;
use crate::models::{
    Announcement, Event, Exam, HealthRecord, LinkHealthRecordRequest, LoginRequest, LoginResponse,
    NewExam, Student, Subject, SubmitMarksRequest, Teacher,
};

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(upstream_error(status, &body))
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, AppError> {
        tracing::debug!("GET {}", path);
        self.send(self.http.get(self.url(path)).bearer_auth(token)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        tracing::debug!("POST {}", path);
        self.send(self.http.post(self.url(path)).bearer_auth(token).json(body))
            .await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        tracing::debug!("PUT {}", path);
        self.send(self.http.put(self.url(path)).bearer_auth(token).json(body))
            .await
    }

    /// Like `send`, for calls whose answer body is not needed.
    async fn send_discarding(&self, request: RequestBuilder) -> Result<(), AppError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(upstream_error(status, &body))
    }

    async fn delete(&self, token: &str, path: &str) -> Result<(), AppError> {
        tracing::debug!("DELETE {}", path);
        self.send_discarding(self.http.delete(self.url(path)).bearer_auth(token))
            .await
    }

    // ==================== SESSION ====================

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        tracing::debug!("POST /auth/login");
        self.send(self.http.post(self.url("/auth/login")).json(request))
            .await
    }

    // ==================== STUDENTS ====================

    pub async fn student(&self, token: &str, id: &str) -> Result<Student, AppError> {
        self.get(token, &format!("/students/{}", id)).await
    }

    pub async fn student_by_admission(
        &self,
        token: &str,
        admission_number: &str,
    ) -> Result<Student, AppError> {
        self.get(token, &format!("/students/admission/{}", admission_number))
            .await
    }

    /// Students of one class section.
    pub async fn roster(
        &self,
        token: &str,
        class_name: &str,
        section: &str,
    ) -> Result<Vec<Student>, AppError> {
        tracing::debug!("GET /students?className={}&section={}", class_name, section);
        let request = self
            .http
            .get(self.url("/students"))
            .query(&[("className", class_name), ("section", section)])
            .bearer_auth(token);
        self.send(request).await
    }

    pub async fn link_health_record(
        &self,
        token: &str,
        student_id: &str,
        record_id: &str,
    ) -> Result<Student, AppError> {
        let body = LinkHealthRecordRequest {
            health_record: record_id.to_string(),
        };
        self.put(token, &format!("/students/{}", student_id), &body)
            .await
    }

    // ==================== HEALTH RECORDS ====================

    pub async fn health_records(&self, token: &str) -> Result<Vec<HealthRecord>, AppError> {
        self.get(token, "/health-records").await
    }

    pub async fn health_record(&self, token: &str, id: &str) -> Result<HealthRecord, AppError> {
        self.get(token, &format!("/health-records/{}", id)).await
    }

    pub async fn create_health_record(
        &self,
        token: &str,
        record: &HealthRecord,
    ) -> Result<HealthRecord, AppError> {
        self.post(token, "/health-records", record).await
    }

    pub async fn update_health_record(
        &self,
        token: &str,
        id: &str,
        record: &HealthRecord,
    ) -> Result<HealthRecord, AppError> {
        self.put(token, &format!("/health-records/{}", id), record)
            .await
    }

    pub async fn delete_health_record(&self, token: &str, id: &str) -> Result<(), AppError> {
        self.delete(token, &format!("/health-records/{}", id)).await
    }

    // ==================== NOTICE BOARD ====================

    pub async fn events(&self, token: &str) -> Result<Vec<Event>, AppError> {
        self.get(token, "/events").await
    }

    pub async fn announcements(&self, token: &str) -> Result<Vec<Announcement>, AppError> {
        self.get(token, "/announcements").await
    }

    // ==================== PEOPLE ====================

    pub async fn children(&self, token: &str, parent_id: &str) -> Result<Vec<Student>, AppError> {
        self.get(token, &format!("/parents/{}/children", parent_id))
            .await
    }

    pub async fn teachers(&self, token: &str) -> Result<Vec<Teacher>, AppError> {
        self.get(token, "/teachers").await
    }

    pub async fn subjects(&self, token: &str) -> Result<Vec<Subject>, AppError> {
        self.get(token, "/subjects").await
    }

    // ==================== EXAMS ====================

    /// Exams created by one teacher.
    pub async fn exams(&self, token: &str, created_by: &str) -> Result<Vec<Exam>, AppError> {
        tracing::debug!("GET /exams?createdBy={}", created_by);
        let request = self
            .http
            .get(self.url("/exams"))
            .query(&[("createdBy", created_by)])
            .bearer_auth(token);
        self.send(request).await
    }

    pub async fn exam(&self, token: &str, id: &str) -> Result<Exam, AppError> {
        self.get(token, &format!("/exams/{}", id)).await
    }

    pub async fn create_exam(&self, token: &str, exam: &NewExam) -> Result<Exam, AppError> {
        self.post(token, "/exams", exam).await
    }

    pub async fn delete_exam(&self, token: &str, id: &str) -> Result<(), AppError> {
        self.delete(token, &format!("/exams/{}", id)).await
    }

    pub async fn submit_marks(
        &self,
        token: &str,
        exam_id: &str,
        marks: &SubmitMarksRequest,
    ) -> Result<(), AppError> {
        let path = format!("/exams/{}/marks", exam_id);
        tracing::debug!("POST {}", path);
        self.send_discarding(self.http.post(self.url(&path)).bearer_auth(token).json(marks))
            .await
    }
}

/// Map a non-success backend answer, preferring the message it sent.
fn upstream_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            format!(
                "School server answered {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )
        });

    tracing::warn!("Backend returned {}: {}", status, message);

    if status == StatusCode::UNAUTHORIZED {
        return AppError::Unauthorized(format!("Your session is no longer valid: {}", message));
    }

    AppError::Upstream {
        message,
        status: Some(status.as_u16()),
    }
}
