//! Persisted session operations.

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Session, User};

/// Session store backed by the single-row `session` table.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the current session, if someone is logged in.
    pub async fn load(&self) -> Result<Option<Session>, AppError> {
        let row = sqlx::query(
            "SELECT name, role, role_id, token, selected_child_id, created_at FROM session WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(session_from_row))
    }

    /// Load the current session or fail with a login prompt.
    pub async fn require(&self) -> Result<Session, AppError> {
        self.load().await?.ok_or_else(AppError::login_required)
    }

    /// Store a fresh login, replacing any previous session and child choice.
    pub async fn save(&self, user: &User, token: &str) -> Result<Session, AppError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO session (id, name, role, role_id, token, selected_child_id, created_at, updated_at)
               VALUES (1, ?, ?, ?, ?, NULL, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   name = excluded.name,
                   role = excluded.role,
                   role_id = excluded.role_id,
                   token = excluded.token,
                   selected_child_id = NULL,
                   created_at = excluded.created_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&user.name)
        .bind(&user.role)
        .bind(&user.role_id)
        .bind(token)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!("Session stored for {} ({})", user.name, user.role);

        Ok(Session {
            user: user.clone(),
            token: token.to_string(),
            selected_child_id: None,
            created_at: now,
        })
    }

    /// Remember which child a parent is looking at.
    pub async fn set_selected_child(&self, child_id: Option<&str>) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let result =
            sqlx::query("UPDATE session SET selected_child_id = ?, updated_at = ? WHERE id = 1")
                .bind(child_id)
                .bind(&now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::login_required());
        }
        Ok(())
    }

    /// Forget everything. Returns whether a session existed.
    pub async fn clear(&self) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM session WHERE id = 1")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn session_from_row(row: &SqliteRow) -> Session {
    Session {
        user: User {
            name: row.get("name"),
            role: row.get("role"),
            role_id: row.get("role_id"),
        },
        token: row.get("token"),
        selected_child_id: row.get("selected_child_id"),
        created_at: row.get("created_at"),
    }
}
