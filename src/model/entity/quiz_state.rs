use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, prelude::FromRow};
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, error::DatabaseResult, repo::ResourceTyped};

/// Attempt counters and lock windows of one user on one module.
///
/// Transitions live in `crate::quiz`; this type only loads and stores rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizState {
    pub(crate) user_id: Uuid,
    pub(crate) module_id: Uuid,
    pub(crate) attempts_used: i32,
    pub(crate) lockout_until: Option<DateTime<Utc>>,
    pub(crate) retake_available_at: Option<DateTime<Utc>>,
    pub(crate) last_completed_at: Option<DateTime<Utc>>,
    pub(crate) last_passed: Option<bool>,
}

impl ResourceTyped for QuizState {
    fn get_resource_type() -> ResourceType {
        ResourceType::QuizState
    }
}

impl QuizState {
    pub fn new(user_id: Uuid, module_id: Uuid) -> Self {
        Self {
            user_id,
            module_id,
            attempts_used: 0,
            lockout_until: None,
            retake_available_at: None,
            last_completed_at: None,
            last_passed: None,
        }
    }

    pub fn attempts_used(&self) -> i32 {
        self.attempts_used
    }

    pub fn lockout_until(&self) -> Option<DateTime<Utc>> {
        self.lockout_until
    }

    pub fn retake_available_at(&self) -> Option<DateTime<Utc>> {
        self.retake_available_at
    }

    pub fn last_completed_at(&self) -> Option<DateTime<Utc>> {
        self.last_completed_at
    }

    pub fn last_passed(&self) -> Option<bool> {
        self.last_passed
    }

    pub async fn find(
        mm: &ModelManager,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM quiz_states WHERE user_id = $1 AND module_id = $2")
                .bind(user_id)
                .bind(module_id)
                .fetch_optional(mm.executor())
                .await?;
        Ok(result)
    }

    /// Loads the row for update, creating it first if needed.
    /// Must run inside a transaction for the lock to mean anything.
    pub async fn lock(
        conn: &mut PgConnection,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "INSERT INTO quiz_states (user_id, module_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, module_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(module_id)
        .execute(&mut *conn)
        .await?;

        let state = sqlx::query_as(
            "SELECT * FROM quiz_states WHERE user_id = $1 AND module_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(state)
    }

    pub async fn save(&self, conn: &mut PgConnection) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE quiz_states SET attempts_used = $1, lockout_until = $2, \
             retake_available_at = $3, last_completed_at = $4, last_passed = $5 \
             WHERE user_id = $6 AND module_id = $7",
        )
        .bind(self.attempts_used)
        .bind(self.lockout_until)
        .bind(self.retake_available_at)
        .bind(self.last_completed_at)
        .bind(self.last_passed)
        .bind(self.user_id)
        .bind(self.module_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Drops the row; the next start begins from a fresh state.
    pub async fn delete(mm: &ModelManager, user_id: Uuid, module_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM quiz_states WHERE user_id = $1 AND module_id = $2")
            .bind(user_id)
            .bind(module_id)
            .execute(mm.executor())
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
