use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow, types::Json};
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, error::DatabaseResult, repo::ResourceTyped};

/// One run through a module's quiz. `answers` maps question id to choice id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizAttempt {
    id: Uuid,
    user_id: Uuid,
    module_id: Uuid,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    score: i32,
    passed: bool,
    #[schema(value_type = Object)]
    answers: Json<HashMap<Uuid, Uuid>>,
}

impl ResourceTyped for QuizAttempt {
    fn get_resource_type() -> ResourceType {
        ResourceType::QuizAttempt
    }
}

impl QuizAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn answers(&self) -> &HashMap<Uuid, Uuid> {
        &self.answers.0
    }

    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO quiz_attempts (id, user_id, module_id) VALUES ($1,$2,$3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(module_id)
        .fetch_one(executor)
        .await?;
        Ok(result)
    }

    /// The attempt, only if it belongs to `user_id` and `module_id`.
    pub async fn find_owned(
        mm: &ModelManager,
        id: Uuid,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE id = $1 AND user_id = $2 AND module_id = $3",
        )
        .bind(id)
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    /// Same as [`QuizAttempt::find_owned`] but takes a row lock.
    pub async fn lock_owned<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE id = $1 AND user_id = $2 AND module_id = $3 \
             FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(executor)
        .await?;
        Ok(result)
    }

    /// Stores `choice_id` as the answer to `question_id`, unless already submitted.
    pub async fn record_answer(
        mm: &ModelManager,
        id: Uuid,
        question_id: Uuid,
        choice_id: Uuid,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE quiz_attempts SET answers = answers || jsonb_build_object($2::text, $3::text) \
             WHERE id = $1 AND submitted_at IS NULL",
        )
        .bind(id)
        .bind(question_id.to_string())
        .bind(choice_id.to_string())
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_submitted<'e, E: PgExecutor<'e>>(
        mut self,
        executor: E,
        score: i32,
        passed: bool,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE quiz_attempts SET score = $1, passed = $2, submitted_at = $3 WHERE id = $4",
        )
        .bind(score)
        .bind(passed)
        .bind(now)
        .bind(self.id)
        .execute(executor)
        .await?;

        self.score = score;
        self.passed = passed;
        self.submitted_at = Some(now);
        Ok(self)
    }
}
